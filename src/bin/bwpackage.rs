//! Scaffolds a new BW installation package directory.
use std::path::PathBuf;
use std::process::ExitCode;

use bwinstall::error::format_error;
use bwinstall::pkg::ScaffoldOptions;
use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Parser)]
#[command(
    name = "bwpackage",
    version,
    about = "Scaffold a new BW installation package directory"
)]
struct Args {
    /// Name of the application the package installs
    #[arg(short, long)]
    appname: String,

    /// Target directory for the new package
    #[arg(value_name = "dir")]
    target: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::WARN)
        .with_writer(std::io::stderr)
        .init();

    match bwinstall::scaffold(&args.target, &ScaffoldOptions::new(args.appname.clone())) {
        Ok(()) => {
            println!(
                "created package {} in {}",
                args.appname,
                args.target.display()
            );
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("bwpackage: {}", format_error(&error));
            ExitCode::from(error.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_appname_and_target() {
        let args = Args::try_parse_from(["bwpackage", "-a", "orders", "pkg/orders"]).unwrap();

        assert_eq!(args.appname, "orders");
        assert_eq!(args.target, PathBuf::from("pkg/orders"));
    }

    #[test]
    fn test_appname_is_required() {
        assert!(Args::try_parse_from(["bwpackage", "pkg/orders"]).is_err());
    }
}
