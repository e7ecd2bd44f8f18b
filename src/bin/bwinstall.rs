//! Installs or upgrades BW application packages into a domain.
use std::path::PathBuf;
use std::process::ExitCode;

use bwinstall::domain::{Credentials, DomainProfile};
use bwinstall::error::{format_error, InstallError, InstallErrorKind};
use bwinstall::inst::InstallConfig;
use bwinstall::path::TibcoEnv;
use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Debug, Parser)]
#[command(
    name = "bwinstall",
    version,
    about = "Install or upgrade BW application packages into a domain"
)]
struct Args {
    /// Replace the deployed configuration instead of merging on upgrade
    #[arg(short, long)]
    overwrite: bool,

    /// Deploy each application after uploading it
    #[arg(short, long)]
    deploy: bool,

    /// Verbose diagnostics
    #[arg(short, long)]
    verbose: bool,

    /// Maximum diagnostics, including vendor tool command lines
    #[arg(short, long)]
    trace: bool,

    /// Package directories to install (default: the current directory)
    #[arg(value_name = "package")]
    packages: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(&args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(?error, "installation failed");
            print_failure_banner(&error);
            ExitCode::from(error.exit_code())
        }
    }
}

fn run(args: &Args) -> Result<(), InstallError> {
    let env = TibcoEnv::from_env()?;
    let profile = DomainProfile::load(env.domain_profile_path())?;

    let mut config = InstallConfig::new(prompt_credentials(&profile)?);
    config.overwrite = args.overwrite;
    config.deploy = args.deploy;

    let packages = if args.packages.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.packages.clone()
    };

    for package in &packages {
        let outcome = bwinstall::install(package, &env, &profile, &config)?;

        println!(
            "{} {} in domain {}{}",
            if outcome.updated {
                "upgraded"
            } else {
                "installed"
            },
            outcome.app_name,
            profile.domain,
            if outcome.deployed { " (deployed)" } else { "" }
        );
    }

    Ok(())
}

/// Prompts for the domain administrator credentials.
///
/// The username is pre-filled from the domain profile; the password is
/// read without echo and only ever written to the temporary credential
/// file.
fn prompt_credentials(profile: &DomainProfile) -> Result<Credentials, InstallError> {
    let username = dialoguer::Input::<String>::new()
        .with_prompt(format!("Administrator for domain {}", profile.domain))
        .default(profile.user.clone())
        .interact_text()
        .map_err(terminal_error)?;

    let password = dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(terminal_error)?;

    Ok(Credentials::new(username, password))
}

fn terminal_error(error: dialoguer::Error) -> InstallError {
    match &error {
        dialoguer::Error::IO(io) if io.kind() == std::io::ErrorKind::Interrupted => {
            InstallError::new(InstallErrorKind::InterruptedByUser)
        }
        _ => InstallError::new(InstallErrorKind::Terminal).with_source(error),
    }
}

fn init_logging(args: &Args) {
    let level = if args.trace {
        LevelFilter::TRACE
    } else if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn print_failure_banner(error: &InstallError) {
    eprintln!();
    eprintln!("*** INSTALLATION FAILED ***");
    eprintln!("{}", format_error(error));
}
