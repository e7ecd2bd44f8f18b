//! Hook script execution.
//!
//! Packages may declare `prepare` hooks (run before the archive is
//! uploaded) and `complete` hooks (run after upload and deployment).
//! Hooks run sequentially, directly as executables, with the package
//! directory as working directory and the `INSTALL_*` variables added
//! to the inherited environment. Their stdio is inherited; hook output
//! belongs to the operator.
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use crate::error::{InstallError, InstallErrorKind};

/// Runs hook scripts with the installation environment.
#[derive(Debug)]
pub struct HookRunner {
    package_dir: PathBuf,
    env: Vec<(String, OsString)>,
}

impl HookRunner {
    /// Creates a runner for hooks of the given package directory.
    ///
    /// `env` holds the `INSTALL_*` variables added to each hook's
    /// environment.
    pub fn new<P: AsRef<Path>>(package_dir: P, env: Vec<(String, OsString)>) -> Self {
        Self {
            package_dir: package_dir.as_ref().to_path_buf(),
            env,
        }
    }

    /// Runs the given hook scripts in order, failing fast.
    ///
    /// `stage` names the hook list (`prepare` or `complete`) in errors
    /// and logs.
    pub fn run_all(&self, stage: &str, scripts: &[PathBuf]) -> Result<(), InstallError> {
        for script in scripts {
            self.run(stage, script)?;
        }

        Ok(())
    }

    fn run(&self, stage: &str, script: &Path) -> Result<(), InstallError> {
        let path = self.package_dir.join(script);

        tracing::info!(?path, stage, "running hook script");
        tracing::trace!(env = ?self.env, "hook environment");

        let status = Command::new(&path)
            .current_dir(&self.package_dir)
            .envs(self.env.iter().map(|(key, value)| (key, value)))
            .status()
            .map_err(|source| {
                InstallError::new(InstallErrorKind::HookFailure)
                    .with_source(source)
                    .with_context(format!("failed to run {stage} hook {script:?}"))
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(
                InstallError::new(InstallErrorKind::HookFailure).with_context(format!(
                    "{stage} hook {script:?} exited with status {}",
                    status.code().unwrap_or(-1)
                )),
            )
        }
    }
}
