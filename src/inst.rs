//! Installer functionality.
//!
//! The installer turns one package directory into a sequence of vendor
//! tool invocations against the target domain:
//!
//! 1. resolve the package (descriptor, archive, configuration),
//! 2. check the domain status,
//! 3. check whether the application is already installed,
//! 4. on upgrade, export and merge the deployed configuration,
//! 5. run `prepare` hooks,
//! 6. upload the archive,
//! 7. optionally deploy,
//! 8. run `complete` hooks.
//!
//! Every step is fail-fast; temporary files are removed on all exit
//! paths.
use std::path::Path;

use exec::Executor;
use plan::Planner;

use crate::{
    domain::DomainProfile,
    error::{AddInstallContext, InstallError},
    path::TibcoEnv,
    tool::VendorTools,
};

pub use self::config::*;

mod config;
mod exec;
mod plan;

/// Result of a completed package installation.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct InstallOutcome {
    /// Name of the installed application.
    pub app_name: String,
    /// Whether an existing installation was upgraded.
    pub updated: bool,
    /// Whether the application was deployed after upload.
    pub deployed: bool,
}

/// The installer interface.
#[derive(Debug)]
pub struct Installer {
    env: TibcoEnv,
    profile: DomainProfile,
}

impl Installer {
    /// Creates a new installer for the given TIBCO environment and
    /// target domain.
    pub fn new(env: &TibcoEnv, profile: &DomainProfile) -> Self {
        Self {
            env: env.clone(),
            profile: profile.clone(),
        }
    }

    /// Installs or upgrades the package in the given directory.
    pub fn run(
        &mut self,
        package_dir: &Path,
        config: &InstallConfig,
    ) -> Result<InstallOutcome, InstallError> {
        tracing::debug!(?package_dir, ?config, "running planner");

        let mut planner = Planner::new(package_dir);
        let plan = planner
            .run(&self.profile.domain)
            .inst_contextc(|| format!("package {}", package_dir.display()))?;

        tracing::debug!(?plan, "created plan");

        let tools = VendorTools::new(&self.env);
        let mut executor = Executor::new(plan, &self.profile, config, tools);

        executor
            .run()
            .inst_contextc(|| format!("package {}", package_dir.display()))
    }
}
