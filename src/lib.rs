//! Install and upgrade TIBCO BusinessWorks (BW) application packages.
//!
//! This crate drives the vendor `AppManage`/`AppStatusCheck` tools to
//! bring an application package into a BW domain: it checks the domain,
//! selects or merges the deployment configuration, uploads the archive,
//! optionally deploys it, and runs the package's `prepare` and
//! `complete` hook scripts with a well-defined `INSTALL_*` environment.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use bwinstall::domain::{Credentials, DomainProfile};
//! use bwinstall::inst::InstallConfig;
//! use bwinstall::path::TibcoEnv;
//!
//! let env = TibcoEnv::from_env().unwrap();
//! let profile = DomainProfile::load(env.domain_profile_path()).unwrap();
//!
//! let mut config = InstallConfig::new(Credentials::new("admin", "secret"));
//! config.deploy = true;
//!
//! bwinstall::install(Path::new("packages/orders"), &env, &profile, &config).unwrap();
//! ```
//!
//! ## Operating principles
//!
//! The crate owns no deployment logic of its own: the archive and every
//! XML configuration document are opaque blobs passed by path to the
//! vendor tool, and each step is a single external invocation. Failure
//! is fail-fast with no retry; temporary resources (the credential
//! file, exported configurations) are removed on every exit path.
//! Exclusive, serial use of the domain by one operator at a time is
//! assumed.
use std::path::Path;

use error::InstallError;
use inst::{InstallConfig, InstallOutcome, Installer};

pub mod domain;
pub mod error;
pub mod hooks;
pub mod inst;
pub mod os;
pub mod path;
pub mod pkg;
pub mod tool;

/// Installs or upgrades the package in `package_dir` into the domain.
///
/// This is the quiet entry point used by scripts and by the `bwinstall`
/// binary after it has collected credentials; all interaction beyond
/// the vendor tool's own output happens in the caller.
pub fn install(
    package_dir: &Path,
    env: &path::TibcoEnv,
    profile: &domain::DomainProfile,
    config: &InstallConfig,
) -> Result<InstallOutcome, InstallError> {
    let mut installer = Installer::new(env, profile);
    installer.run(package_dir, config)
}

/// Scaffolds a new installation package directory.
pub fn scaffold(target: &Path, options: &pkg::ScaffoldOptions) -> Result<(), InstallError> {
    pkg::scaffold(target, options)
}
