use std::path::{Path, PathBuf};

use crate::{
    error::{AddContext, InstallError, InstallErrorKind},
    pkg::PackageInfo,
};

/// Resolved paths and metadata for one package installation.
///
/// Produced by the [`Planner`] before any external tool is invoked; a
/// package with a missing archive, hook script or configuration fails
/// here.
#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub app_name: String,
    pub package_dir: PathBuf,
    pub archive_path: PathBuf,
    pub archive_len: u64,
    pub archive_crc32c: u32,
    pub base_config_path: PathBuf,
    pub prepare_hooks: Vec<PathBuf>,
    pub complete_hooks: Vec<PathBuf>,
}

/// Resolves a package directory into an [`InstallPlan`].
#[derive(Debug)]
pub struct Planner {
    package_dir: PathBuf,
}

impl Planner {
    pub fn new<P: AsRef<Path>>(package_dir: P) -> Self {
        Self {
            package_dir: package_dir.as_ref().to_path_buf(),
        }
    }

    pub fn run(&mut self, domain: &str) -> Result<InstallPlan, InstallError> {
        // Hook scripts receive these paths in their environment, so
        // everything is made absolute up front.
        let package_dir = std::fs::canonicalize(&self.package_dir)
            .with_contextc(|_error| format!("could not resolve {:?}", self.package_dir))?;

        let info = PackageInfo::load(&package_dir)?;
        info.verify(&package_dir)?;

        let archive_path = package_dir.join(info.archive());
        let checksum = crate::os::file_checksum(&archive_path)
            .with_contextc(|_error| format!("could not read archive {archive_path:?}"))?;

        let base_config_path = select_base_config(&package_dir.join(info.config_dir()), domain)?;

        tracing::debug!(
            app_name = info.app_name(),
            ?archive_path,
            ?base_config_path,
            "resolved package"
        );

        Ok(InstallPlan {
            app_name: info.app_name().to_string(),
            package_dir,
            archive_path,
            archive_len: checksum.len,
            archive_crc32c: checksum.crc32c,
            base_config_path,
            prepare_hooks: info.prepare_hooks().to_vec(),
            complete_hooks: info.complete_hooks().to_vec(),
        })
    }
}

/// Selects the base deployment configuration for a domain.
///
/// `<configdir>/<domain>.xml` wins over `<configdir>/default.xml`;
/// neither existing is an error.
pub fn select_base_config(config_dir: &Path, domain: &str) -> Result<PathBuf, InstallError> {
    let domain_config = config_dir.join(format!("{domain}.xml"));

    if domain_config.is_file() {
        tracing::debug!(path = ?domain_config, "using domain configuration");
        return Ok(domain_config);
    }

    let default_config = config_dir.join("default.xml");

    if default_config.is_file() {
        tracing::debug!(path = ?default_config, "using default configuration");
        return Ok(default_config);
    }

    Err(
        InstallError::new(InstallErrorKind::MissingEnvConfig).with_context(format!(
            "no {domain}.xml or default.xml in {config_dir:?}"
        )),
    )
}
