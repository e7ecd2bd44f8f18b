use std::{ffi::OsString, path::Path};

use tempfile::NamedTempFile;

use crate::{
    domain::{CredentialFile, DomainProfile},
    error::{AddInstallContext, InstallError},
    hooks::HookRunner,
    tool::VendorTools,
};

use super::{plan::InstallPlan, InstallConfig, InstallOutcome};

pub struct Executor {
    plan: InstallPlan,
    profile: DomainProfile,
    config: InstallConfig,
    tools: VendorTools,
}

impl Executor {
    pub fn new(
        plan: InstallPlan,
        profile: &DomainProfile,
        config: &InstallConfig,
        tools: VendorTools,
    ) -> Self {
        Self {
            plan,
            profile: profile.clone(),
            config: config.clone(),
            tools,
        }
    }

    /// Runs the installation sequence for one package.
    ///
    /// All temporary resources (credential file, exported and merged
    /// configurations) live in this call frame and are removed by drop
    /// on every exit path.
    pub fn run(&mut self) -> Result<InstallOutcome, InstallError> {
        let app = self.plan.app_name.clone();
        let domain = self.profile.domain.clone();

        let cred_file = CredentialFile::create(&self.config.credentials)
            .inst_context("failed to create credential file")?;

        self.tools.check_domain(&domain, cred_file.path())?;

        let updated = self
            .tools
            .app_installed(&app, &domain, cred_file.path())?;

        tracing::info!(
            app_name = %app,
            domain = %domain,
            updated,
            overwrite = self.config.overwrite,
            "installing package"
        );

        // On upgrade the deployed configuration is exported and merged
        // with the base configuration, unless the operator asked to
        // overwrite. Both steps are vendor-performed.
        let mut current_config: Option<NamedTempFile> = None;
        let mut merged_config: Option<NamedTempFile> = None;

        if updated && !self.config.overwrite {
            let current = config_temp_file("bwinstall-current-")?;
            self.tools
                .export_config(&app, &domain, cred_file.path(), current.path())?;

            let merged = config_temp_file("bwinstall-deploy-")?;
            self.tools.merge_config(
                &app,
                &domain,
                cred_file.path(),
                &self.plan.base_config_path,
                merged.path(),
            )?;

            current_config = Some(current);
            merged_config = Some(merged);
        }

        let deploy_config_path = merged_config
            .as_ref()
            .map(|file| file.path().to_path_buf())
            .unwrap_or_else(|| self.plan.base_config_path.clone());

        let hook_env = self.hook_env(
            cred_file.path(),
            current_config.as_ref().map(|file| file.path()),
            &deploy_config_path,
            updated,
        );
        let hooks = HookRunner::new(&self.plan.package_dir, hook_env);

        hooks.run_all("prepare", &self.plan.prepare_hooks)?;

        tracing::info!(
            archive = ?self.plan.archive_path,
            len = self.plan.archive_len,
            crc32c = self.plan.archive_crc32c,
            "uploading archive"
        );
        self.tools.upload(
            &app,
            &domain,
            cred_file.path(),
            &self.plan.archive_path,
            &deploy_config_path,
        )?;

        let deployed = if self.config.deploy {
            self.tools.deploy(&app, &domain, cred_file.path())?;
            true
        } else {
            false
        };

        hooks.run_all("complete", &self.plan.complete_hooks)?;

        Ok(InstallOutcome {
            app_name: app,
            updated,
            deployed,
        })
    }

    /// Assembles the `INSTALL_*` environment passed to hook scripts.
    ///
    /// `INSTALL_CURRENTCONFIG` is the empty string on a fresh install
    /// or when overwriting.
    fn hook_env(
        &self,
        cred_path: &Path,
        current_config: Option<&Path>,
        deploy_config: &Path,
        updated: bool,
    ) -> Vec<(String, OsString)> {
        let bool_str = |value: bool| OsString::from(if value { "true" } else { "false" });

        vec![
            (
                "INSTALL_PACKAGEDIR".to_string(),
                self.plan.package_dir.clone().into_os_string(),
            ),
            (
                "INSTALL_DOMAIN".to_string(),
                OsString::from(&self.profile.domain),
            ),
            (
                "INSTALL_USER".to_string(),
                OsString::from(&self.config.credentials.username),
            ),
            ("INSTALL_CREDENTIAL".to_string(), cred_path.into()),
            (
                "INSTALL_APPNAME".to_string(),
                OsString::from(&self.plan.app_name),
            ),
            (
                "INSTALL_ARCHIVE".to_string(),
                self.plan.archive_path.clone().into_os_string(),
            ),
            (
                "INSTALL_BASECONFIG".to_string(),
                self.plan.base_config_path.clone().into_os_string(),
            ),
            (
                "INSTALL_CURRENTCONFIG".to_string(),
                current_config.map(OsString::from).unwrap_or_default(),
            ),
            ("INSTALL_DEPLOYCONFIG".to_string(), deploy_config.into()),
            ("INSTALL_UPDATE".to_string(), bool_str(updated)),
            ("INSTALL_OVERWRITE".to_string(), bool_str(self.config.overwrite)),
        ]
    }
}

fn config_temp_file(prefix: &str) -> Result<NamedTempFile, InstallError> {
    let file = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".xml")
        .tempfile()?;

    Ok(file)
}
