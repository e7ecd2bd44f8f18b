//! Vendor tool invocation.
//!
//! Every installation step that touches the domain is one invocation of
//! the closed-source `AppManage` or `AppStatusCheck` tool from
//! `$TIBCO_TRA_HOME/bin`. The tools are interactive; their stdio is
//! inherited so their output reaches the operator directly. This module
//! only builds command lines and maps exit statuses.
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    error::{AddInstallContext, InstallError, InstallErrorKind},
    path::TibcoEnv,
};

/// Invokes the vendor `AppManage` and `AppStatusCheck` tools.
#[derive(Debug, Clone)]
pub struct VendorTools {
    app_manage: PathBuf,
    app_status_check: PathBuf,
}

impl VendorTools {
    /// Creates a wrapper for the tools of the given TIBCO installation.
    pub fn new(env: &TibcoEnv) -> Self {
        Self {
            app_manage: env.app_manage(),
            app_status_check: env.app_status_check(),
        }
    }

    /// Checks that the domain is reachable and healthy.
    ///
    /// A non-zero exit maps to [`InstallErrorKind::DomainUnavailable`],
    /// which the `bwinstall` binary reports as process exit code 2.
    pub fn check_domain(&self, domain: &str, cred: &Path) -> Result<(), InstallError> {
        let args = domain_args(domain, cred);

        let status = self.spawn_wait(&self.app_status_check, &args)?;

        if status.success() {
            Ok(())
        } else {
            Err(InstallError::new(InstallErrorKind::DomainUnavailable)
                .with_context(format!("domain {domain}: {}", describe_exit(&status))))
        }
    }

    /// Returns whether the application is already installed in the domain.
    ///
    /// Any non-zero exit from the status check is treated as "not
    /// installed"; failure modes of the closed-source tool are not
    /// distinguished.
    pub fn app_installed(&self, app: &str, domain: &str, cred: &Path) -> Result<bool, InstallError> {
        let mut args = vec![OsString::from("-app"), OsString::from(app)];
        args.extend(domain_args(domain, cred));

        let status = self.spawn_wait(&self.app_status_check, &args)?;

        Ok(status.success())
    }

    /// Exports the currently deployed configuration of an application.
    pub fn export_config(
        &self,
        app: &str,
        domain: &str,
        cred: &Path,
        out: &Path,
    ) -> Result<(), InstallError> {
        let mut args = vec![
            OsString::from("-export"),
            OsString::from("-app"),
            OsString::from(app),
        ];
        args.extend(domain_args(domain, cred));
        args.push(OsString::from("-out"));
        args.push(out.into());

        self.expect_success(&self.app_manage, args, "export current configuration")
    }

    /// Exports the deployed configuration merged with a base configuration.
    ///
    /// The merge itself is vendor-performed; both documents are opaque
    /// to this crate.
    pub fn merge_config(
        &self,
        app: &str,
        domain: &str,
        cred: &Path,
        base: &Path,
        out: &Path,
    ) -> Result<(), InstallError> {
        let mut args = vec![
            OsString::from("-export"),
            OsString::from("-app"),
            OsString::from(app),
        ];
        args.extend(domain_args(domain, cred));
        args.push(OsString::from("-deployconfig"));
        args.push(base.into());
        args.push(OsString::from("-out"));
        args.push(out.into());

        self.expect_success(&self.app_manage, args, "merge deployment configuration")
    }

    /// Uploads the archive and its deployment configuration to the domain.
    pub fn upload(
        &self,
        app: &str,
        domain: &str,
        cred: &Path,
        archive: &Path,
        deploy_config: &Path,
    ) -> Result<(), InstallError> {
        let mut args = vec![
            OsString::from("-upload"),
            OsString::from("-ear"),
            archive.into(),
            OsString::from("-deployconfig"),
            deploy_config.into(),
            OsString::from("-app"),
            OsString::from(app),
        ];
        args.extend(domain_args(domain, cred));

        self.expect_success(&self.app_manage, args, "upload archive")
    }

    /// Deploys the uploaded application in the domain.
    pub fn deploy(&self, app: &str, domain: &str, cred: &Path) -> Result<(), InstallError> {
        let mut args = vec![
            OsString::from("-deploy"),
            OsString::from("-app"),
            OsString::from(app),
        ];
        args.extend(domain_args(domain, cred));

        self.expect_success(&self.app_manage, args, "deploy application")
    }

    fn expect_success(
        &self,
        program: &Path,
        args: Vec<OsString>,
        action: &str,
    ) -> Result<(), InstallError> {
        let status = self
            .spawn_wait(program, &args)
            .inst_context(action)?;

        if status.success() {
            Ok(())
        } else {
            Err(
                InstallError::new(InstallErrorKind::ToolFailure).with_context(format!(
                    "{action}: {} {}",
                    tool_name(program),
                    describe_exit(&status)
                )),
            )
        }
    }

    fn spawn_wait(
        &self,
        program: &Path,
        args: &[OsString],
    ) -> Result<std::process::ExitStatus, InstallError> {
        tracing::debug!(?program, ?args, "running vendor tool");

        let status = Command::new(program).args(args).status().map_err(|source| {
            InstallError::from(source)
                .with_context(format!("failed to spawn {}", tool_name(program)))
        })?;

        tracing::trace!(?program, ?status, "vendor tool finished");

        Ok(status)
    }
}

fn domain_args(domain: &str, cred: &Path) -> Vec<OsString> {
    vec![
        OsString::from("-domain"),
        OsString::from(domain),
        OsString::from("-cred"),
        cred.into(),
    ]
}

fn tool_name(program: &Path) -> String {
    program
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string_lossy().into_owned())
}

fn describe_exit(status: &std::process::ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by signal".to_string(),
    }
}
