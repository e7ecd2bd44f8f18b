use std::path::Path;

use regex_lite::Regex;

use crate::error::{AddInstallContext, InstallError, InstallErrorKind};

use super::PACKAGE_INFO_FILENAME;

const PACKAGE_INFO_TEMPLATE: &str = r#"# BW application package descriptor.
#
# appname   name of the application in the domain
# archive   application archive, relative to this directory
# config    per-domain configuration directory (default: envconfig)
# prepare   hook script run before upload, may be repeated
# complete  hook script run after upload/deploy, may be repeated
appname={appname}
archive={appname}.ear
#prepare=hooks/prepare.sh
#complete=hooks/complete.sh
"#;

const DEFAULT_CONFIG_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!--
    Fallback deployment configuration for {appname}.

    Used when no <domain>.xml exists for the target domain. Replace
    with a configuration exported by AppManage.
-->
<application name="{appname}">
</application>
"#;

const PREPARE_HOOK_TEMPLATE: &str = r#"#!/bin/sh
# Runs before {appname} is uploaded. The INSTALL_* environment
# describes the installation in progress; see the package manual.
echo "preparing ${INSTALL_APPNAME} for domain ${INSTALL_DOMAIN}"
"#;

const COMPLETE_HOOK_TEMPLATE: &str = r#"#!/bin/sh
# Runs after {appname} has been uploaded (and deployed, with -d).
echo "completed ${INSTALL_APPNAME} in domain ${INSTALL_DOMAIN}"
"#;

/// Parameters for scaffolding a new package directory.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ScaffoldOptions {
    /// Name of the application the package installs.
    pub app_name: String,
}

impl ScaffoldOptions {
    /// Creates options for the given application name.
    pub fn new<S: Into<String>>(app_name: S) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

/// Creates the directory structure for a new installation package.
///
/// The target directory receives a templated `package-info`, an
/// `envconfig/default.xml` placeholder and sample hook scripts under
/// `hooks/`. An existing descriptor in the target directory is an
/// error; nothing is overwritten.
pub fn scaffold<P: AsRef<Path>>(target: P, options: &ScaffoldOptions) -> Result<(), InstallError> {
    let target = target.as_ref();

    validate_app_name(&options.app_name)?;

    if target.join(PACKAGE_INFO_FILENAME).exists() {
        return Err(InstallError::new(InstallErrorKind::PackageExists)
            .with_context(target.to_string_lossy()));
    }

    tracing::info!(?target, app_name = %options.app_name, "scaffolding package");

    std::fs::create_dir_all(target)?;
    std::fs::create_dir_all(target.join("envconfig"))?;
    std::fs::create_dir_all(target.join("hooks"))?;

    write_template(
        &target.join(PACKAGE_INFO_FILENAME),
        PACKAGE_INFO_TEMPLATE,
        &options.app_name,
        false,
    )
    .inst_context("failed to write package descriptor")?;

    write_template(
        &target.join("envconfig").join("default.xml"),
        DEFAULT_CONFIG_TEMPLATE,
        &options.app_name,
        false,
    )
    .inst_context("failed to write default configuration")?;

    write_template(
        &target.join("hooks").join("prepare.sh"),
        PREPARE_HOOK_TEMPLATE,
        &options.app_name,
        true,
    )
    .inst_context("failed to write prepare hook")?;

    write_template(
        &target.join("hooks").join("complete.sh"),
        COMPLETE_HOOK_TEMPLATE,
        &options.app_name,
        true,
    )
    .inst_context("failed to write complete hook")?;

    Ok(())
}

/// Checks an application name for use in a scaffolded package.
///
/// The name becomes a filename stem and a shell-visible value, so only
/// `[A-Za-z][A-Za-z0-9_-]*` is accepted.
pub fn validate_app_name(value: &str) -> Result<(), InstallError> {
    // The pattern is fixed at compile time and known to parse.
    let pattern = Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").unwrap();

    if pattern.is_match(value) {
        Ok(())
    } else {
        Err(InstallError::new(InstallErrorKind::InvalidInput)
            .with_context(format!("invalid application name {value:?}")))
    }
}

fn write_template(
    path: &Path,
    template: &str,
    app_name: &str,
    executable: bool,
) -> Result<(), InstallError> {
    let contents = template.replace("{appname}", app_name);

    tracing::debug!(?path, "writing template");
    std::fs::write(path, contents)?;

    #[cfg(unix)]
    if executable {
        crate::os::unix::set_posix_permission(
            path,
            crate::os::unix::get_effective_script_permission(),
        )?;
    }

    #[cfg(not(unix))]
    let _ = executable;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_app_name() {
        validate_app_name("orders").unwrap();
        validate_app_name("orders-v2").unwrap();
        validate_app_name("Orders_2024").unwrap();

        assert!(validate_app_name("").is_err());
        assert!(validate_app_name("2orders").is_err());
        assert!(validate_app_name("orders billing").is_err());
        assert!(validate_app_name("orders/billing").is_err());
    }
}
