//! Describing where the TIBCO installation and the application
//! environment are located.
//!
//! The three environment variables consumed by the tool are resolved
//! once into a [`TibcoEnv`] and passed by reference from there on:
//!
//! * `TIBCO_HOME` — root of the TIBCO product installation.
//! * `TIBCO_TRA_HOME` — the TRA installation holding the vendor tools
//!   under `bin/`.
//! * `TIBCO_APPLICATION` — the application environment directory
//!   holding the domain profile.
use std::{
    collections::HashMap,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

use crate::error::{InstallError, InstallErrorKind};

/// Name of the vendor application management tool.
pub const APP_MANAGE: &str = "AppManage";

/// Name of the vendor status check tool.
pub const APP_STATUS_CHECK: &str = "AppStatusCheck";

const DOMAIN_PROFILE_FILENAME: &str = "domain.ron";

/// Resolved locations of the TIBCO installation and the application
/// environment.
#[derive(Debug, Clone)]
pub struct TibcoEnv {
    tibco_home: PathBuf,
    tra_home: PathBuf,
    application_dir: PathBuf,
}

impl TibcoEnv {
    /// Creates an environment from explicit paths.
    pub fn new<P: AsRef<Path>>(tibco_home: P, tra_home: P, application_dir: P) -> Self {
        Self {
            tibco_home: tibco_home.as_ref().to_path_buf(),
            tra_home: tra_home.as_ref().to_path_buf(),
            application_dir: application_dir.as_ref().to_path_buf(),
        }
    }

    /// Resolves the environment from the process environment variables.
    pub fn from_env() -> Result<Self, InstallError> {
        Self::from_env_impl(None)
    }

    fn from_env_impl(
        env_map: Option<HashMap<OsString, OsString>>,
    ) -> Result<Self, InstallError> {
        let get = |key: &str| -> Result<PathBuf, InstallError> {
            let value = if let Some(map) = &env_map {
                map.get(OsStr::new(key))
                    .cloned()
                    .ok_or_else(|| InstallError::from(InstallErrorKind::InvalidEnvironmentVariable))
            } else {
                crate::os::env_var(key)
            };

            value
                .map(PathBuf::from)
                .map_err(|error| error.with_context(key))
        };

        Ok(Self {
            tibco_home: get("TIBCO_HOME")?,
            tra_home: get("TIBCO_TRA_HOME")?,
            application_dir: get("TIBCO_APPLICATION")?,
        })
    }

    /// Returns the root of the TIBCO product installation.
    pub fn tibco_home(&self) -> &Path {
        &self.tibco_home
    }

    /// Returns the TRA installation directory.
    pub fn tra_home(&self) -> &Path {
        &self.tra_home
    }

    /// Returns the application environment directory.
    pub fn application_dir(&self) -> &Path {
        &self.application_dir
    }

    /// Returns the directory containing the vendor tools.
    pub fn tool_bin_dir(&self) -> PathBuf {
        self.tra_home.join("bin")
    }

    /// Returns the path of the `AppManage` tool.
    pub fn app_manage(&self) -> PathBuf {
        self.tool_bin_dir().join(APP_MANAGE)
    }

    /// Returns the path of the `AppStatusCheck` tool.
    pub fn app_status_check(&self) -> PathBuf {
        self.tool_bin_dir().join(APP_STATUS_CHECK)
    }

    /// Returns the expected path of the domain profile document.
    pub fn domain_profile_path(&self) -> PathBuf {
        self.application_dir.join(DOMAIN_PROFILE_FILENAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_env_map() -> HashMap<OsString, OsString> {
        HashMap::from_iter(
            [
                ("TIBCO_HOME", "/opt/tibco"),
                ("TIBCO_TRA_HOME", "/opt/tibco/tra/5.11"),
                ("TIBCO_APPLICATION", "/srv/bw/orders-env"),
            ]
            .into_iter()
            .map(|(k, v)| (k.into(), v.into())),
        )
    }

    #[test]
    fn test_resolve_from_env_map() {
        let env = TibcoEnv::from_env_impl(Some(get_env_map())).unwrap();

        assert_eq!(env.tibco_home(), Path::new("/opt/tibco"));
        assert_eq!(
            env.app_manage(),
            Path::new("/opt/tibco/tra/5.11/bin/AppManage")
        );
        assert_eq!(
            env.app_status_check(),
            Path::new("/opt/tibco/tra/5.11/bin/AppStatusCheck")
        );
        assert_eq!(
            env.domain_profile_path(),
            Path::new("/srv/bw/orders-env/domain.ron")
        );
    }

    #[test]
    fn test_missing_variable() {
        let mut map = get_env_map();
        map.remove(OsStr::new("TIBCO_TRA_HOME"));

        let result = TibcoEnv::from_env_impl(Some(map));

        let error = result.unwrap_err();
        assert!(matches!(
            error.kind(),
            InstallErrorKind::InvalidEnvironmentVariable
        ));
        assert_eq!(error.context(), "TIBCO_TRA_HOME");
    }
}
