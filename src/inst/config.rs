use crate::domain::Credentials;

/// Parameters that control how a package is installed.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct InstallConfig {
    /// Replace the deployed configuration with the package's base
    /// configuration instead of merging on upgrade.
    pub overwrite: bool,
    /// Deploy the application after uploading it.
    pub deploy: bool,
    /// Domain administrator credentials.
    pub credentials: Credentials,
}

impl InstallConfig {
    /// Creates a config with the given credentials and both flags off.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            overwrite: false,
            deploy: false,
            credentials,
        }
    }
}
