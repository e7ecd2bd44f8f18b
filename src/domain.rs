//! The target domain and the operator credentials.
//!
//! The target domain name and the administrator login are not given on
//! the command line; they are read from the domain profile document in
//! the application environment directory (`TIBCO_APPLICATION`):
//!
//! ```text
//! (
//!     domain: "BWDEV",
//!     user: "admin",
//! )
//! ```
//!
//! The administrator password is prompted for at run time and only ever
//! written to a temporary credential file that is removed when the
//! installer returns.
use std::{
    fmt::Debug,
    io::{Cursor, Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{AddContext, InstallError, InstallErrorKind};

/// Profile of the target BW domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[non_exhaustive]
pub struct DomainProfile {
    /// Name of the target domain.
    pub domain: String,
    /// Administrator login used by the vendor tool.
    pub user: String,
}

impl DomainProfile {
    /// Deserialize from the given path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InstallError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(InstallError::new(InstallErrorKind::DomainProfileNotFound)
                .with_context(path.to_string_lossy()));
        }

        let buf =
            std::fs::read(path).with_contextc(|_error| format!("could not open file {path:?}"))?;

        Self::from_reader(Cursor::new(buf))
    }

    /// Deserialize from the given reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InstallError> {
        let profile = ron::de::from_reader::<R, Self>(reader).map_err(|error| {
            InstallError::new(InstallErrorKind::MalformedDomainProfile).with_source(error)
        })?;

        Ok(profile)
    }
}

/// Operator credentials for the domain administrator account.
#[derive(Clone)]
pub struct Credentials {
    /// Administrator login.
    pub username: String,
    /// Administrator password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials from a username and password pair.
    pub fn new<S: Into<String>>(username: S, password: S) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Debug for Credentials {
    // The password must never reach the logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Temporary credential file passed to the vendor tool via `-cred` and
/// to hook scripts via `INSTALL_CREDENTIAL`.
///
/// The file holds a Java properties document:
///
/// ```text
/// Username=admin
/// Password=...
/// ```
///
/// It is restricted to mode 0600 on Unix and deleted on drop, on both
/// success and failure paths.
#[derive(Debug)]
pub struct CredentialFile {
    file: NamedTempFile,
}

impl CredentialFile {
    /// Writes the credentials to a new temporary file.
    pub fn create(credentials: &Credentials) -> Result<Self, InstallError> {
        let mut file = tempfile::Builder::new()
            .prefix("bwinstall-cred-")
            .suffix(".properties")
            .tempfile()?;

        writeln!(file, "Username={}", credentials.username)?;
        writeln!(file, "Password={}", credentials.password)?;
        file.flush()?;

        #[cfg(unix)]
        crate::os::unix::set_posix_permission(file.path(), crate::os::unix::CREDENTIAL_FILE_MODE)?;

        tracing::debug!(path = ?file.path(), "created credential file");

        Ok(Self { file })
    }

    /// Returns the path of the credential file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
