use std::{
    fs::File,
    path::{Path, PathBuf},
};

use crate::error::{InstallError, InstallErrorKind};

/// Filename of the package descriptor inside a package directory.
pub const PACKAGE_INFO_FILENAME: &str = "package-info";

const DEFAULT_CONFIG_DIR: &str = "envconfig";

/// Parsed `package-info` descriptor.
///
/// The descriptor is a small shell-sourced style metadata file with one
/// `key=value` assignment per line:
///
/// ```text
/// # BW application package
/// appname=orders
/// archive=orders.ear
/// prepare=hooks/prepare.sh
/// complete=hooks/complete.sh
/// ```
///
/// `#` starts a comment and values may be wrapped in single or double
/// quotes. The `prepare` and `complete` keys may be repeated; each
/// occurrence appends one hook script. All paths are relative to the
/// package directory.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct PackageInfo {
    app_name: String,
    archive: PathBuf,
    config_dir: PathBuf,
    prepare: Vec<PathBuf>,
    complete: Vec<PathBuf>,
}

impl PackageInfo {
    /// Reads and parses the descriptor from a package directory.
    pub fn load<P: AsRef<Path>>(package_dir: P) -> Result<Self, InstallError> {
        let path = package_dir.as_ref().join(PACKAGE_INFO_FILENAME);
        tracing::debug!(?path, "reading package descriptor");

        let text = std::fs::read_to_string(&path).map_err(|source| {
            InstallError::new(InstallErrorKind::InvalidPackageInfo)
                .with_source(source)
                .with_context(path.to_string_lossy())
        })?;

        Self::parse(&text).map_err(|error| {
            InstallError::from(error).with_context(path.to_string_lossy())
        })
    }

    /// Parses descriptor text.
    pub fn parse(text: &str) -> Result<Self, PackageInfoError> {
        let mut app_name: Option<String> = None;
        let mut archive: Option<PathBuf> = None;
        let mut config_dir: Option<PathBuf> = None;
        let mut prepare = Vec::new();
        let mut complete = Vec::new();

        for (index, raw_line) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw_line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or(PackageInfoError::Syntax { line: line_number })?;
            let key = key.trim();
            let value = unquote(value.trim());

            if value.is_empty() {
                return Err(PackageInfoError::EmptyValue {
                    key: key.to_string(),
                    line: line_number,
                });
            }

            match key {
                "appname" => set_scalar(&mut app_name, key, value.to_string(), line_number)?,
                "archive" => {
                    set_scalar(&mut archive, key, relative_path(value, line_number)?, line_number)?
                }
                "config" => set_scalar(
                    &mut config_dir,
                    key,
                    relative_path(value, line_number)?,
                    line_number,
                )?,
                "prepare" => prepare.push(relative_path(value, line_number)?),
                "complete" => complete.push(relative_path(value, line_number)?),
                _ => {
                    return Err(PackageInfoError::UnknownKey {
                        key: key.to_string(),
                        line: line_number,
                    })
                }
            }
        }

        Ok(Self {
            app_name: app_name.ok_or(PackageInfoError::MissingKey { key: "appname" })?,
            archive: archive.ok_or(PackageInfoError::MissingKey { key: "archive" })?,
            config_dir: config_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
            prepare,
            complete,
        })
    }

    /// Returns the application name.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Returns the archive path relative to the package directory.
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    /// Returns the per-domain configuration directory relative to the
    /// package directory.
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the prepare hook scripts in declaration order.
    pub fn prepare_hooks(&self) -> &[PathBuf] {
        &self.prepare
    }

    /// Returns the complete hook scripts in declaration order.
    pub fn complete_hooks(&self) -> &[PathBuf] {
        &self.complete
    }

    /// Checks that the declared files can be read.
    ///
    /// This is intended as a quick test for basic errors before any
    /// external tool is invoked.
    pub fn verify<P: AsRef<Path>>(&self, package_dir: P) -> Result<(), InstallError> {
        let package_dir = package_dir.as_ref();

        let mut declared = vec![&self.archive];
        declared.extend(self.prepare.iter());
        declared.extend(self.complete.iter());

        for entry in declared {
            let path = package_dir.join(entry);

            let _ = File::open(&path).map_err(|source| {
                InstallError::new(InstallErrorKind::MissingPackageFile)
                    .with_source(source)
                    .with_context(path.to_string_lossy())
            })?;
        }

        Ok(())
    }
}

fn set_scalar<T>(
    slot: &mut Option<T>,
    key: &str,
    value: T,
    line: usize,
) -> Result<(), PackageInfoError> {
    if slot.is_some() {
        return Err(PackageInfoError::DuplicateKey {
            key: key.to_string(),
            line,
        });
    }

    *slot = Some(value);
    Ok(())
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();

    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];

        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }

    value
}

// Descriptor paths must stay inside the package directory.
fn relative_path(value: &str, line: usize) -> Result<PathBuf, PackageInfoError> {
    let path = PathBuf::from(value);

    let valid = path
        .components()
        .all(|component| matches!(component, std::path::Component::Normal(_)));

    if valid {
        Ok(path)
    } else {
        Err(PackageInfoError::InvalidPath { path, line })
    }
}

/// Error for parsing a `package-info` descriptor.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PackageInfoError {
    /// A line is not a `key=value` assignment.
    #[error("line {line}: not a key=value assignment")]
    Syntax {
        /// One-based line number.
        line: usize,
    },

    /// A key this tool does not understand.
    #[error("line {line}: unknown key {key:?}")]
    UnknownKey {
        /// The offending key.
        key: String,
        /// One-based line number.
        line: usize,
    },

    /// A single-valued key appeared twice.
    #[error("line {line}: duplicate key {key:?}")]
    DuplicateKey {
        /// The offending key.
        key: String,
        /// One-based line number.
        line: usize,
    },

    /// A key with an empty value.
    #[error("line {line}: empty value for key {key:?}")]
    EmptyValue {
        /// The offending key.
        key: String,
        /// One-based line number.
        line: usize,
    },

    /// A path that is absolute or leaves the package directory.
    #[error("line {line}: invalid package path {path:?}")]
    InvalidPath {
        /// The offending path.
        path: PathBuf,
        /// One-based line number.
        line: usize,
    },

    /// A required key is absent.
    #[error("missing key {key:?}")]
    MissingKey {
        /// The absent key.
        key: &'static str,
    },
}

impl From<PackageInfoError> for InstallError {
    fn from(value: PackageInfoError) -> Self {
        InstallError::new(InstallErrorKind::InvalidPackageInfo).with_source(value)
    }
}
