//! OS specific functionalities.

use std::{
    ffi::{OsStr, OsString},
    fs::File,
    path::Path,
};

use crate::error::{InstallError, InstallErrorKind};

#[cfg(unix)]
pub(crate) mod unix;

/// Information returned by [`file_checksum`].
#[derive(Debug, Clone, PartialEq)]
pub struct FileChecksum {
    /// CRC32C checksum of the file.
    pub crc32c: u32,
    /// Size of the file.
    pub len: u64,
}

/// Computes a checksum for a file.
pub fn file_checksum<P: AsRef<Path>>(path: P) -> std::io::Result<FileChecksum> {
    let path = path.as_ref();
    tracing::trace!(?path, "file checksum");
    let len = path.metadata()?.len();

    let mut file = File::open(path)?;
    let mut compute = crc32c::Crc32cWriter::new(std::io::empty());

    std::io::copy(&mut file, &mut compute)?;

    Ok(FileChecksum {
        crc32c: compute.crc32c(),
        len,
    })
}

pub(crate) fn env_var<A: AsRef<OsStr>>(key: A) -> Result<OsString, InstallError> {
    tracing::trace!(key = ?key.as_ref(), "env_var");
    std::env::var_os(key.as_ref())
        .ok_or_else(|| InstallErrorKind::InvalidEnvironmentVariable.into())
}
