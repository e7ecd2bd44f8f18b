use std::os::unix::fs::PermissionsExt;
use std::{path::Path, sync::LazyLock};

pub fn get_umask() -> u32 {
    static UMASK: LazyLock<u32> = LazyLock::new(|| {
        let value = unsafe {
            // SAFETY: we're only getting and setting integers.
            let current = libc::umask(0o022);
            libc::umask(current);
            current
        };
        // Cast used because it might be u16 on macOS.
        value as u32
    });

    *UMASK
}

/// Mode for an executable hook script, honoring the process umask.
pub fn get_effective_script_permission() -> u32 {
    0o777 & !get_umask()
}

/// Mode for the credential file: owner read/write only.
pub const CREDENTIAL_FILE_MODE: u32 = 0o600;

pub fn set_posix_permission(target: &Path, mode: u32) -> std::io::Result<()> {
    let mut perm = target.metadata()?.permissions();
    perm.set_mode(mode);
    std::fs::set_permissions(target, perm)?;
    Ok(())
}
