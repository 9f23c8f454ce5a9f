//! Applying a verified update: installer invocation or portable swap.
//!
//! Precondition for everything here: the downloaded file already passed
//! checksum verification. Nothing is re-checked.
//!
//! The portable path works around the OS lock on a running binary: the
//! executing file cannot be overwritten in place, but it can be renamed
//! within its directory. So the swap is rename-aside, move-in, and the
//! `.old` leftover is swept on a later run once no handle can still be open.
//! Any mid-swap failure rolls the rename back so the install directory is
//! never left without a working executable at the expected path.

use crate::domain::constants::{BACKUP_SUFFIX, UPGRADE_LOCK_NAME};
use crate::domain::errors::UpgradeError;
use crate::services::context::is_system_scope_path;
use fs2::FileExt;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

/// Exclusive lock held while a portable swap is in flight, so two concurrent
/// upgrade invocations cannot race the rename dance.
pub struct UpgradeLock {
    file: std::fs::File,
    path: PathBuf,
}

impl UpgradeLock {
    pub fn acquire(install_dir: &Path) -> Result<Self, UpgradeError> {
        let path = install_dir.join(UPGRADE_LOCK_NAME);
        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)
            .map_err(|e| UpgradeError::io(format!("create upgrade lock {}", path.display()), e))?;
        file.try_lock_exclusive()
            .map_err(|_| UpgradeError::UpgradeInProgress(path.display().to_string()))?;
        Ok(Self { file, path })
    }
}

impl Drop for UpgradeLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
        let _ = std::fs::remove_file(&self.path);
    }
}

pub fn backup_path(exe: &Path) -> PathBuf {
    let name = exe
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    exe.with_file_name(format!("{name}.{BACKUP_SUFFIX}"))
}

/// Removes the `.old` leftover of a previous portable swap. Best-effort: the
/// file may still be held open by a process that has not exited yet, in which
/// case it stays for the next run.
pub fn cleanup_stale_backup(exe: &Path) {
    let backup = backup_path(exe);
    if backup.exists() {
        let _ = std::fs::remove_file(backup);
    }
}

/// Runs the downloaded installer package. `elevate` requests the OS elevation
/// mechanism when the process lacks admin rights. A non-zero exit status is
/// fatal; there is no partial-success interpretation.
pub fn apply_installer(
    installer: &Path,
    silent: bool,
    elevate: bool,
    admin: bool,
) -> Result<(), UpgradeError> {
    let status = spawn_installer(installer, silent, elevate && !admin)?;
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(UpgradeError::InstallerFailed { code }),
        None => Err(UpgradeError::InstallerFailed { code: -1 }),
    }
}

#[cfg(windows)]
fn spawn_installer(
    installer: &Path,
    silent: bool,
    request_elevation: bool,
) -> Result<ExitStatus, UpgradeError> {
    if request_elevation {
        // Start-Process -Verb RunAs is the UAC prompt; -PassThru relays the
        // installer's exit code back through the powershell wrapper.
        let args = if silent { "-ArgumentList '/S' " } else { "" };
        let script = format!(
            "$p = Start-Process -FilePath '{}' {}-Verb RunAs -Wait -PassThru; exit $p.ExitCode",
            installer.display(),
            args
        );
        return std::process::Command::new("powershell")
            .args(["-NoProfile", "-Command", &script])
            .status()
            .map_err(|e| UpgradeError::io("launch elevated installer".to_string(), e));
    }
    let mut cmd = std::process::Command::new(installer);
    if silent {
        cmd.arg("/S");
    }
    cmd.status()
        .map_err(|e| UpgradeError::io(format!("launch installer {}", installer.display()), e))
}

#[cfg(not(windows))]
fn spawn_installer(
    installer: &Path,
    silent: bool,
    request_elevation: bool,
) -> Result<ExitStatus, UpgradeError> {
    if request_elevation {
        return Err(UpgradeError::ElevationRequired(
            "no elevation mechanism on this platform; re-run the upgrade as root".to_string(),
        ));
    }
    let mut cmd = std::process::Command::new(installer);
    if silent {
        cmd.arg("/S");
    }
    cmd.status()
        .map_err(|e| UpgradeError::io(format!("launch installer {}", installer.display()), e))
}

/// Swaps the running executable for the verified download.
pub fn apply_portable(
    downloaded: &Path,
    current_exe: &Path,
    admin: bool,
) -> Result<(), UpgradeError> {
    if is_system_scope_path(current_exe) && !admin {
        return Err(UpgradeError::ElevationRequired(
            "portable update targets a system-scope install; re-run as administrator \
             or use the installer asset"
                .to_string(),
        ));
    }

    let install_dir = current_exe.parent().ok_or_else(|| {
        UpgradeError::UnsupportedRuntimeContext(format!(
            "executable path {} has no parent directory",
            current_exe.display()
        ))
    })?;
    let _lock = UpgradeLock::acquire(install_dir)?;

    let backup = backup_path(current_exe);
    if backup.exists() {
        let _ = std::fs::remove_file(&backup);
    }

    std::fs::rename(current_exe, &backup).map_err(|e| {
        UpgradeError::io(
            format!("set aside running executable as {}", backup.display()),
            e,
        )
    })?;

    if let Err(err) = move_into_place(downloaded, current_exe) {
        rollback(&backup, current_exe);
        return Err(err);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = std::fs::set_permissions(current_exe, std::fs::Permissions::from_mode(0o755))
        {
            rollback(&backup, current_exe);
            return Err(UpgradeError::io(
                format!("mark {} executable", current_exe.display()),
                e,
            ));
        }
    }

    Ok(())
}

/// Rename is atomic within a directory but fails across filesystems (the
/// download dir usually lives elsewhere), so fall back to copy-and-delete.
fn move_into_place(src: &Path, dest: &Path) -> Result<(), UpgradeError> {
    if std::fs::rename(src, dest).is_ok() {
        return Ok(());
    }
    std::fs::copy(src, dest)
        .map_err(|e| UpgradeError::io(format!("move {} into place", src.display()), e))?;
    let _ = std::fs::remove_file(src);
    Ok(())
}

fn rollback(backup: &Path, current_exe: &Path) {
    let _ = std::fs::remove_file(current_exe);
    let _ = std::fs::rename(backup, current_exe);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn portable_swap_replaces_executable_and_keeps_backup() {
        let tmp = TempDir::new().unwrap();
        let exe = tmp.path().join("proxyctl");
        let incoming = tmp.path().join("downloads").join("proxyctl.new");
        std::fs::write(&exe, b"old binary").unwrap();
        std::fs::create_dir_all(incoming.parent().unwrap()).unwrap();
        std::fs::write(&incoming, b"new binary").unwrap();

        apply_portable(&incoming, &exe, false).unwrap();

        assert_eq!(std::fs::read(&exe).unwrap(), b"new binary");
        assert_eq!(std::fs::read(backup_path(&exe)).unwrap(), b"old binary");
        assert!(!incoming.exists());
    }

    #[test]
    fn failed_incoming_move_rolls_back_the_rename() {
        let tmp = TempDir::new().unwrap();
        let exe = tmp.path().join("proxyctl");
        std::fs::write(&exe, b"old binary").unwrap();
        let missing = tmp.path().join("downloads").join("does-not-exist");

        let err = apply_portable(&missing, &exe, false).unwrap_err();
        assert!(matches!(err, UpgradeError::Io { .. }));

        // The original executable is back at its expected path.
        assert_eq!(std::fs::read(&exe).unwrap(), b"old binary");
        assert!(!backup_path(&exe).exists());
    }

    #[cfg(unix)]
    #[test]
    fn system_scope_without_admin_fails_before_touching_files() {
        let tmp = TempDir::new().unwrap();
        let incoming = tmp.path().join("proxyctl.new");
        std::fs::write(&incoming, b"new binary").unwrap();

        let err = apply_portable(&incoming, Path::new("/usr/local/bin/proxyctl"), false)
            .unwrap_err();
        assert!(matches!(err, UpgradeError::ElevationRequired(_)));
        assert!(incoming.exists());
    }

    #[test]
    fn held_lock_refuses_a_second_apply() {
        let tmp = TempDir::new().unwrap();
        let exe = tmp.path().join("proxyctl");
        let incoming = tmp.path().join("proxyctl.new");
        std::fs::write(&exe, b"old binary").unwrap();
        std::fs::write(&incoming, b"new binary").unwrap();

        let _held = UpgradeLock::acquire(tmp.path()).unwrap();
        let err = apply_portable(&incoming, &exe, false).unwrap_err();
        assert!(matches!(err, UpgradeError::UpgradeInProgress(_)));
        assert_eq!(std::fs::read(&exe).unwrap(), b"old binary");
    }

    #[test]
    fn stale_backup_is_swept() {
        let tmp = TempDir::new().unwrap();
        let exe = tmp.path().join("proxyctl");
        let backup = backup_path(&exe);
        std::fs::write(&backup, b"previous version").unwrap();

        cleanup_stale_backup(&exe);
        assert!(!backup.exists());
    }
}
