//! Install context and privilege detection.
//!
//! Feeds both the asset selector (auto mode) and the update applier
//! (elevation gating). Deliberately coarse: string checks against well-known
//! machine-wide roots, not filesystem ACL inspection.

use crate::domain::constants::SYSTEM_SCOPE_ROOTS;
use crate::domain::errors::UpgradeError;
use crate::domain::models::InstallContext;
use std::path::{Path, PathBuf};

/// Resolved path of the running executable. Without it there is no way to
/// self-replace, so failure is `UnsupportedRuntimeContext`.
pub fn current_exe() -> Result<PathBuf, UpgradeError> {
    std::env::current_exe().map_err(|e| {
        UpgradeError::UnsupportedRuntimeContext(format!(
            "cannot resolve the running executable path: {e}"
        ))
    })
}

/// A binary living under a machine-wide install root was deployed by the
/// setup package; everything else is a self-contained portable executable.
pub fn detect_install_context(exe_path: &Path) -> InstallContext {
    if is_system_scope_path(exe_path) {
        InstallContext::Installer
    } else {
        InstallContext::Portable
    }
}

/// Coarse check for locations shared by all users of the machine. Writing
/// there needs elevation regardless of how the tool was deployed.
pub fn is_system_scope_path(path: &Path) -> bool {
    let normalized = path.to_string_lossy().to_ascii_lowercase();
    SYSTEM_SCOPE_ROOTS.iter().any(|root| normalized.contains(root))
}

#[cfg(unix)]
pub fn is_admin() -> bool {
    nix::unistd::geteuid().is_root()
}

#[cfg(windows)]
pub fn is_admin() -> bool {
    // `net session` fails with "access denied" unless the shell is elevated.
    std::process::Command::new("net")
        .arg("session")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn machine_roots_classify_as_installer_context() {
        assert_eq!(
            detect_install_context(Path::new("/usr/local/bin/proxyctl")),
            InstallContext::Installer
        );
        assert_eq!(
            detect_install_context(Path::new("/opt/proxyctl/proxyctl")),
            InstallContext::Installer
        );
    }

    #[cfg(unix)]
    #[test]
    fn user_paths_classify_as_portable_context() {
        assert_eq!(
            detect_install_context(Path::new("/home/op/.local/bin/proxyctl")),
            InstallContext::Portable
        );
        assert!(!is_system_scope_path(Path::new("/tmp/proxyctl")));
    }

    #[cfg(windows)]
    #[test]
    fn program_files_classify_as_installer_context() {
        assert_eq!(
            detect_install_context(Path::new("C:\\Program Files\\proxyctl\\proxyctl.exe")),
            InstallContext::Installer
        );
        assert!(is_system_scope_path(Path::new(
            "C:\\ProgramData\\proxyctl\\proxyctl.exe"
        )));
    }
}
