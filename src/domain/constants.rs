//! Stable constants: env var names, asset markers, well-known paths.

/// Version of the currently running tool, as reported by the launcher.
pub const ENV_CURRENT_VERSION: &str = "PROXYCTL_VERSION";

/// Overrides the enterprise policy file location.
pub const ENV_POLICY_PATH: &str = "PROXYCTL_POLICY_PATH";

/// Overrides the release feed base URL (enterprise mirrors, tests).
pub const ENV_FEED_URL: &str = "PROXYCTL_FEED_URL";

/// Default release feed: GitHub releases API for the official repo.
pub const DEFAULT_FEED_URL: &str = "https://api.github.com/repos/proxyctl-dev/proxyctl";

/// Version assumed when the launcher did not report one.
pub const FALLBACK_VERSION: &str = "0.0.0";

/// Suffix identifying downloadable executables among release assets.
pub const ASSET_EXE_SUFFIX: &str = ".exe";

/// Substring marking the setup/installer package among `.exe` assets.
pub const ASSET_INSTALLER_MARKER: &str = "setup";

/// Name of the detached digest manifest published with every release.
pub const DIGEST_MANIFEST_NAME: &str = "SHA256SUMS";

/// Suffix given to the previous executable during a portable swap.
pub const BACKUP_SUFFIX: &str = "old";

/// Lock file created next to the executable while an apply is in flight.
pub const UPGRADE_LOCK_NAME: &str = ".proxyctl.upgrade.lock";

/// Machine-wide install roots. A running executable under one of these is
/// treated as an installer-managed, system-scope deployment.
#[cfg(windows)]
pub const SYSTEM_SCOPE_ROOTS: &[&str] = &[
    "\\program files",
    "\\program files (x86)",
    "\\programdata",
];

#[cfg(not(windows))]
pub const SYSTEM_SCOPE_ROOTS: &[&str] = &["/usr/", "/opt/"];

/// Fixed policy file location when no override is set.
#[cfg(windows)]
pub const SYSTEM_POLICY_FILE: &str = "C:\\ProgramData\\proxyctl\\policy.json";

#[cfg(not(windows))]
pub const SYSTEM_POLICY_FILE: &str = "/etc/proxyctl/policy.json";
