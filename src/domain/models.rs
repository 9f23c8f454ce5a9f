use crate::domain::constants::{
    DEFAULT_FEED_URL, ENV_CURRENT_VERSION, ENV_FEED_URL, ENV_POLICY_PATH, FALLBACK_VERSION,
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Named update track selecting which release stream counts as "latest".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Stable,
    Beta,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Stable => write!(f, "stable"),
            Channel::Beta => write!(f, "beta"),
        }
    }
}

/// Scope of a credential action. Serialized capitalized, matching the
/// policy file schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum PolicyScope {
    User,
    Machine,
}

impl std::fmt::Display for PolicyScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyScope::User => write!(f, "User"),
            PolicyScope::Machine => write!(f, "Machine"),
        }
    }
}

/// How the running binary was deployed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallContext {
    /// Machine-wide deployment managed by the setup package.
    Installer,
    /// Self-contained per-user executable.
    Portable,
}

/// Which release artifact the operator asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AssetMode {
    Auto,
    Installer,
    Exe,
}

/// Enterprise policy document. Absence of the file (or of any field) means
/// "no constraint". Loaded once per invocation, read-only afterwards.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnterprisePolicy {
    pub updates: UpdatePolicy,
    pub auth: AuthPolicy,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePolicy {
    pub enabled: Option<bool>,
    pub channel: Option<Channel>,
    pub pinned_version: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthPolicy {
    pub allow_user_login: Option<bool>,
    pub allow_adc_login: Option<bool>,
    pub allow_service_account_key: Option<bool>,
    pub allowed_scopes: Option<Vec<PolicyScope>>,
}

/// The single source of truth for what the pipeline may install. Computed by
/// the policy resolver, never persisted. An enforced `target_version` is
/// authoritative: no later stage may substitute a different version.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolvedUpgradePolicy {
    pub channel: Option<Channel>,
    pub target_version: Option<String>,
}

/// Durable user preferences, persisted between invocations by the config
/// store. Unknown fields in the file are preserved on write.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub update_channel: Option<Channel>,
    pub pinned_version: Option<String>,
    pub service_account_key: Option<String>,
}

/// A partial config write. `Some` fields overwrite, `clear_*` flags remove,
/// everything else in the file is left alone.
#[derive(Debug, Default)]
pub struct ConfigPatch {
    pub update_channel: Option<Channel>,
    pub pinned_version: Option<String>,
    pub clear_pinned_version: bool,
    pub service_account_key: Option<String>,
}

/// Inputs the process reads from its environment, captured once at startup
/// so the pipeline itself never touches globals.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub current_version: String,
    pub policy_path_override: Option<PathBuf>,
    pub feed_base: String,
    pub home: PathBuf,
}

impl Invocation {
    pub fn from_env() -> anyhow::Result<Self> {
        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(PathBuf::from)
            .ok_or_else(|| anyhow::anyhow!("HOME is not set"))?;
        Ok(Self {
            current_version: std::env::var(ENV_CURRENT_VERSION)
                .unwrap_or_else(|_| FALLBACK_VERSION.to_string()),
            policy_path_override: std::env::var_os(ENV_POLICY_PATH).map(PathBuf::from),
            feed_base: std::env::var(ENV_FEED_URL)
                .unwrap_or_else(|_| DEFAULT_FEED_URL.to_string()),
            home,
        })
    }

    pub fn config_dir(&self) -> PathBuf {
        self.home.join(".config").join("proxyctl")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join("config.json")
    }

    pub fn download_dir(&self) -> PathBuf {
        self.home.join(".cache").join("proxyctl").join("downloads")
    }
}

/// Result of the release check stage. `release_info` is `Some` whenever
/// `update_available` is true.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatus {
    pub update_available: bool,
    pub latest_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_info: Option<crate::feed::ReleaseInfo>,
}

/// Terminal report of one upgrade invocation, for `--json` output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeOutcome {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}
