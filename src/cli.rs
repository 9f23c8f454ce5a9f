use crate::domain::models::{AssetMode, Channel, PolicyScope};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "proxyctl", version, about = "Operator CLI for the local database proxy")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upgrade proxyctl to the latest version allowed by policy
    Upgrade(UpgradeArgs),
    /// Credential plumbing, guarded by enterprise policy
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Inspect the enterprise policy in effect
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },
}

#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Only check for updates, do not download or install
    #[arg(long)]
    pub check_only: bool,
    /// Download only, do not install
    #[arg(long = "no-install")]
    pub no_install: bool,
    /// Asset type to download
    #[arg(long, value_enum, default_value_t = AssetMode::Auto)]
    pub asset: AssetMode,
    /// Download directory
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// Force update even if the version is the same
    #[arg(long)]
    pub force: bool,
    /// Run the installer in interactive mode (installer only)
    #[arg(long = "no-silent")]
    pub no_silent: bool,
    /// Do not attempt to elevate privileges (installer only)
    #[arg(long = "no-elevate")]
    pub no_elevate: bool,
    /// Update channel
    #[arg(long, value_enum)]
    pub channel: Option<Channel>,
    /// Install a specific version (e.g. 0.4.14 or v0.4.14)
    #[arg(long)]
    pub version: Option<String>,
    /// Pin to a specific version for future upgrades
    #[arg(long)]
    pub pin: Option<String>,
    /// Clear the pinned version
    #[arg(long)]
    pub unpin: bool,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Interactive operator login via the external identity tooling
    Login,
    /// Application-default credential login
    Adc,
    /// Register a service account key for the proxy to use
    SetServiceAccount {
        key_path: PathBuf,
        #[arg(long, value_enum, default_value_t = PolicyScope::User)]
        scope: PolicyScope,
    },
}

#[derive(Subcommand, Debug)]
pub enum PolicyCommands {
    /// Print the loaded enterprise policy
    Show,
}
