//! Command handler layer.
//!
//! ## Files
//! - `upgrade.rs` — the self-update pipeline.
//! - `admin.rs` — policy-guarded auth commands and policy inspection.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate business logic to `services/*` and `feed`.
//! - Keep behavior and `--json` output schema stable.

pub mod admin;
pub mod upgrade;

use crate::cli::{Cli, Commands};
use crate::domain::models::Invocation;

pub fn dispatch(inv: &Invocation, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Upgrade(args) => upgrade::handle_upgrade(inv, cli.json, args),
        Commands::Auth { command } => admin::handle_auth_commands(inv, cli.json, command),
        Commands::Policy { command } => admin::handle_policy_commands(inv, cli.json, command),
    }
}
