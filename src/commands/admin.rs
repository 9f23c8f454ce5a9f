//! Policy-guarded credential commands and policy inspection.
//!
//! The credential flows themselves belong to the external identity tooling;
//! these handlers enforce the enterprise auth policy, persist what the proxy
//! needs, and tell the operator what happens next.

use crate::cli::{AuthCommands, PolicyCommands};
use crate::domain::errors::UpgradeError;
use crate::domain::models::{ConfigPatch, Invocation, PolicyScope};
use crate::services::config::{audit, write_config};
use crate::services::context::is_admin;
use crate::services::output::{emit_json, say};
use crate::services::policy::{assert_policy_allows_auth, policy_path, read_policy, AuthAction};
use serde_json::json;

pub fn handle_auth_commands(
    inv: &Invocation,
    json: bool,
    command: &AuthCommands,
) -> anyhow::Result<()> {
    let policy = read_policy(inv)?;

    match command {
        AuthCommands::Login => {
            assert_policy_allows_auth(policy.as_ref(), AuthAction::Login, None)?;
            audit(inv, "auth.login", json!({}));
            say(
                json,
                "Login is delegated to the identity CLI. Run it and re-invoke proxyctl once \
                 credentials are in place.",
            );
            if json {
                emit_json(&json!({ "action": "login", "allowed": true }))?;
            }
        }
        AuthCommands::Adc => {
            assert_policy_allows_auth(policy.as_ref(), AuthAction::Adc, None)?;
            audit(inv, "auth.adc", json!({}));
            say(
                json,
                "Application-default login is delegated to the identity CLI.",
            );
            if json {
                emit_json(&json!({ "action": "adc", "allowed": true }))?;
            }
        }
        AuthCommands::SetServiceAccount { key_path, scope } => {
            assert_policy_allows_auth(
                policy.as_ref(),
                AuthAction::SetServiceAccount,
                Some(*scope),
            )?;
            if *scope == PolicyScope::Machine && !is_admin() {
                return Err(UpgradeError::ElevationRequired(
                    "machine-scope service account registration requires administrator rights"
                        .to_string(),
                )
                .into());
            }
            if !key_path.exists() {
                anyhow::bail!("service account key not found: {}", key_path.display());
            }
            write_config(
                inv,
                ConfigPatch {
                    service_account_key: Some(key_path.display().to_string()),
                    ..Default::default()
                },
            )?;
            audit(
                inv,
                "auth.set_service_account",
                json!({ "scope": scope.to_string() }),
            );
            say(
                json,
                format!("Service account key registered ({scope} scope)."),
            );
            if json {
                emit_json(&json!({
                    "action": "set-service-account",
                    "scope": scope.to_string(),
                    "keyPath": key_path.display().to_string(),
                }))?;
            }
        }
    }
    Ok(())
}

pub fn handle_policy_commands(
    inv: &Invocation,
    json: bool,
    command: &PolicyCommands,
) -> anyhow::Result<()> {
    match command {
        PolicyCommands::Show => {
            // Validate through the typed loader, then show the raw document
            // so administrators see exactly what is on disk.
            let loaded = read_policy(inv)?;
            let path = policy_path(inv);
            if loaded.is_none() {
                if json {
                    emit_json(&json!({ "policy": null }))?;
                } else {
                    say(json, format!("no enterprise policy at {}", path.display()));
                }
                return Ok(());
            }
            let raw = std::fs::read_to_string(&path)?;
            let doc: serde_json::Value = serde_json::from_str(&raw)?;
            if json {
                emit_json(&json!({ "policy": doc, "path": path.display().to_string() }))?;
            } else {
                say(json, format!("policy file: {}", path.display()));
                say(json, serde_json::to_string_pretty(&doc)?);
            }
        }
    }
    Ok(())
}
