//! Enterprise policy: loading, upgrade-policy resolution, auth guardrails.
//!
//! The policy file is optional. When present it can disable updates outright,
//! restrict the channel, pin an exact version, and fence off credential
//! actions. Resolution merges the administrator's constraints with whatever
//! the operator asked for on the command line, rejecting contradictions.

use crate::domain::constants::SYSTEM_POLICY_FILE;
use crate::domain::errors::UpgradeError;
use crate::domain::models::{Channel, EnterprisePolicy, Invocation, PolicyScope, ResolvedUpgradePolicy};
use crate::feed::normalize_version;
use std::path::PathBuf;

/// What the operator asked for on the command line, before policy is applied.
#[derive(Debug, Default, Clone)]
pub struct RequestedOptions {
    pub channel: Option<Channel>,
    pub version: Option<String>,
    pub pin: Option<String>,
    pub unpin: bool,
}

/// Credential actions subject to the auth policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Login,
    Adc,
    SetServiceAccount,
}

pub fn policy_path(inv: &Invocation) -> PathBuf {
    match &inv.policy_path_override {
        Some(p) => p.clone(),
        None => PathBuf::from(SYSTEM_POLICY_FILE),
    }
}

/// Reads the policy file once. A missing file means "no constraints"; a file
/// that exists but cannot be parsed is a hard error, never silently ignored.
pub fn read_policy(inv: &Invocation) -> anyhow::Result<Option<EnterprisePolicy>> {
    let path = policy_path(inv);
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path)?;
    let policy: EnterprisePolicy = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("invalid policy.json at {}: {e}", path.display()))?;
    Ok(Some(policy))
}

/// Merges policy constraints with requested options into the single
/// authoritative resolution the rest of the pipeline obeys.
pub fn resolve_upgrade_policy(
    policy: Option<&EnterprisePolicy>,
    requested: &RequestedOptions,
) -> Result<ResolvedUpgradePolicy, UpgradeError> {
    let Some(policy) = policy else {
        return Ok(ResolvedUpgradePolicy::default());
    };

    if policy.updates.enabled == Some(false) {
        return Err(UpgradeError::PolicyViolation(
            "updates are disabled by enterprise policy".to_string(),
        ));
    }

    let enforced_channel = policy.updates.channel;
    if let (Some(enforced), Some(asked)) = (enforced_channel, requested.channel) {
        if enforced != asked {
            return Err(UpgradeError::PolicyViolation(format!(
                "update channel is restricted by enterprise policy (allowed: {enforced})"
            )));
        }
    }

    if let Some(enforced_pin) = &policy.updates.pinned_version {
        if requested.pin.is_some() || requested.unpin {
            return Err(UpgradeError::PolicyViolation(
                "pin/unpin is managed by enterprise policy".to_string(),
            ));
        }
        let enforced = normalize_version(enforced_pin);
        if let Some(asked) = &requested.version {
            if normalize_version(asked) != enforced {
                return Err(UpgradeError::PolicyViolation(format!(
                    "target version is restricted by enterprise policy (allowed: {enforced})"
                )));
            }
        }
        return Ok(ResolvedUpgradePolicy {
            channel: enforced_channel,
            target_version: Some(enforced.to_string()),
        });
    }

    Ok(ResolvedUpgradePolicy {
        channel: enforced_channel,
        target_version: None,
    })
}

/// Rejects credential actions the policy fences off. No policy, no fence.
pub fn assert_policy_allows_auth(
    policy: Option<&EnterprisePolicy>,
    action: AuthAction,
    scope: Option<PolicyScope>,
) -> Result<(), UpgradeError> {
    let Some(policy) = policy else {
        return Ok(());
    };

    match action {
        AuthAction::Login if policy.auth.allow_user_login == Some(false) => {
            return Err(UpgradeError::PolicyViolation(
                "interactive login is disabled by enterprise policy".to_string(),
            ));
        }
        AuthAction::Adc if policy.auth.allow_adc_login == Some(false) => {
            return Err(UpgradeError::PolicyViolation(
                "application-default login is disabled by enterprise policy".to_string(),
            ));
        }
        AuthAction::SetServiceAccount if policy.auth.allow_service_account_key == Some(false) => {
            return Err(UpgradeError::PolicyViolation(
                "service account key management is disabled by enterprise policy".to_string(),
            ));
        }
        _ => {}
    }

    if action == AuthAction::SetServiceAccount {
        if let (Some(scope), Some(allowed)) = (scope, &policy.auth.allowed_scopes) {
            if !allowed.contains(&scope) {
                return Err(UpgradeError::PolicyViolation(format!(
                    "scope '{scope}' is not allowed by enterprise policy"
                )));
            }
        }
    }

    Ok(())
}
