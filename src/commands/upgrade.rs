//! The self-update pipeline.
//!
//! One upgrade attempt walks CHECK → SELECT_ASSET → FETCH_DIGESTS →
//! DOWNLOAD → VERIFY → APPLY in strict order. Every transition is one-way;
//! a failure at any stage ends the attempt with that stage's error. The only
//! retry anywhere is the download stage's bounded attempt count.

use crate::cli::UpgradeArgs;
use crate::domain::errors::UpgradeError;
use crate::domain::models::{
    AssetMode, Channel, ConfigPatch, InstallContext, Invocation, UpgradeOutcome,
};
use crate::feed::{FeedClient, ReleaseInfo};
use crate::services::apply::{apply_installer, apply_portable, cleanup_stale_backup};
use crate::services::assets::pick_asset;
use crate::services::checksum::{fetch_digests, verify_sha256};
use crate::services::config::{audit, read_config, write_config};
use crate::services::context::{current_exe, detect_install_context, is_admin};
use crate::services::download::download_file;
use crate::services::output::{emit_json, say};
use crate::services::policy::{read_policy, resolve_upgrade_policy, RequestedOptions};
use serde_json::json;

pub fn handle_upgrade(inv: &Invocation, json: bool, args: &UpgradeArgs) -> anyhow::Result<()> {
    let policy = read_policy(inv)?;
    let config = read_config(inv);

    let requested = RequestedOptions {
        channel: args.channel,
        version: args.version.clone(),
        pin: args.pin.clone(),
        unpin: args.unpin,
    };
    let resolved = resolve_upgrade_policy(policy.as_ref(), &requested)?;

    // Precedence: policy > flag > stored preference > stable.
    let channel = resolved
        .channel
        .or(args.channel)
        .or(config.update_channel)
        .unwrap_or(Channel::Stable);

    // Persist preference changes before the check so they stick even if the
    // feed is unreachable afterwards.
    if args.unpin {
        write_config(
            inv,
            ConfigPatch {
                clear_pinned_version: true,
                ..Default::default()
            },
        )?;
        audit(inv, "upgrade.unpin", json!({}));
    }
    if let Some(pin) = &args.pin {
        write_config(
            inv,
            ConfigPatch {
                pinned_version: Some(pin.clone()),
                update_channel: Some(channel),
                ..Default::default()
            },
        )?;
        audit(inv, "upgrade.pin", json!({ "version": pin }));
    } else if args.channel.is_some() {
        write_config(
            inv,
            ConfigPatch {
                update_channel: Some(channel),
                ..Default::default()
            },
        )?;
    }

    // An enforced pin is authoritative; the operator's flags only matter
    // when policy left the target open.
    let target_version = resolved
        .target_version
        .clone()
        .or_else(|| args.version.clone())
        .or_else(|| args.pin.clone())
        .or_else(|| {
            if args.unpin {
                None
            } else {
                config.pinned_version.clone()
            }
        });

    match &target_version {
        Some(target) => say(
            json,
            format!(
                "Checking for updates (current: v{}, channel: {channel}, target: {target})...",
                inv.current_version
            ),
        ),
        None => say(
            json,
            format!(
                "Checking for updates (current: v{}, channel: {channel})...",
                inv.current_version
            ),
        ),
    }

    let client = FeedClient::new(&inv.feed_base)?;
    let status = client.check(&inv.current_version, channel, target_version.as_deref())?;

    if !status.update_available && !args.force {
        if json {
            emit_json(&status)?;
        } else {
            say(
                json,
                format!(
                    "You are already on the latest version (v{}).",
                    crate::feed::normalize_version(&status.latest_version)
                ),
            );
        }
        return Ok(());
    }

    say(
        json,
        format!("New version available: {}", status.latest_version),
    );

    if args.check_only {
        if json {
            emit_json(&status)?;
        }
        return Ok(());
    }

    // With --force and no actual update, the status carries no release info;
    // re-fetch so the invariant "apply never reads an unset release" holds.
    let release: ReleaseInfo = match status.release_info.clone() {
        Some(r) => r,
        None => match target_version.as_deref() {
            Some(v) => client.fetch_by_tag(v)?,
            None => client.fetch_latest(channel)?,
        },
    };

    let exe = current_exe()?;
    cleanup_stale_backup(&exe);
    let context = detect_install_context(&exe);

    let asset = pick_asset(&release, args.asset, context)?.clone();
    say(json, format!("Selected asset: {}", asset.name));

    say(json, "Fetching checksums...");
    let digests = fetch_digests(&client, &release)?;
    let expected = digests
        .get(&asset.name)
        .ok_or_else(|| UpgradeError::NoDigestFound(asset.name.clone()))?;

    let download_dir = args.dir.clone().unwrap_or_else(|| inv.download_dir());
    let download_path = download_dir.join(&asset.name);
    say(json, format!("Downloading to {}...", download_path.display()));
    download_file(&asset.url, &download_path)?;

    say(json, "Verifying checksum...");
    if !verify_sha256(&download_path, expected)? {
        // Do not leave a known-bad file lying around for a later install.
        let _ = std::fs::remove_file(&download_path);
        return Err(UpgradeError::ChecksumMismatch { asset: asset.name }.into());
    }
    say(json, "Checksum verified.");

    if args.no_install {
        say(json, "Download complete. Install skipped (--no-install).");
        if json {
            emit_json(&UpgradeOutcome {
                status: "downloaded".to_string(),
                version: status.latest_version.clone(),
                asset: Some(asset.name.clone()),
                path: Some(download_path.display().to_string()),
            })?;
        }
        return Ok(());
    }

    let admin = is_admin();
    let installer_path = match args.asset {
        AssetMode::Auto => context == InstallContext::Installer,
        AssetMode::Installer => true,
        AssetMode::Exe => false,
    };

    if installer_path {
        if !admin && args.no_elevate {
            return Err(UpgradeError::ElevationRequired(
                "system-scope update requires elevation; re-run without --no-elevate \
                 or from an administrator shell"
                    .to_string(),
            )
            .into());
        }
        say(json, "Applying update via installer...");
        apply_installer(&download_path, !args.no_silent, !args.no_elevate, admin)?;
    } else {
        say(json, "Applying portable update...");
        apply_portable(&download_path, &exe, admin)?;
    }

    audit(
        inv,
        "upgrade.applied",
        json!({ "version": status.latest_version, "asset": asset.name }),
    );
    say(
        json,
        format!("Updated to {}.", status.latest_version),
    );
    if json {
        emit_json(&UpgradeOutcome {
            status: "updated".to_string(),
            version: status.latest_version,
            asset: Some(asset.name),
            path: None,
        })?;
    }
    Ok(())
}
