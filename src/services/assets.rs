//! Deterministic selection of the one downloadable artifact for a release.

use crate::domain::constants::{ASSET_EXE_SUFFIX, ASSET_INSTALLER_MARKER};
use crate::domain::errors::UpgradeError;
use crate::domain::models::{AssetMode, InstallContext};
use crate::feed::{Asset, ReleaseInfo};

fn is_installer_asset(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(ASSET_EXE_SUFFIX) && lower.contains(ASSET_INSTALLER_MARKER)
}

fn is_portable_asset(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(ASSET_EXE_SUFFIX) && !lower.contains(ASSET_INSTALLER_MARKER)
}

/// Picks exactly one asset for the requested mode. `Auto` defers to the
/// detected install context. Zero or multiple matches are both errors: an
/// ambiguous release must never be guessed at.
pub fn pick_asset<'a>(
    release: &'a ReleaseInfo,
    mode: AssetMode,
    context: InstallContext,
) -> Result<&'a Asset, UpgradeError> {
    let effective = match mode {
        AssetMode::Auto => match context {
            InstallContext::Installer => AssetMode::Installer,
            InstallContext::Portable => AssetMode::Exe,
        },
        other => other,
    };

    let (label, predicate): (&str, fn(&str) -> bool) = match effective {
        AssetMode::Installer => ("installer", is_installer_asset),
        AssetMode::Exe => ("exe", is_portable_asset),
        AssetMode::Auto => unreachable!("auto resolved above"),
    };

    let mut candidates = release.assets.iter().filter(|a| predicate(&a.name));
    let first = candidates.next().ok_or_else(|| {
        UpgradeError::NoSuitableAsset(format!(
            "release {} has no {label} asset",
            release.tag
        ))
    })?;
    if let Some(second) = candidates.next() {
        return Err(UpgradeError::NoSuitableAsset(format!(
            "release {} has multiple {label} assets ({}, {}, ...)",
            release.tag, first.name, second.name
        )));
    }
    Ok(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(asset_names: &[&str]) -> ReleaseInfo {
        ReleaseInfo {
            tag: "v1.0.0".to_string(),
            assets: asset_names
                .iter()
                .map(|n| Asset {
                    name: n.to_string(),
                    url: format!("http://example.invalid/{n}"),
                })
                .collect(),
            notes: String::new(),
        }
    }

    fn full_release() -> ReleaseInfo {
        release(&["proxyctl.exe", "proxyctl-setup.exe", "SHA256SUMS.txt"])
    }

    #[test]
    fn installer_mode_picks_the_setup_asset() {
        let r = full_release();
        let a = pick_asset(&r, AssetMode::Installer, InstallContext::Portable).unwrap();
        assert_eq!(a.name, "proxyctl-setup.exe");
    }

    #[test]
    fn exe_mode_picks_the_plain_exe_never_installer_or_manifest() {
        let r = full_release();
        let a = pick_asset(&r, AssetMode::Exe, InstallContext::Installer).unwrap();
        assert_eq!(a.name, "proxyctl.exe");
    }

    #[test]
    fn auto_mode_follows_the_install_context() {
        let r = full_release();
        let a = pick_asset(&r, AssetMode::Auto, InstallContext::Installer).unwrap();
        assert_eq!(a.name, "proxyctl-setup.exe");
        let a = pick_asset(&r, AssetMode::Auto, InstallContext::Portable).unwrap();
        assert_eq!(a.name, "proxyctl.exe");
    }

    #[test]
    fn missing_candidate_is_an_error() {
        let r = release(&["SHA256SUMS.txt"]);
        let err = pick_asset(&r, AssetMode::Exe, InstallContext::Portable).unwrap_err();
        assert!(matches!(err, UpgradeError::NoSuitableAsset(_)));
    }

    #[test]
    fn ambiguous_candidates_are_an_error() {
        let r = release(&["proxyctl.exe", "proxyctl-x86.exe"]);
        let err = pick_asset(&r, AssetMode::Exe, InstallContext::Portable).unwrap_err();
        match err {
            UpgradeError::NoSuitableAsset(msg) => assert!(msg.contains("multiple"), "{msg}"),
            other => panic!("expected NoSuitableAsset, got {other:?}"),
        }
    }
}
