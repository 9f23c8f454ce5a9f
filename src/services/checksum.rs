//! Download integrity: digest manifest parsing and file verification.
//!
//! Every release ships a detached `SHA256SUMS` manifest mapping asset file
//! names to hex digests. Nothing downloaded may execute before its digest is
//! confirmed against that manifest.

use crate::domain::constants::DIGEST_MANIFEST_NAME;
use crate::domain::errors::UpgradeError;
use crate::feed::{FeedClient, ReleaseInfo};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Fetches the release's digest manifest and parses it into a map from asset
/// file name to lowercase hex digest. A release without a manifest cannot be
/// installed at all.
pub fn fetch_digests(
    client: &FeedClient,
    release: &ReleaseInfo,
) -> Result<HashMap<String, String>, UpgradeError> {
    let manifest = release
        .assets
        .iter()
        .find(|a| a.name.to_ascii_uppercase().contains(DIGEST_MANIFEST_NAME))
        .ok_or_else(|| {
            UpgradeError::NoDigestFound(format!(
                "release {} ships no {DIGEST_MANIFEST_NAME} manifest",
                release.tag
            ))
        })?;
    let text = client.fetch_text(&manifest.url, "digest fetch")?;
    Ok(parse_digest_manifest(&text))
}

/// Parses the two-column `<hex digest> <filename>` format. A leading `*` on
/// the filename (binary mode marker) is tolerated, as are blank lines and
/// `#` comments. Malformed lines are skipped rather than fatal; a missing
/// entry surfaces later as `NoDigestFound` for the specific asset.
pub fn parse_digest_manifest(text: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(digest), Some(name)) = (parts.next(), parts.next()) else {
            continue;
        };
        if digest.len() != 64 || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            continue;
        }
        let name = name.strip_prefix('*').unwrap_or(name);
        out.insert(name.to_string(), digest.to_ascii_lowercase());
    }
    out
}

/// Streams the file through SHA-256 and compares against the expected hex
/// digest, case-insensitively. A mismatch is a normal outcome for the caller
/// to check, not an error; only I/O trouble is.
pub fn verify_sha256(path: &Path, expected_hex: &str) -> Result<bool, UpgradeError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| UpgradeError::io(format!("open {} for verification", path.display()), e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| UpgradeError::io(format!("read {}", path.display()), e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    let actual = hex::encode(hasher.finalize());
    Ok(actual.eq_ignore_ascii_case(expected_hex))
}
