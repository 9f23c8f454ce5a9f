//! Streaming download with a bounded retry for transient network failures.
//!
//! The download is the only pipeline stage that retries at all: at most
//! `MAX_RETRIES` re-attempts with linear backoff. Everything else fails the
//! invocation on first error.

use crate::domain::errors::UpgradeError;
use std::path::Path;
use std::time::Duration;

const MAX_RETRIES: u32 = 2;
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);
const BACKOFF_STEP: Duration = Duration::from_secs(2);

pub fn download_file(url: &str, dest: &Path) -> Result<(), UpgradeError> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| UpgradeError::io(format!("create {}", parent.display()), e))?;
    }

    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .user_agent(concat!("proxyctl/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| UpgradeError::Network {
            stage: "download",
            source: e,
        })?;

    let mut attempt = 0;
    loop {
        match fetch_once(&client, url, dest) {
            Ok(()) => return Ok(()),
            Err(UpgradeError::Network { .. }) if attempt < MAX_RETRIES => {
                attempt += 1;
                std::thread::sleep(BACKOFF_STEP * attempt);
            }
            Err(err) => return Err(err),
        }
    }
}

fn fetch_once(
    client: &reqwest::blocking::Client,
    url: &str,
    dest: &Path,
) -> Result<(), UpgradeError> {
    let mut resp = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| UpgradeError::Network {
            stage: "download",
            source: e,
        })?;

    let mut file = std::fs::File::create(dest)
        .map_err(|e| UpgradeError::io(format!("create {}", dest.display()), e))?;
    resp.copy_to(&mut file).map_err(|e| UpgradeError::Network {
        stage: "download",
        source: e,
    })?;
    Ok(())
}
