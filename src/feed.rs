//! Release feed client.
//!
//! Talks to a GitHub-releases-shaped HTTP JSON API: each release carries a
//! tag, a notes body, and a list of named downloadable assets. The feed is
//! queried fresh on every invocation; nothing here is cached.

use crate::domain::errors::UpgradeError;
use crate::domain::models::{Channel, UpdateStatus};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const FEED_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseInfo {
    #[serde(rename = "tag_name")]
    pub tag: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(rename = "body", default)]
    pub notes: String,
}

/// Strips one optional leading `v`. Comparison everywhere else is exact
/// string equality on the remainder; there is no semver ordering here.
pub fn normalize_version(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

/// Pure comparison of the fetched release against the running version.
/// `release_info` is populated exactly when an update is available.
pub fn evaluate_release(current_version: &str, release: ReleaseInfo) -> UpdateStatus {
    let available = normalize_version(&release.tag) != normalize_version(current_version);
    UpdateStatus {
        update_available: available,
        latest_version: release.tag.clone(),
        release_info: if available { Some(release) } else { None },
    }
}

pub struct FeedClient {
    base: String,
    http: reqwest::blocking::Client,
}

impl FeedClient {
    pub fn new(base: &str) -> Result<Self, UpgradeError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(FEED_TIMEOUT)
            .user_agent(concat!("proxyctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UpgradeError::Network {
                stage: "client setup",
                source: e,
            })?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Checks the feed per the resolved policy: a pinned/requested target
    /// version wins over channel-latest resolution.
    pub fn check(
        &self,
        current_version: &str,
        channel: Channel,
        target_version: Option<&str>,
    ) -> Result<UpdateStatus, UpgradeError> {
        let release = match target_version {
            Some(version) => self.fetch_by_tag(version)?,
            None => self.fetch_latest(channel)?,
        };
        Ok(evaluate_release(current_version, release))
    }

    /// Newest release on the channel. The stable endpoint excludes
    /// prereleases; beta takes the head of the full release list.
    pub fn fetch_latest(&self, channel: Channel) -> Result<ReleaseInfo, UpgradeError> {
        match channel {
            Channel::Stable => {
                let body = self.get_text(&format!("{}/releases/latest", self.base), "release check")?;
                parse_release(&body)
            }
            Channel::Beta => {
                let body =
                    self.get_text(&format!("{}/releases?per_page=1", self.base), "release check")?;
                let mut releases: Vec<ReleaseInfo> = serde_json::from_str(&body)
                    .map_err(|e| UpgradeError::ReleaseFeed(format!("invalid release list: {e}")))?;
                if releases.is_empty() {
                    return Err(UpgradeError::ReleaseFeed(
                        "release list is empty for the beta channel".to_string(),
                    ));
                }
                Ok(releases.remove(0))
            }
        }
    }

    /// A specific tagged release. Tags in the feed carry the `v` prefix.
    pub fn fetch_by_tag(&self, version: &str) -> Result<ReleaseInfo, UpgradeError> {
        let tag = format!("v{}", normalize_version(version));
        let body = self.get_text(
            &format!("{}/releases/tags/{}", self.base, tag),
            "release check",
        )?;
        parse_release(&body)
    }

    /// Fetches an arbitrary text asset (the digest manifest) from the feed.
    pub fn fetch_text(&self, url: &str, stage: &'static str) -> Result<String, UpgradeError> {
        self.get_text(url, stage)
    }

    fn get_text(&self, url: &str, stage: &'static str) -> Result<String, UpgradeError> {
        let resp = self
            .http
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| UpgradeError::Network { stage, source: e })?;
        resp.text()
            .map_err(|e| UpgradeError::Network { stage, source: e })
    }
}

fn parse_release(body: &str) -> Result<ReleaseInfo, UpgradeError> {
    serde_json::from_str(body)
        .map_err(|e| UpgradeError::ReleaseFeed(format!("invalid release payload: {e}")))
}
