/// Closed set of ways an upgrade attempt can fail. Every pipeline stage
/// reports through one of these kinds so callers can branch on the variant
/// instead of matching message strings.
#[derive(thiserror::Error, Debug)]
pub enum UpgradeError {
    #[error("{0}")]
    PolicyViolation(String),

    #[error("network failure during {stage}")]
    Network {
        stage: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("release feed returned an unusable response: {0}")]
    ReleaseFeed(String),

    #[error("no suitable asset in release: {0}")]
    NoSuitableAsset(String),

    #[error("no checksum entry found for {0}")]
    NoDigestFound(String),

    #[error("checksum mismatch for {asset}; file may be corrupted or tampered with")]
    ChecksumMismatch { asset: String },

    #[error("elevation required: {0}")]
    ElevationRequired(String),

    #[error("installer exited with status {code}")]
    InstallerFailed { code: i32 },

    #[error("cannot determine how to replace the running executable: {0}")]
    UnsupportedRuntimeContext(String),

    #[error("another upgrade appears to be in progress (lock held on {0})")]
    UpgradeInProgress(String),

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl UpgradeError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        UpgradeError::Io {
            context: context.into(),
            source,
        }
    }
}
