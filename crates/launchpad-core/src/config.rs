//! Launchpad configuration, loaded from TOML.
//!
//! ```toml
//! decimals = 9
//! max_symbol_len = 10
//!
//! [metadata_uri]
//! source = "fixed"
//! uri = "https://cdn.example.com/metadata.json"
//!
//! [submission]
//! mode = "confirmed"
//! timeout_ms = 30000
//! poll_interval_ms = 500
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::LaunchpadError;

/// Decimal places fixed at mint initialisation.
pub const DEFAULT_DECIMALS: u8 = 9;

/// Longest symbol accepted, in characters.
pub const DEFAULT_MAX_SYMBOL_LEN: usize = 10;

/// Largest decimals value whose scale factor fits in a u64.
const MAX_DECIMALS: u8 = 19;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchpadConfig {
    /// Where the on-chain metadata `uri` comes from. Required: there is no
    /// safe default.
    pub metadata_uri: MetadataUriSource,

    #[serde(default = "default_decimals")]
    pub decimals: u8,

    #[serde(default = "default_max_symbol_len")]
    pub max_symbol_len: usize,

    #[serde(default)]
    pub submission: SubmissionMode,
}

/// Source of the `uri` written into the on-chain metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum MetadataUriSource {
    /// Use the image URI the holder entered.
    ImageUri,
    /// Use a fixed URI, typically where the off-chain JSON is hosted.
    Fixed { uri: String },
}

/// Whether each batch must be confirmed before the next one is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SubmissionMode {
    /// The wallet returning a signature is enough.
    #[default]
    FireAndForget,
    /// Poll the ledger until the signature is confirmed or `timeout_ms`
    /// elapses.
    Confirmed { timeout_ms: u64, poll_interval_ms: u64 },
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

fn default_max_symbol_len() -> usize {
    DEFAULT_MAX_SYMBOL_LEN
}

impl LaunchpadConfig {
    pub fn new(metadata_uri: MetadataUriSource) -> Self {
        Self {
            metadata_uri,
            decimals: DEFAULT_DECIMALS,
            max_symbol_len: DEFAULT_MAX_SYMBOL_LEN,
            submission: SubmissionMode::default(),
        }
    }

    pub fn with_submission(mut self, submission: SubmissionMode) -> Self {
        self.submission = submission;
        self
    }

    /// Load and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LaunchpadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            LaunchpadError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LaunchpadError> {
        let config: LaunchpadConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LaunchpadError> {
        if self.decimals > MAX_DECIMALS {
            return Err(LaunchpadError::Config(format!(
                "decimals {} exceeds {MAX_DECIMALS}",
                self.decimals
            )));
        }
        if self.max_symbol_len == 0 {
            return Err(LaunchpadError::Config(
                "max_symbol_len must be at least 1".into(),
            ));
        }
        if let MetadataUriSource::Fixed { uri } = &self.metadata_uri {
            if uri.trim().is_empty() {
                return Err(LaunchpadError::Config("fixed metadata uri is empty".into()));
            }
        }
        if let SubmissionMode::Confirmed {
            timeout_ms,
            poll_interval_ms,
        } = self.submission
        {
            if timeout_ms == 0 || poll_interval_ms == 0 {
                return Err(LaunchpadError::Config(
                    "confirmation timeout and poll interval must be > 0".into(),
                ));
            }
            if poll_interval_ms > timeout_ms {
                return Err(LaunchpadError::Config(format!(
                    "poll interval {poll_interval_ms} ms exceeds timeout {timeout_ms} ms"
                )));
            }
        }
        Ok(())
    }

    /// The on-chain metadata uri for a token whose image is `image_uri`.
    pub fn resolve_metadata_uri(&self, image_uri: &str) -> String {
        match &self.metadata_uri {
            MetadataUriSource::ImageUri => image_uri.to_string(),
            MetadataUriSource::Fixed { uri } => uri.trim().to_string(),
        }
    }
}

impl SubmissionMode {
    /// `(timeout, poll interval)` when confirmation is required.
    pub fn confirmation(&self) -> Option<(Duration, Duration)> {
        match *self {
            SubmissionMode::FireAndForget => None,
            SubmissionMode::Confirmed {
                timeout_ms,
                poll_interval_ms,
            } => Some((
                Duration::from_millis(timeout_ms),
                Duration::from_millis(poll_interval_ms),
            )),
        }
    }
}
