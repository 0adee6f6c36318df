//! Run configuration, built once by the entry point and passed explicitly to
//! the [`crate::Harness`] and the [`crate::runner::Runner`].

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

use crate::error::{Error, Result};
use crate::http::response::DEFAULT_MAX_BODY_BYTES;

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Execution mode for the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    Serial,
    #[default]
    Parallel,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base for relative test URLs.
    pub base_url: Option<String>,
    pub run_mode: RunMode,
    /// Wall-clock budget for the whole run.
    pub timeout: Duration,
    /// Case-insensitive regex matched against test names and file identifiers.
    pub test_pattern: String,
    /// PEM file trusted in addition to the built-in roots.
    pub cert_authority: Option<PathBuf>,
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            run_mode: RunMode::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            test_pattern: String::new(),
            cert_authority: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Config {
    /// Parses the base URL, assuming `http://` when no scheme is given
    /// (`localhost:3000`, `yahoo.com`).
    pub fn parsed_base_url(&self) -> Result<Option<Url>> {
        let Some(raw) = self.base_url.as_deref().map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Ok(None);
        };

        let candidate = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("http://{raw}")
        };
        let url = Url::parse(&candidate).map_err(|err| Error::InvalidBaseUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;
        if url.cannot_be_a_base() || !url.has_host() {
            return Err(Error::InvalidBaseUrl {
                url: raw.to_string(),
                reason: "missing host".to_string(),
            });
        }
        Ok(Some(url))
    }
}
