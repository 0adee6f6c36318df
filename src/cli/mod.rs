//! # CLI Support
//!
//! Command-line surface of the `falkor` runner, for CI pipelines:
//! `falkor --serial --test-pattern login tests/auth.json tests/search.json`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use falkor::config::{Config, DEFAULT_TIMEOUT_SECS, RunMode};
use falkor::http::response::DEFAULT_MAX_BODY_BYTES;

/// Runs falkor HTTP test files and exits non-zero on any failure.
#[derive(Debug, Parser)]
#[command(name = "falkor", author, version, about, long_about = None)]
pub struct Cli {
    /// The base URL for sending requests
    #[arg(long, alias = "baseUrl")]
    pub base_url: Option<String>,

    /// Run the tests in serial instead of in parallel
    #[arg(long)]
    pub serial: bool,

    /// The timeout, in seconds
    #[arg(long, alias = "timeoutSecs", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// A case-insensitive regular expression; a test runs only if its file or name matches
    #[arg(long, alias = "testPattern", default_value = "")]
    pub test_pattern: String,

    /// File containing a custom CA for https requests
    #[arg(long, alias = "certAuthority")]
    pub cert_authority: Option<PathBuf>,

    /// Largest response body buffered per request, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Test files to run
    #[arg(required = true)]
    pub files: Vec<String>,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            base_url: self.base_url.clone().filter(|url| !url.is_empty()),
            run_mode: if self.serial {
                RunMode::Serial
            } else {
                RunMode::Parallel
            },
            timeout: Duration::from_secs(self.timeout_secs),
            test_pattern: self.test_pattern.clone(),
            cert_authority: self.cert_authority.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// Logs go to stderr; stdout carries the test report.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
