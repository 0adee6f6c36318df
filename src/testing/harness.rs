use std::sync::Arc;

use reqwest::Url;

use crate::config::Config;
use crate::error::Result;
use crate::http::{ReqwestTransport, Target, Transport};

use super::case::TestCase;

/// Factory for [`TestCase`]s sharing one transport, base URL and body cap.
#[derive(Clone)]
pub struct Harness {
    base_url: Option<Url>,
    transport: Arc<dyn Transport>,
    max_body_bytes: usize,
}

impl Harness {
    /// Builds a harness over reqwest, trusting the configured certificate authority.
    pub fn new(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::from_config(config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            base_url: config.parsed_base_url()?,
            transport,
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Starts a test case for `target`. Relative URLs resolve against the base URL.
    pub fn fetch(&self, target: impl Into<Target>) -> TestCase {
        TestCase::new(
            target.into(),
            self.base_url.clone(),
            Arc::clone(&self.transport),
            self.max_body_bytes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn fetch_keeps_the_target() {
        let harness = Harness::new(&Config::default()).unwrap();
        let case = harness.fetch("http://localhost:9/ping");
        assert_eq!(case.target(), &Target::from("http://localhost:9/ping"));
        assert_eq!(case.method().as_str(), "GET");
    }

    #[test]
    fn base_url_comes_from_config() {
        let config = Config {
            base_url: Some("localhost:4000".into()),
            ..Config::default()
        };
        let harness = Harness::new(&config).unwrap();
        assert_eq!(harness.base_url().unwrap().as_str(), "http://localhost:4000/");
    }

    #[test]
    fn invalid_base_url_fails_construction() {
        let config = Config {
            base_url: Some("http://".into()),
            ..Config::default()
        };
        assert!(matches!(Harness::new(&config), Err(Error::InvalidBaseUrl { .. })));
    }
}
