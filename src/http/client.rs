use std::fs;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Certificate, Client, redirect};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, TransportError};

use super::request::{Payload, PreparedRequest};
use super::response::TransportResponse;

/// The network capability a test case needs: send one request, get back a
/// status line, headers and a body stream, or an error.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &PreparedRequest) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] over reqwest. Redirects are returned as-is and nothing is retried.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::build(None)
    }

    /// Trusts the PEM-encoded certificate authority in addition to the built-in roots.
    pub fn with_cert_authority(pem: &[u8]) -> Result<Self, TransportError> {
        let certificate = Certificate::from_pem(pem)
            .map_err(|err| TransportError::Other(format!("Invalid certificate authority: {err}")))?;
        Self::build(Some(certificate))
    }

    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let Some(path) = config.cert_authority.as_ref() else {
            return Ok(Self::new()?);
        };
        let pem = fs::read(path).map_err(|source| Error::CertAuthority {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "loaded custom certificate authority");
        Ok(Self::with_cert_authority(&pem)?)
    }

    fn build(certificate: Option<Certificate>) -> Result<Self, TransportError> {
        let mut builder = Client::builder().redirect(redirect::Policy::none());
        if let Some(certificate) = certificate {
            builder = builder.add_root_certificate(certificate);
        }
        let client = builder
            .build()
            .map_err(|err| TransportError::Other(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<TransportResponse, TransportError> {
        let method = reqwest::Method::try_from(&request.method)?;
        let url = request.endpoint.url();
        let headers = build_headers(&request.headers)?;

        let mut builder = self.client.request(method, &url).headers(headers);
        if let Some(body) = request_body(request.payload.as_ref()) {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        debug!(%url, status = response.status().as_u16(), "response headers received");

        let status = response.status();
        let headers = response.headers().clone();
        let body = Box::pin(response.bytes_stream().map_err(TransportError::from));

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// The bytes to write, if any. An empty payload sends no body at all.
fn request_body(payload: Option<&Payload>) -> Option<Bytes> {
    payload
        .filter(|payload| !payload.is_empty())
        .map(Payload::to_bytes)
}

pub fn build_headers(input: &[(String, String)]) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();

    for (key, value) in input {
        if key.is_empty() {
            continue;
        }

        let header_name =
            HeaderName::from_bytes(key.as_bytes()).map_err(|err| TransportError::InvalidHeader {
                name: key.clone(),
                reason: err.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| TransportError::InvalidHeader {
            name: key.clone(),
            reason: err.to_string(),
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}
