use std::borrow::Cow;
use std::fmt::{self, Display};

use bytes::Bytes;
use reqwest::Url;

use crate::error::TransportError;

use super::method::Method;

/// Pre-parsed URL components. Missing port and path fall back to scheme defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParts {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub path: Option<String>,
}

/// What a test case points at: a URL string (absolute, or relative to the
/// harness base URL) or already-split components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Url(String),
    Parts(UrlParts),
}

impl From<&str> for Target {
    fn from(url: &str) -> Self {
        Target::Url(url.to_string())
    }
}

impl From<String> for Target {
    fn from(url: String) -> Self {
        Target::Url(url)
    }
}

impl From<UrlParts> for Target {
    fn from(parts: UrlParts) -> Self {
        Target::Parts(parts)
    }
}

impl From<Url> for Target {
    fn from(url: Url) -> Self {
        Target::Url(url.into())
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Url(url) => write!(f, "{url}"),
            Target::Parts(parts) => {
                write!(f, "{}://{}", parts.scheme, parts.host)?;
                if let Some(port) = parts.port {
                    write!(f, ":{port}")?;
                }
                write!(f, "{}", parts.path.as_deref().unwrap_or("/"))
            }
        }
    }
}

impl Target {
    /// Resolves the target into concrete connection parameters.
    ///
    /// Relative URLs are joined onto `base`; without a base they are rejected.
    pub fn resolve(&self, base: Option<&Url>) -> Result<Endpoint, TransportError> {
        match self {
            Target::Url(raw) => {
                let url = match Url::parse(raw) {
                    Ok(url) => url,
                    Err(url::ParseError::RelativeUrlWithoutBase) => match base {
                        Some(base) => base
                            .join(raw)
                            .map_err(|err| TransportError::InvalidUrl(format!("{raw}: {err}")))?,
                        None => {
                            return Err(TransportError::InvalidUrl(format!(
                                "{raw}: relative URL without a base URL"
                            )));
                        }
                    },
                    Err(err) => return Err(TransportError::InvalidUrl(format!("{raw}: {err}"))),
                };
                Endpoint::from_url(&url)
            }
            Target::Parts(parts) => {
                let scheme = parts.scheme.trim_end_matches(':').to_lowercase();
                if parts.host.is_empty() {
                    return Err(TransportError::InvalidUrl(format!("{self}: missing host")));
                }
                let path = match parts.path.as_deref() {
                    None | Some("") => "/".to_string(),
                    Some(path) => path.to_string(),
                };
                Ok(Endpoint {
                    port: parts.port.unwrap_or_else(|| Endpoint::default_port(&scheme)),
                    scheme,
                    host: parts.host.clone(),
                    path,
                })
            }
        }
    }
}

/// Concrete connection parameters for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Path including the query string.
    pub path: String,
}

impl Endpoint {
    pub fn default_port(scheme: &str) -> u16 {
        if scheme.eq_ignore_ascii_case("https") { 443 } else { 80 }
    }

    fn from_url(url: &Url) -> Result<Self, TransportError> {
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| TransportError::InvalidUrl(format!("{url}: missing host")))?;
        let scheme = url.scheme().to_string();
        let mut path = match url.path() {
            "" => "/".to_string(),
            path => path.to_string(),
        };
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }
        Ok(Endpoint {
            port: url.port().unwrap_or_else(|| Endpoint::default_port(&scheme)),
            scheme,
            host: host.to_string(),
            path,
        })
    }

    pub fn url(&self) -> String {
        format!("{}://{}:{}{}", self.scheme, self.host, self.port, self.path)
    }
}

/// A request body, written to the wire in one piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Bytes),
}

impl Payload {
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Payload::Text(text) => Bytes::from(text.clone()),
            Payload::Binary(bytes) => bytes.clone(),
        }
    }

    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Payload::Text(text) => Cow::Borrowed(text),
            Payload::Binary(bytes) => String::from_utf8_lossy(bytes),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Text(text) => text.is_empty(),
            Payload::Binary(bytes) => bytes.is_empty(),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Binary(Bytes::from(bytes))
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Binary(bytes)
    }
}

/// Everything the transport needs to issue one request.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub endpoint: Endpoint,
    pub headers: Vec<(String, String)>,
    pub payload: Option<Payload>,
}
