use std::fmt::{self, Display};

use crate::error::TransportError;

/// An HTTP method token, always stored uppercase.
///
/// Any token is accepted; legality is left to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Method(String);

impl Method {
    pub const GET: &'static str = "GET";

    pub fn new(method: &str) -> Self {
        Method(method.to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Method {
    fn default() -> Self {
        Method(Self::GET.to_string())
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Method {
    fn from(method: &str) -> Self {
        Method::new(method)
    }
}

impl TryFrom<&Method> for reqwest::Method {
    type Error = TransportError;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        reqwest::Method::from_bytes(method.as_str().as_bytes())
            .map_err(|_| TransportError::InvalidMethod(method.to_string()))
    }
}
