pub mod client;
pub mod method;
pub mod request;
pub mod response;

pub use client::{ReqwestTransport, Transport};
pub use method::Method;
pub use request::{Endpoint, Payload, PreparedRequest, Target, UrlParts};
pub use response::{HttpResponse, TransportResponse};
