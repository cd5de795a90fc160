//! The transport object model handlers are served over.

mod body;
mod writer;

pub use body::{Body, BodyError};
pub use writer::ResponseWriter;

pub use bytes::Bytes;
pub use http::{header, Extensions, HeaderMap, HeaderValue, Method, StatusCode, Uri};

/// An inbound HTTP request.
pub type Request = http::Request<Body>;

/// An outbound HTTP response.
pub type Response = http::Response<Body>;

pub(crate) const APPLICATION_JSON: &str = "application/json; charset=utf-8";
