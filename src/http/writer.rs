use crate::http::{Body, Response};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::{BufMut, BytesMut};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;

/// The outgoing half of a request.
///
/// A `ResponseWriter` behaves like a streaming transport response: headers can
/// be changed until a status is written, the first status written wins, and
/// writing body bytes implicitly writes `200 OK`. Clones share the same
/// response.
#[derive(Clone, Default)]
pub struct ResponseWriter {
    inner: Arc<Mutex<Pending>>,
}

#[derive(Default)]
struct Pending {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseWriter {
    /// Create a writer for a fresh response.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set a response header, replacing any existing values.
    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        let mut pending = self.lock();
        if let Some(status) = pending.status {
            tracing::warn!(%name, %status, "header set after the status was written");
            return;
        }

        pending.headers.insert(name, value);
    }

    /// Append a response header, keeping any existing values.
    pub fn append_header(&self, name: HeaderName, value: HeaderValue) {
        let mut pending = self.lock();
        if let Some(status) = pending.status {
            tracing::warn!(%name, %status, "header set after the status was written");
            return;
        }

        pending.headers.append(name, value);
    }

    /// A snapshot of the headers written so far.
    pub fn headers(&self) -> HeaderMap {
        self.lock().headers.clone()
    }

    /// Write the response status.
    ///
    /// Only the first status written is used.
    pub fn write_status(&self, status: StatusCode) {
        let mut pending = self.lock();
        match pending.status {
            Some(written) => {
                tracing::warn!(%written, ignored = %status, "superfluous status write");
            }
            None => pending.status = Some(status),
        }
    }

    /// The status written so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.lock().status
    }

    /// Append bytes to the response body.
    pub fn write(&self, bytes: &[u8]) {
        let mut pending = self.lock();
        pending.status.get_or_insert(StatusCode::OK);
        pending.body.put_slice(bytes);
    }

    /// Take the finished response out of the writer.
    pub(crate) fn finish(&self) -> Response {
        let mut pending = self.lock();
        let status = pending.status.unwrap_or(StatusCode::OK);
        let headers = std::mem::take(&mut pending.headers);
        let body = pending.body.split().freeze();

        let mut response = Response::new(if body.is_empty() {
            Body::empty()
        } else {
            Body::once(body)
        });

        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}

impl fmt::Debug for ResponseWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pending = self.lock();
        f.debug_struct("ResponseWriter")
            .field("status", &pending.status)
            .field("headers", &pending.headers)
            .field("written", &pending.body.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header;

    #[test]
    fn first_status_wins() {
        let w = ResponseWriter::new();
        w.write_status(StatusCode::IM_A_TEAPOT);
        w.write_status(StatusCode::OK);
        assert_eq!(w.status(), Some(StatusCode::IM_A_TEAPOT));
        assert_eq!(w.finish().status(), StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn write_implies_ok() {
        let w = ResponseWriter::new();
        w.write(b"hello");
        w.write_status(StatusCode::NOT_FOUND);
        assert_eq!(w.status(), Some(StatusCode::OK));
    }

    #[test]
    fn headers_frozen_after_status() {
        let w = ResponseWriter::new();
        w.insert_header(header::SERVER, HeaderValue::from_static("a"));
        w.append_header(header::VARY, HeaderValue::from_static("b"));
        w.append_header(header::VARY, HeaderValue::from_static("c"));
        w.write_status(StatusCode::OK);
        w.insert_header(header::SERVER, HeaderValue::from_static("ignored"));

        let headers = w.headers();
        assert_eq!(headers[header::SERVER], "a");
        assert_eq!(headers.get_all(header::VARY).iter().count(), 2);
    }

    #[test]
    fn clones_share_response() {
        let w = ResponseWriter::new();
        w.clone().write(b"{}");
        let response = w.finish();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.body().is_empty());
    }
}
