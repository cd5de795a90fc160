use crate::http::{HeaderMap, Method, ResponseWriter, Uri};

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use http::request::Parts;

/// Context about the request being handled.
///
/// Every function wrapped by a [`Handler`](crate::Handler) receives a
/// `Context` as its first argument. It gives access to the inbound request
/// head and the outbound [`ResponseWriter`], so a function can read URL
/// parameters or set response headers:
///
/// ```
/// use jsonfn::http::{header, HeaderValue};
/// use jsonfn::{Context, Error};
///
/// async fn ping(cx: Context) -> Result<&'static str, Error> {
///     cx.response_writer()
///         .insert_header(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
///     Ok("pong")
/// }
/// ```
///
/// A `Context` is created fresh for every request and is cheap to clone.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
    values: Option<Arc<Value>>,
}

struct Inner {
    request: Parts,
    writer: ResponseWriter,
}

struct Value {
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Value>>,
}

impl Context {
    pub(crate) fn new(request: Parts, writer: ResponseWriter) -> Self {
        Self {
            inner: Arc::new(Inner { request, writer }),
            values: None,
        }
    }

    /// The head of the inbound request.
    pub fn request(&self) -> &Parts {
        &self.inner.request
    }

    /// The writer for the outbound response.
    pub fn response_writer(&self) -> &ResponseWriter {
        &self.inner.writer
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.inner.request.method
    }

    /// The request URI.
    pub fn uri(&self) -> &Uri {
        &self.inner.request.uri
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.request.headers
    }

    /// Get a value attached with [`with`](Self::with), or by the transport
    /// through the request's extensions.
    ///
    /// The most recently attached value of a type shadows older ones.
    pub fn extension<T>(&self) -> Option<&T>
    where
        T: Send + Sync + 'static,
    {
        let mut next = self.values.as_deref();
        while let Some(node) = next {
            if let Some(value) = node.value.downcast_ref::<T>() {
                return Some(value);
            }
            next = node.parent.as_deref();
        }

        self.inner.request.extensions.get::<T>()
    }

    /// Derive a new context carrying an extra value.
    ///
    /// The original context, and any clones of it, are unaffected.
    pub fn with<T>(&self, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self {
            inner: self.inner.clone(),
            values: Some(Arc::new(Value {
                value: Box::new(value),
                parent: self.values.clone(),
            })),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", self.method())
            .field("uri", self.uri())
            .field("writer", self.response_writer())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Context {
        let (parts, ()) = http::Request::post("/add").body(()).unwrap().into_parts();
        Context::new(parts, ResponseWriter::new())
    }

    #[test]
    fn accessors() {
        let cx = context();
        assert_eq!(cx.method(), Method::POST);
        assert_eq!(cx.uri().path(), "/add");
        assert!(cx.extension::<u8>().is_none());
    }

    #[test]
    fn with_derives_by_replacement() {
        let cx = context().with(7u8);
        let shared = cx.clone();
        let derived = cx.with("user").with(8u8);

        assert_eq!(derived.extension::<&str>(), Some(&"user"));
        assert_eq!(derived.extension::<u8>(), Some(&8));
        assert_eq!(shared.extension::<&str>(), None);
        assert_eq!(shared.extension::<u8>(), Some(&7));

        derived.response_writer().write(b"x");
        assert!(shared.response_writer().status().is_some());
    }
}
