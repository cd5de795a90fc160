use crate::http::{header, HeaderValue, ResponseWriter, StatusCode, APPLICATION_JSON};
use crate::{Context, Error};

use serde::Serialize;
use serde_json::json;

/// Turns a request-time [`Error`] into an HTTP error response.
///
/// A translator is given to a [`Handler`](crate::Handler) when it is created,
/// and is called whenever decoding the request payload fails or the wrapped
/// function returns an error. This trait is implemented for functions with
/// the signature:
///
/// ```text
/// fn(&Context, &ResponseWriter, Error)
/// ```
///
/// [`json_error`] is the default policy.
pub trait ErrorTranslator: Send + Sync + 'static {
    /// Write an error response for `err`.
    fn translate(&self, cx: &Context, w: &ResponseWriter, err: Error);
}

impl<F> ErrorTranslator for F
where
    F: Fn(&Context, &ResponseWriter, Error) + Send + Sync + 'static,
{
    fn translate(&self, cx: &Context, w: &ResponseWriter, err: Error) {
        self(cx, w, err)
    }
}

/// The default error translator.
///
/// If the error is, or wraps, a [`WireError`](crate::WireError), its code is
/// used as the response status and the body is `{"message": <message>}`.
/// Any other error is reported as `500 Internal Server Error` with the body
/// `{"error": <error>}`.
pub fn json_error(_: &Context, w: &ResponseWriter, err: Error) {
    match err.as_wire() {
        Some(wire) => write_json(w, wire.code, wire),
        None => write_json(
            w,
            StatusCode::INTERNAL_SERVER_ERROR,
            &json!({ "error": err.to_string() }),
        ),
    }
}

fn write_json<T>(w: &ResponseWriter, status: StatusCode, body: &T)
where
    T: Serialize + ?Sized,
{
    w.insert_header(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    w.write_status(status);

    match serde_json::to_vec(body) {
        Ok(mut body) => {
            body.push(b'\n');
            w.write(&body);
        }
        Err(err) => tracing::error!(error = %err, "failed to encode error response"),
    }
}
