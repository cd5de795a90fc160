//! Adapting typed functions into HTTP handlers.

mod dynamic;
mod function;

pub use dynamic::DynFunction;
pub use function::Function;

use crate::http::{
    header, Body, BodyError, HeaderValue, Request, Response, ResponseWriter, StatusCode,
    APPLICATION_JSON,
};
use crate::shape::{self, Arity, Descriptor};
use crate::{BoxFuture, Config, Context, Error, ErrorTranslator, ShapeError, WireError};

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::Instrument;

/// Wrap a typed function into a [`Handler`].
///
/// `f` is an async function taking the request [`Context`] and, optionally,
/// a payload deserialized from the request body. Its `Ok` value is serialized
/// as the JSON response body and its `Err` value is passed to `on_error`.
///
/// Request bodies larger than 2mb are rejected with `413 Payload Too Large`;
/// use [`Handler::with_config`] to raise the limit.
///
/// ```
/// use jsonfn::{handler, json_error, Context, Error};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize)]
/// struct Add {
///     x: i64,
///     y: i64,
/// }
///
/// #[derive(Serialize)]
/// struct Sum {
///     sum: i64,
/// }
///
/// async fn add(_: Context, req: Add) -> Result<Sum, Error> {
///     Ok(Sum { sum: req.x + req.y })
/// }
///
/// let handler = handler(add, json_error).unwrap();
/// ```
pub fn handler<F, Args>(f: F, on_error: impl ErrorTranslator) -> Result<Handler, ShapeError>
where
    F: Function<Args>,
{
    let descriptor = shape::validate(&F::signature())?;
    Ok(Handler::new(descriptor, f.into_invoker(), on_error))
}

/// An HTTP handler wrapping a function.
///
/// A handler is created by [`handler`] or [`Handler::dynamic`], and serves
/// requests with [`Handler::serve`]. It holds no per-request state and can
/// be shared freely between tasks.
#[derive(Clone)]
pub struct Handler {
    shared: Arc<Shared>,
    config: Config,
}

struct Shared {
    descriptor: Descriptor,
    invoker: Invoker,
    on_error: Box<dyn ErrorTranslator>,
}

impl Handler {
    fn new(descriptor: Descriptor, invoker: Invoker, on_error: impl ErrorTranslator) -> Handler {
        debug_assert_eq!(
            matches!(descriptor.arity(), Arity::Payload(_)),
            matches!(invoker.kind, InvokerKind::Payload(_)),
            "invoker does not match {:?}",
            descriptor
        );

        Handler {
            shared: Arc::new(Shared {
                descriptor,
                invoker,
                on_error: Box::new(on_error),
            }),
            config: Config::default(),
        }
    }

    /// Wrap a function whose shape is declared at runtime.
    ///
    /// The declared signature is validated here, once.
    pub fn dynamic<D>(f: D, on_error: impl ErrorTranslator) -> Result<Handler, ShapeError>
    where
        D: DynFunction,
    {
        let descriptor = shape::validate(&f.signature())?;
        let invoker = dynamic::invoker(f, &descriptor);
        Ok(Handler::new(descriptor, invoker, on_error))
    }

    /// Use the given configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// The validated shape of the wrapped function.
    pub fn descriptor(&self) -> &Descriptor {
        &self.shared.descriptor
    }

    /// Serve a request.
    ///
    /// The request body is decoded if the wrapped function takes a payload,
    /// the function is called, and its result is written as JSON. Any failure
    /// along the way is handed to the error translator instead.
    ///
    /// Bodies over the configured limit (2mb unless changed with
    /// [`with_config`](Self::with_config)) are reported as a
    /// `413 Payload Too Large` [`WireError`] without calling the function.
    pub async fn serve(&self, request: Request) -> Response {
        let span = tracing::debug_span!(
            "serve",
            method = %request.method(),
            uri = %request.uri(),
        );

        let (parts, body) = request.into_parts();
        let writer = ResponseWriter::new();
        let cx = Context::new(parts, writer.clone());

        self.dispatch(&cx, body).instrument(span).await;
        writer.finish()
    }

    async fn dispatch(&self, cx: &Context, body: Body) {
        let returns: Vec<Return> = match &self.shared.invoker.kind {
            InvokerKind::Context(call) => call(cx.clone()).await,
            InvokerKind::Payload(call) => {
                let body = match body.collect(self.config.limit).await {
                    Ok(body) => body,
                    Err(err) => {
                        tracing::debug!(error = %err, "failed to read request body");
                        let code = match err {
                            BodyError::Overflow { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                            BodyError::Io(_) => StatusCode::BAD_REQUEST,
                        };
                        return self.fail(cx, WireError::new(code, err.to_string()).into());
                    }
                };

                match call(cx.clone(), &body) {
                    Ok(fut) => fut.await,
                    Err(err) => {
                        tracing::debug!(error = %err, "failed to decode request payload");
                        return self.fail(cx, WireError::bad_request(err.to_string()).into());
                    }
                }
            }
        };

        // validation guarantees two values
        let [payload, error]: [Return; 2] = match returns.try_into() {
            Ok(returns) => returns,
            Err(returns) => {
                tracing::error!(
                    count = returns.len(),
                    "handler returned the wrong number of values"
                );
                return self.fail(cx, Error::msg("handler needs 2 return values"));
            }
        };

        match (payload, error) {
            (_, Return::Error(err)) => {
                tracing::debug!(error = %err, "handler returned an error");
                self.fail(cx, err)
            }
            (Return::Payload(payload), Return::Nil) => {
                respond(cx.response_writer(), Some(payload))
            }
            (Return::Nil, Return::Nil) => respond(cx.response_writer(), None),
            (payload, error) => {
                tracing::error!(?payload, ?error, "handler returned values of the wrong kind");
                self.fail(cx, Error::msg("handler returned values of the wrong kind"))
            }
        }
    }

    fn fail(&self, cx: &Context, err: Error) {
        self.shared
            .on_error
            .translate(cx, cx.response_writer(), err)
    }
}

fn respond(w: &ResponseWriter, payload: Option<Payload>) {
    w.insert_header(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
    w.write_status(StatusCode::OK);

    let encoded = match payload {
        Some(payload) => payload.encode(),
        None => Ok(b"null".to_vec()),
    };

    match encoded {
        Ok(mut body) => {
            body.push(b'\n');
            w.write(&body);
        }
        Err(err) => tracing::error!(error = %err, "failed to encode response payload"),
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("descriptor", &self.shared.descriptor)
            .field("config", &self.config)
            .finish()
    }
}

/// A function erased into one of the two callable shapes.
///
/// Created through [`Function::into_invoker`].
pub struct Invoker {
    kind: InvokerKind,
}

pub(crate) type Invoked = BoxFuture<'static, Vec<Return>>;

enum InvokerKind {
    Context(Box<dyn Fn(Context) -> Invoked + Send + Sync>),
    Payload(Box<dyn Fn(Context, &[u8]) -> Result<Invoked, serde_json::Error> + Send + Sync>),
}

impl Invoker {
    pub(crate) fn context<F>(f: F) -> Self
    where
        F: Fn(Context) -> Invoked + Send + Sync + 'static,
    {
        Self {
            kind: InvokerKind::Context(Box::new(f)),
        }
    }

    pub(crate) fn payload<F>(f: F) -> Self
    where
        F: Fn(Context, &[u8]) -> Result<Invoked, serde_json::Error> + Send + Sync + 'static,
    {
        Self {
            kind: InvokerKind::Payload(Box::new(f)),
        }
    }
}

/// A value returned by a wrapped function.
///
/// Typed functions return `[Payload, Nil]` on success and `[Nil, Error]` on
/// failure. [`DynFunction`]s build the list themselves.
#[derive(Debug)]
pub enum Return {
    Payload(Payload),
    Error(Error),
    Nil,
}

impl Return {
    /// A payload return value.
    pub fn payload<T>(value: T) -> Self
    where
        T: Serialize + Send + 'static,
    {
        Return::Payload(Payload::new(value))
    }

    /// An error return value.
    pub fn error(err: impl Into<Error>) -> Self {
        Return::Error(err.into())
    }
}

/// A type-erased value that can be encoded as JSON.
pub struct Payload(Box<dyn Encode>);

trait Encode: Send {
    fn encode(&self) -> serde_json::Result<Vec<u8>>;
}

impl<T> Encode for T
where
    T: Serialize + Send,
{
    fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

impl Payload {
    pub fn new<T>(value: T) -> Self
    where
        T: Serialize + Send + 'static,
    {
        Payload(Box::new(value))
    }

    /// Encode the payload as JSON.
    pub fn encode(&self) -> serde_json::Result<Vec<u8>> {
        self.0.encode()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Payload").finish()
    }
}
