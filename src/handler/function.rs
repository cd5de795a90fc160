use crate::handler::{Invoked, Invoker, Payload, Return};
use crate::shape::{Param, PayloadType, Ret, Signature};
use crate::{Context, Error};

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A typed function that can be wrapped by a [`Handler`](crate::Handler).
///
/// This trait is implemented for async functions with one of the shapes:
///
/// ```text
/// async fn(Context) -> Result<R, E>
/// async fn(Context, T) -> Result<R, E>
/// ```
///
/// where `T` is deserialized from the request body, `R` is serialized into the
/// response body, and `E` converts into an [`Error`]. You should not need to
/// implement it yourself.
pub trait Function<Args>: Send + Sync + 'static {
    /// The calling shape of this function.
    fn signature() -> Signature;

    /// Erase the function into something a handler can call.
    fn into_invoker(self) -> Invoker;
}

impl<F, Fut, R, E> Function<(Context,)> for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: Serialize + Send + 'static,
    E: Into<Error> + 'static,
{
    fn signature() -> Signature {
        Signature::new(
            [Param::Context],
            [Ret::Payload(PayloadType::of::<R>()), Ret::Error],
        )
    }

    fn into_invoker(self) -> Invoker {
        Invoker::context(move |cx| {
            let fut = self(cx);
            let invoked: Invoked = Box::pin(async move { returns(fut.await) });
            invoked
        })
    }
}

impl<F, Fut, T, R, E> Function<(Context, T)> for F
where
    F: Fn(Context, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    T: DeserializeOwned + 'static,
    R: Serialize + Send + 'static,
    E: Into<Error> + 'static,
{
    fn signature() -> Signature {
        Signature::new(
            [Param::Context, Param::Payload(PayloadType::of::<T>())],
            [Ret::Payload(PayloadType::of::<R>()), Ret::Error],
        )
    }

    fn into_invoker(self) -> Invoker {
        Invoker::payload(move |cx, body| {
            let payload = decode::<T>(body)?;
            let fut = self(cx, payload);
            let invoked: Invoked = Box::pin(async move { returns(fut.await) });
            Ok(invoked)
        })
    }
}

/// Decode the first JSON value in `body`.
///
/// Anything after that value is left unread.
pub(crate) fn decode<T>(body: &[u8]) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned,
{
    let mut de = serde_json::Deserializer::from_slice(body);
    T::deserialize(&mut de)
}

fn returns<R, E>(result: Result<R, E>) -> Vec<Return>
where
    R: Serialize + Send + 'static,
    E: Into<Error>,
{
    match result {
        Ok(value) => vec![Return::Payload(Payload::new(value)), Return::Nil],
        Err(err) => vec![Return::Nil, Return::Error(err.into())],
    }
}
