use crate::handler::{Invoked, Invoker, Return};
use crate::shape::{Arity, Descriptor, Signature};
use crate::Context;

use std::sync::Arc;

use serde_json::Value;

/// A function whose calling shape is only known at runtime.
///
/// This is useful when handlers are defined by something other than Rust
/// code, for example a plugin or scripting layer. The declared
/// [`Signature`] is checked once when the handler is created, and any
/// payload is passed in as a raw JSON [`Value`].
///
/// ```
/// use jsonfn::shape::{Param, PayloadType, Ret, Signature};
/// use jsonfn::{async_trait, Context, DynFunction, Return};
///
/// struct Echo;
///
/// #[async_trait]
/// impl DynFunction for Echo {
///     fn signature(&self) -> Signature {
///         let any = PayloadType::named("any");
///         Signature::new([Param::Context, Param::Payload(any)], [Ret::Payload(any), Ret::Error])
///     }
///
///     async fn call(&self, _: Context, payload: Option<serde_json::Value>) -> Vec<Return> {
///         vec![Return::payload(payload), Return::Nil]
///     }
/// }
/// ```
#[crate::async_trait]
pub trait DynFunction: Send + Sync + 'static {
    /// The declared calling shape.
    fn signature(&self) -> Signature;

    /// Call the function.
    ///
    /// `payload` is `Some` exactly when the signature declares a payload
    /// argument.
    async fn call(&self, cx: Context, payload: Option<Value>) -> Vec<Return>;
}

pub(crate) fn invoker<D>(f: D, descriptor: &Descriptor) -> Invoker
where
    D: DynFunction,
{
    let f = Arc::new(f);

    match descriptor.arity() {
        Arity::Context => Invoker::context(move |cx| {
            let f = f.clone();
            let invoked: Invoked = Box::pin(async move { f.call(cx, None).await });
            invoked
        }),
        Arity::Payload(_) => Invoker::payload(move |cx, body| {
            let payload = super::function::decode::<Value>(body)?;
            let f = f.clone();
            let invoked: Invoked = Box::pin(async move { f.call(cx, Some(payload)).await });
            Ok(invoked)
        }),
    }
}
