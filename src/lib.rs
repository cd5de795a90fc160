//! Write HTTP handlers as plain typed functions.
//!
//! `jsonfn` takes an async function that accepts a request [`Context`] and,
//! optionally, a typed payload, and turns it into a [`Handler`] that decodes
//! the JSON request body, calls the function, and encodes its result as the
//! JSON response:
//!
//! ```
//! use jsonfn::{handler, json_error, Context, Error};
//! use jsonfn::http::{Body, Request};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! #[allow(non_snake_case)]
//! struct AddRequest {
//!     X: i64,
//!     Y: i64,
//! }
//!
//! #[derive(Serialize)]
//! #[allow(non_snake_case)]
//! struct AddResponse {
//!     Sum: i64,
//! }
//!
//! async fn add(_: Context, req: AddRequest) -> Result<AddResponse, Error> {
//!     Ok(AddResponse { Sum: req.X + req.Y })
//! }
//!
//! # async fn run() {
//! let add = handler(add, json_error).unwrap();
//!
//! let request = Request::new(Body::from(r#"{"X": 1, "Y": 1}"#));
//! let response = add.serve(request).await;
//! assert_eq!(response.status(), 200);
//! # }
//! ```
//!
//! Errors returned by the function, and payloads that fail to decode, are
//! handed to an [`ErrorTranslator`]. [`json_error`] is the default.

mod config;
mod context;
mod error;
mod handler;
mod translate;

pub mod http;
pub mod shape;

pub use async_trait::async_trait;
pub use config::Config;
pub use context::Context;
pub use error::{Error, ShapeError, WireError};
pub use handler::{handler, DynFunction, Function, Handler, Invoker, Payload, Return};
pub use translate::{json_error, ErrorTranslator};

use std::future::Future;
use std::pin::Pin;

/// A type-erased error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub(crate) type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
