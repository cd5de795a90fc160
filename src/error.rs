use crate::http::StatusCode;
use crate::BoxError;

use std::error::Error as StdError;
use std::fmt;

use serde::{Serialize, Serializer};

/// A defect in the shape of a function passed to [`handler`](crate::handler).
///
/// Registration checks run in the order the variants are declared, and the
/// first failing check is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeError {
    /// The function takes more than two arguments.
    TooManyArgs,
    /// The function takes no arguments.
    TooFewArgs,
    /// The function does not return exactly two values.
    WrongReturnCount,
    /// The first argument is not a [`Context`](crate::Context).
    MissingContextArg,
    /// The second return value is not an error.
    MissingErrorReturn,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ShapeError::TooManyArgs => {
                "too many args. expected function with no more than 2 args"
            }
            ShapeError::TooFewArgs => "too few args. expected function with at least 1 arg",
            ShapeError::WrongReturnCount => "expected function to have 2 return values",
            ShapeError::MissingContextArg => "1st arg must be the request context",
            ShapeError::MissingErrorReturn => "function's 2nd return value must be an error",
        };

        write!(f, "jsonfn: handler: {}", msg)
    }
}

impl StdError for ShapeError {}

/// An error carrying the HTTP status it should be reported with.
///
/// Only the message is part of the serialized form:
/// ```json
/// {"message": "..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireError {
    pub code: StatusCode,
    pub message: String,
}

impl WireError {
    /// Create a new `WireError`.
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A `400 Bad Request` error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// A `404 Not Found` error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// A `500 Internal Server Error` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl Serialize for WireError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("WireError", 1)?;
        s.serialize_field("message", &self.message)?;
        s.end()
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "jsonfn: {}", self.message)
    }
}

impl StdError for WireError {}

/// An error produced while handling a request.
///
/// Anything implementing [`std::error::Error`] converts into this type, so
/// handler functions can use `?` freely. A [`WireError`] lands in the
/// [`Wire`](Error::Wire) variant, everything else in [`Other`](Error::Other).
pub enum Error {
    Wire(WireError),
    Other(BoxError),
}

impl Error {
    /// Create a plain error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Error::Other(Box::new(Message(message.into())))
    }

    /// Returns the [`WireError`] this error is or wraps, if any.
    ///
    /// Wrapped errors are found by walking the [`source`](StdError::source)
    /// chain.
    pub fn as_wire(&self) -> Option<&WireError> {
        match self {
            Error::Wire(wire) => Some(wire),
            Error::Other(err) => {
                let mut next: Option<&(dyn StdError + 'static)> = Some(&**err);
                while let Some(err) = next {
                    if let Some(wire) = err.downcast_ref::<WireError>() {
                        return Some(wire);
                    }
                    next = err.source();
                }
                None
            }
        }
    }

    /// Convert into a boxed standard error.
    pub fn into_inner(self) -> BoxError {
        match self {
            Error::Wire(wire) => Box::new(wire),
            Error::Other(err) => err,
        }
    }
}

impl<E> From<E> for Error
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        let err: BoxError = Box::new(err);
        match err.downcast::<WireError>() {
            Ok(wire) => Error::Wire(*wire),
            Err(err) => Error::Other(err),
        }
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Wire(wire) => f.debug_tuple("Wire").field(wire).finish(),
            Error::Other(err) => f.debug_tuple("Other").field(err).finish(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Wire(wire) => fmt::Display::fmt(wire, f),
            Error::Other(err) => fmt::Display::fmt(err, f),
        }
    }
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for Message {}
