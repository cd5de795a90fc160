//! Registration-time validation of a function's calling shape.
//!
//! A function can be wrapped by a [`Handler`](crate::Handler) when it has one
//! of two shapes:
//!
//! ```text
//! (Context) -> (Response, Error)
//! (Context, Request) -> (Response, Error)
//! ```
//!
//! Typed Rust functions always have one of these shapes, the trait bounds on
//! [`handler`](crate::handler) see to that. Functions with a shape declared at
//! runtime, see [`DynFunction`](crate::DynFunction), are checked by
//! [`validate`].

use crate::error::ShapeError;

use std::any::{self, TypeId};
use std::fmt;

/// The declared type of a request or response payload.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadType {
    name: &'static str,
    id: Option<TypeId>,
}

impl PayloadType {
    /// The payload type of a Rust type.
    pub fn of<T: 'static>() -> Self {
        Self {
            name: any::type_name::<T>(),
            id: Some(TypeId::of::<T>()),
        }
    }

    /// A payload type known only by name, as declared by a dynamic function.
    pub const fn named(name: &'static str) -> Self {
        Self { name, id: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A declared function argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// The request [`Context`](crate::Context).
    Context,
    /// A payload decoded from the request body.
    Payload(PayloadType),
    /// Anything else.
    Other(&'static str),
}

/// A declared function return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ret {
    /// A payload encoded into the response body.
    Payload(PayloadType),
    /// An [`Error`](crate::Error).
    Error,
    /// Anything else.
    Other(&'static str),
}

/// The calling shape of a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub returns: Vec<Ret>,
}

impl Signature {
    pub fn new(params: impl Into<Vec<Param>>, returns: impl Into<Vec<Ret>>) -> Self {
        Self {
            params: params.into(),
            returns: returns.into(),
        }
    }
}

/// The number and kind of arguments a validated function takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Only the request context.
    Context,
    /// The request context and a payload of the given type.
    Payload(PayloadType),
}

/// A function shape that passed [`validate`].
///
/// A descriptor can only be created by validation, so holding one proves
/// the shape is correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    arity: Arity,
}

impl Descriptor {
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// The payload type the request body is decoded into, if any.
    pub fn payload(&self) -> Option<PayloadType> {
        match self.arity {
            Arity::Context => None,
            Arity::Payload(ty) => Some(ty),
        }
    }

    /// The number of values the function returns.
    pub fn returns(&self) -> usize {
        RETURNS
    }
}

const RETURNS: usize = 2;

/// Check a signature against the accepted shapes.
///
/// Checks run in a fixed order and the first failure is reported:
/// argument count (too many, then too few), return count, the context
/// argument, and finally the error return.
pub fn validate(sig: &Signature) -> Result<Descriptor, ShapeError> {
    if sig.params.len() > 2 {
        return Err(ShapeError::TooManyArgs);
    }

    if sig.params.is_empty() {
        return Err(ShapeError::TooFewArgs);
    }

    if sig.returns.len() != RETURNS {
        return Err(ShapeError::WrongReturnCount);
    }

    if sig.params[0] != Param::Context {
        return Err(ShapeError::MissingContextArg);
    }

    if sig.returns[1] != Ret::Error {
        return Err(ShapeError::MissingErrorReturn);
    }

    let arity = match sig.params.get(1) {
        None => Arity::Context,
        Some(Param::Payload(ty)) => Arity::Payload(*ty),
        // any declared type is decoded into, as long as it's there
        Some(Param::Context) => Arity::Payload(PayloadType::of::<crate::Context>()),
        Some(Param::Other(name)) => Arity::Payload(PayloadType::named(name)),
    };

    Ok(Descriptor { arity })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQ: Param = Param::Payload(PayloadType::named("Req"));
    const RESP: Ret = Ret::Payload(PayloadType::named("Resp"));

    fn check(params: &[Param], returns: &[Ret]) -> Result<Descriptor, ShapeError> {
        validate(&Signature::new(params, returns))
    }

    #[test]
    fn accepted_shapes() {
        let one = check(&[Param::Context], &[RESP, Ret::Error]).unwrap();
        assert_eq!(one.arity(), Arity::Context);
        assert_eq!(one.payload(), None);
        assert_eq!(one.returns(), 2);

        let two = check(&[Param::Context, REQ], &[RESP, Ret::Error]).unwrap();
        assert_eq!(two.arity(), Arity::Payload(PayloadType::named("Req")));
    }

    #[test]
    fn exhaustive() {
        let params = [Param::Context, REQ, Param::Other("i32")];
        let returns = [RESP, Ret::Error, Ret::Other("bool")];

        for n in 0..=3 {
            for m in 0..=3 {
                for first in params {
                    for second_ret in returns {
                        let mut ps = vec![first; n.min(1)];
                        ps.extend(std::iter::repeat(REQ).take(n.saturating_sub(1)));

                        let mut rs = vec![RESP; m];
                        if m >= 2 {
                            rs[1] = second_ret;
                        }

                        let expected = if n > 2 {
                            Err(ShapeError::TooManyArgs)
                        } else if n < 1 {
                            Err(ShapeError::TooFewArgs)
                        } else if m != 2 {
                            Err(ShapeError::WrongReturnCount)
                        } else if first != Param::Context {
                            Err(ShapeError::MissingContextArg)
                        } else if second_ret != Ret::Error {
                            Err(ShapeError::MissingErrorReturn)
                        } else {
                            Ok(())
                        };

                        assert_eq!(check(&ps, &rs).map(drop), expected, "{:?} -> {:?}", ps, rs);
                    }
                }
            }
        }
    }

    #[test]
    fn first_failing_check_wins() {
        // too many args and a bad return count
        assert_eq!(
            check(&[Param::Other("a"), REQ, REQ], &[]),
            Err(ShapeError::TooManyArgs)
        );
        // bad return count and a missing context
        assert_eq!(
            check(&[Param::Other("a")], &[RESP]),
            Err(ShapeError::WrongReturnCount)
        );
        // missing context and missing error
        assert_eq!(
            check(&[REQ], &[RESP, RESP]),
            Err(ShapeError::MissingContextArg)
        );
    }

    #[test]
    fn idempotent() {
        let sig = Signature::new([Param::Context, REQ], [RESP, Ret::Error]);
        assert_eq!(validate(&sig), validate(&sig));

        let bad = Signature::new([Param::Context, REQ], [RESP]);
        assert_eq!(validate(&bad), validate(&bad));
    }

    #[test]
    fn rust_payload_types() {
        assert_eq!(PayloadType::of::<String>(), PayloadType::of::<String>());
        assert_ne!(PayloadType::of::<String>(), PayloadType::of::<u8>());
        assert_ne!(PayloadType::of::<u8>(), PayloadType::named("u8"));
        assert_eq!(PayloadType::of::<u8>().name(), "u8");
    }
}
