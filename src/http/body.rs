use crate::BoxError;

use std::error::Error as StdError;
use std::future::poll_fn;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::{fmt, mem};

use bytes::{Bytes, BytesMut};
use futures_core::Stream;

/// Respresents the body of an HTTP message.
pub struct Body {
    kind: BodyKind,
}

enum BodyKind {
    Stream(Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send + Sync>>),
    Once(Bytes),
    Empty,
}

pin_project_lite::pin_project! {
    struct MapErr<S> {
        #[pin]
        stream: S,
    }
}

impl<S, E> Stream for MapErr<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: StdError + Send + Sync + 'static,
{
    type Item = Result<Bytes, BoxError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project()
            .stream
            .poll_next(cx)
            .map(|chunk| chunk.map(|res| res.map_err(|err| Box::new(err) as _)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

impl Body {
    /// Create a `Body` from a stream of bytes.
    pub fn stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + Sync + 'static,
        E: StdError + Send + Sync + 'static,
    {
        Body {
            kind: BodyKind::Stream(Box::pin(MapErr { stream })),
        }
    }

    /// Create a body directly from bytes.
    pub fn once(bytes: impl Into<Bytes>) -> Self {
        Body {
            kind: BodyKind::Once(bytes.into()),
        }
    }

    /// Create an empty `Body`.
    pub fn empty() -> Self {
        Body {
            kind: BodyKind::Empty,
        }
    }

    /// Returns `true` if the body is known to hold no data.
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            BodyKind::Empty => true,
            BodyKind::Once(bytes) => bytes.is_empty(),
            BodyKind::Stream(_) => false,
        }
    }

    /// Read the entire body into memory.
    ///
    /// `limit` is the maximum number of bytes that can be read
    /// before [`BodyError::Overflow`] is returned.
    pub async fn collect(mut self, limit: usize) -> Result<Bytes, BodyError> {
        let check = |len: usize| {
            if len > limit {
                Err(BodyError::Overflow { limit })
            } else {
                Ok(())
            }
        };

        match mem::replace(&mut self.kind, BodyKind::Empty) {
            BodyKind::Empty => Ok(Bytes::new()),
            BodyKind::Once(bytes) => check(bytes.len()).map(|_| bytes),
            BodyKind::Stream(mut stream) => {
                let mut buf = BytesMut::with_capacity(stream.size_hint().0.min(limit));

                while let Some(chunk) = poll_fn(|cx| stream.as_mut().poll_next(cx)).await {
                    let chunk = chunk.map_err(BodyError::Io)?;
                    check(buf.len() + chunk.len())?;
                    buf.extend_from_slice(&chunk);
                }

                Ok(buf.freeze())
            }
        }
    }
}

impl Stream for Body {
    type Item = Result<Bytes, BoxError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match &mut self.kind {
            BodyKind::Stream(stream) => stream.as_mut().poll_next(cx),
            BodyKind::Once(bytes) => {
                let bytes = mem::take(bytes);
                self.kind = BodyKind::Empty;
                Some(Ok(bytes)).into()
            }
            BodyKind::Empty => None.into(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.kind {
            BodyKind::Stream(stream) => stream.size_hint(),
            BodyKind::Once(bytes) => (bytes.len(), Some(bytes.len())),
            BodyKind::Empty => (0, Some(0)),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            BodyKind::Stream(_) => "Stream",
            BodyKind::Once(_) => "Once",
            BodyKind::Empty => "Empty",
        };

        f.debug_struct("Body").field("kind", &kind).finish()
    }
}

macro_rules! from_bytes {
    ($($ty:ty),* $(,)?) => {$(
        impl From<$ty> for Body {
            fn from(bytes: $ty) -> Self {
                Body::once(bytes)
            }
        }
    )*}
}

from_bytes! {
    Bytes,
    Vec<u8>,
    String,
    &'static str,
    &'static [u8],
}

/// The error returned by [`Body::collect`].
#[derive(Debug)]
pub enum BodyError {
    /// The body was larger than the configured limit.
    Overflow { limit: usize },
    /// The underlying stream failed.
    Io(BoxError),
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyError::Overflow { limit } => {
                write!(f, "body larger than limit of {} bytes", limit)
            }
            BodyError::Io(err) => write!(f, "failed to read request body: {}", err),
        }
    }
}

impl StdError for BodyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            BodyError::Io(err) => Some(&**err),
            BodyError::Overflow { .. } => None,
        }
    }
}
