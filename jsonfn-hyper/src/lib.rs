//! Serve [`jsonfn`] handlers with [`hyper`].
//!
//! ```no_run
//! use jsonfn::{handler, json_error, Context, Error};
//! use jsonfn_hyper::Serve;
//!
//! async fn ping(_: Context) -> Result<&'static str, Error> {
//!     Ok("pong")
//! }
//!
//! # async fn run() -> hyper::Result<()> {
//! let ping = handler(ping, json_error).unwrap();
//! ping.listen(([127, 0, 0, 1], 3000).into())?.await
//! # }
//! ```

use std::convert::Infallible;
use std::future::{ready, Future, Ready};
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use hyper::server::conn::AddrIncoming;
use hyper::service::Service;
use jsonfn::Handler;

pub use hyper::Server;

/// Extension methods for serving a [`Handler`] over hyper.
pub trait Serve {
    /// Bind a server to `addr` that answers every request with this handler.
    fn listen(self, addr: SocketAddr) -> hyper::Result<Server<AddrIncoming, MakeHandlerService>>;

    /// Convert into a hyper "make service".
    fn into_make_service(self) -> MakeHandlerService;

    /// Convert into a hyper service.
    fn into_service(self) -> HandlerService;
}

impl Serve for Handler {
    fn listen(self, addr: SocketAddr) -> hyper::Result<Server<AddrIncoming, MakeHandlerService>> {
        let server = Server::try_bind(&addr)?.serve(self.into_make_service());
        tracing::info!(addr = %server.local_addr(), "listening");
        Ok(server)
    }

    fn into_make_service(self) -> MakeHandlerService {
        MakeHandlerService {
            service: self.into_service(),
        }
    }

    fn into_service(self) -> HandlerService {
        HandlerService { handler: self }
    }
}

/// Creates a [`HandlerService`] for every connection.
#[derive(Clone)]
pub struct MakeHandlerService {
    service: HandlerService,
}

impl<T> Service<T> for MakeHandlerService {
    type Response = HandlerService;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Infallible>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, _: T) -> Self::Future {
        ready(Ok(self.service.clone()))
    }
}

/// A hyper service backed by a [`Handler`].
#[derive(Clone)]
pub struct HandlerService {
    handler: Handler,
}

impl Service<hyper::Request<hyper::Body>> for HandlerService {
    type Response = hyper::Response<ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: hyper::Request<hyper::Body>) -> Self::Future {
        let (parts, body) = req.into_parts();
        let req = jsonfn::http::Request::from_parts(parts, jsonfn::http::Body::stream(body));
        let handler = self.handler.clone();

        Box::pin(async move {
            let resp = handler.serve(req).await;
            let (parts, body) = resp.into_parts();
            Ok(hyper::Response::from_parts(parts, ResponseBody { inner: body }))
        })
    }
}

/// The body of a response written by a [`Handler`].
pub struct ResponseBody {
    inner: jsonfn::http::Body,
}

impl http_body::Body for ResponseBody {
    type Data = jsonfn::http::Bytes;
    type Error = jsonfn::BoxError;

    fn poll_data(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Self::Data, Self::Error>>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn poll_trailers(
        self: Pin<&mut Self>,
        _: &mut Context<'_>,
    ) -> Poll<Result<Option<hyper::HeaderMap>, Self::Error>> {
        Poll::Ready(Ok(None))
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_empty()
    }

    fn size_hint(&self) -> http_body::SizeHint {
        let (lower, upper) = self.inner.size_hint();

        let mut hint = http_body::SizeHint::new();
        hint.set_lower(lower as _);
        if let Some(upper) = upper {
            hint.set_upper(upper as _);
        }

        hint
    }
}
