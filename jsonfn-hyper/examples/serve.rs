use std::net::SocketAddr;

use jsonfn::http::{header, HeaderValue};
use jsonfn::{handler, json_error, Context, Error, WireError};
use jsonfn_hyper::Serve;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Deserialize)]
struct Divide {
    dividend: i64,
    divisor: i64,
}

#[derive(Serialize)]
struct Quotient {
    quotient: i64,
}

async fn divide(cx: Context, req: Divide) -> Result<Quotient, Error> {
    if req.divisor == 0 {
        return Err(WireError::bad_request("division by zero").into());
    }

    cx.response_writer()
        .insert_header(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok(Quotient {
        quotient: req.dividend / req.divisor,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    handler(divide, json_error)?.listen(addr)?.await?;
    Ok(())
}
