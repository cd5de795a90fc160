use jsonfn::http::{Body, Request, Response, StatusCode};
use jsonfn::shape::{Arity, Param, PayloadType, Ret, Signature};
use jsonfn::{async_trait, json_error, Context, DynFunction, Error, Handler, Return, ShapeError};
use serde_json::{json, Value};

const ANY: PayloadType = PayloadType::named("any");

/// A function with a declared shape that returns canned values.
struct Canned {
    signature: Signature,
    returns: fn(Option<Value>) -> Vec<Return>,
}

#[async_trait]
impl DynFunction for Canned {
    fn signature(&self) -> Signature {
        self.signature.clone()
    }

    async fn call(&self, _: Context, payload: Option<Value>) -> Vec<Return> {
        (self.returns)(payload)
    }
}

fn canned(params: &[Param], returns: &[Ret]) -> Canned {
    Canned {
        signature: Signature::new(params, returns),
        returns: |payload| vec![Return::payload(payload), Return::Nil],
    }
}

fn register(f: Canned) -> Result<Handler, ShapeError> {
    Handler::dynamic(f, json_error)
}

fn post(body: &'static str) -> Request {
    http::Request::post("/").body(Body::from(body)).unwrap()
}

async fn read(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let body = response.into_body().collect(usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[test]
fn shape_errors() {
    let resp = Ret::Payload(ANY);
    let req = Param::Payload(ANY);

    let cases = [
        (
            canned(&[Param::Context, req, req], &[resp, Ret::Error]),
            ShapeError::TooManyArgs,
        ),
        (canned(&[], &[resp, Ret::Error]), ShapeError::TooFewArgs),
        (
            canned(&[Param::Context], &[resp, Ret::Error, Ret::Error]),
            ShapeError::WrongReturnCount,
        ),
        (
            canned(&[Param::Other("String")], &[resp, Ret::Error]),
            ShapeError::MissingContextArg,
        ),
        (
            canned(&[Param::Context, req], &[resp, Ret::Other("bool")]),
            ShapeError::MissingErrorReturn,
        ),
    ];

    for (f, expected) in cases {
        assert_eq!(register(f).unwrap_err(), expected);
    }
}

#[test]
fn shape_error_messages() {
    let cases = [
        (
            ShapeError::TooManyArgs,
            "jsonfn: handler: too many args. expected function with no more than 2 args",
        ),
        (
            ShapeError::TooFewArgs,
            "jsonfn: handler: too few args. expected function with at least 1 arg",
        ),
        (
            ShapeError::WrongReturnCount,
            "jsonfn: handler: expected function to have 2 return values",
        ),
        (
            ShapeError::MissingContextArg,
            "jsonfn: handler: 1st arg must be the request context",
        ),
        (
            ShapeError::MissingErrorReturn,
            "jsonfn: handler: function's 2nd return value must be an error",
        ),
    ];

    for (err, expected) in cases {
        assert_eq!(err.to_string(), expected);
    }
}

#[tokio::test]
async fn echo() {
    let echo = register(canned(
        &[Param::Context, Param::Payload(ANY)],
        &[Ret::Payload(ANY), Ret::Error],
    ))
    .unwrap();
    assert_eq!(echo.descriptor().arity(), Arity::Payload(ANY));

    let (status, body) = read(echo.serve(post(r#"{"a": [1, 2]}"#)).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({ "a": [1, 2] }));
}

#[tokio::test]
async fn context_only_gets_no_payload() {
    let f = canned(&[Param::Context], &[Ret::Payload(ANY), Ret::Error]);
    let f = register(f).unwrap();

    let (status, body) = read(f.serve(post("ignored")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "null\n");
}

#[tokio::test]
async fn wrong_return_count_at_call_time() {
    let mut f = canned(&[Param::Context], &[Ret::Payload(ANY), Ret::Error]);
    f.returns = |_| vec![Return::payload(1), Return::Nil, Return::Nil];
    let f = register(f).unwrap();

    let (status, body) = read(f.serve(post("")).await).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "{\"error\":\"handler needs 2 return values\"}\n");
}

#[tokio::test]
async fn wrong_return_kind_at_call_time() {
    let mut f = canned(&[Param::Context], &[Ret::Payload(ANY), Ret::Error]);
    f.returns = |_| vec![Return::error(Error::msg("misplaced")), Return::Nil];
    let f = register(f).unwrap();

    let (status, _) = read(f.serve(post("")).await).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn error_slot_wins() {
    let mut f = canned(&[Param::Context], &[Ret::Payload(ANY), Ret::Error]);
    f.returns = |_| {
        vec![
            Return::payload("ignored"),
            Return::error(jsonfn::WireError::not_found("nope")),
        ]
    };
    let f = register(f).unwrap();

    let (status, body) = read(f.serve(post("")).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "{\"message\":\"nope\"}\n");
}
