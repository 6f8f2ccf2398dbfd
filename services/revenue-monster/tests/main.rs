// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use http::Method;
use paysign_core::hash::base64_encode;
use paysign_core::{
    ApiErrorKind, Context, Error, ErrorKind, PublicKey, Result, SignType, Span, SpanContext,
    Tracer,
};
use paysign_http_send_reqwest::ReqwestHttpSend;
use paysign_revenue_monster::{
    Client, Config, Request, StaticTokenProvider, RESPONSE_SUCCESS,
};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{json, Value};
use test_case::test_case;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string, header, header_regex, method, path};
use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

const PRIVATE_KEY: &str = include_str!("../testdata/private_key.pem");
const PUBLIC_KEY: &str = include_str!("../testdata/public_key.pem");
const ACCESS_TOKEN: &str = "access-token-for-tests";

fn init_context() -> Context {
    let _ = env_logger::builder().is_test(true).try_init();
    Context::new().with_http_send(ReqwestHttpSend::default())
}

fn init_config(server: &MockServer) -> Config {
    Config::new()
        .with_client_credentials("client-id", "client-secret")
        .with_private_key(PRIVATE_KEY)
        .with_store_id("store-1")
        .with_endpoints(server.uri(), server.uri())
}

async fn mount_token(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": ACCESS_TOKEN,
            "tokenType": "Bearer",
            "expiresIn": 3600,
            "refreshToken": "refresh-token-for-tests",
            "refreshTokenExpiresIn": 86400
        })))
        .expect(times)
        .mount(server)
        .await;
}

/// Rebuilds the signing string from the received request and checks `X-Signature`.
struct VerifySignature {
    public_key: PublicKey,
    request_url: String,
    response: ResponseTemplate,
}

impl VerifySignature {
    fn new(request_url: &str, response: ResponseTemplate) -> Self {
        Self {
            public_key: PublicKey::from_pem(PUBLIC_KEY).unwrap(),
            request_url: request_url.to_string(),
            response,
        }
    }
}

impl Respond for VerifySignature {
    fn respond(&self, req: &wiremock::Request) -> ResponseTemplate {
        let header = |name: &str| {
            req.headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        };

        let signature = header("x-signature");
        let Some(signature) = signature.strip_prefix("sha256 ") else {
            return ResponseTemplate::new(401);
        };

        let mut params = vec![];
        if !req.body.is_empty() {
            params.push(format!("data={}", base64_encode(&req.body)));
        }
        params.push(format!("method={}", req.method.as_str().to_lowercase()));
        params.push(format!("nonceStr={}", header("x-nonce-str")));
        params.push(format!("requestUrl={}", self.request_url));
        params.push("signType=sha256".to_string());
        params.push(format!("timestamp={}", header("x-timestamp")));

        match self.public_key.verify(SignType::Sha256, &params, signature) {
            Ok(()) => self.response.clone(),
            Err(_) => ResponseTemplate::new(401).set_body_json(json!({
                "error": {"code": "INVALID_SIGNATURE", "message": "signature mismatch"}
            })),
        }
    }
}

#[derive(Debug, Default, Clone)]
struct SpanRecord {
    operation: String,
    parent: Option<SpanContext>,
    tags: HashMap<String, String>,
    fields: HashMap<String, String>,
    error: Option<ErrorKind>,
    finished: bool,
}

#[derive(Debug, Default, Clone)]
struct RecordingTracer {
    spans: Arc<Mutex<Vec<SpanRecord>>>,
}

impl RecordingTracer {
    fn spans(&self) -> Vec<SpanRecord> {
        self.spans.lock().unwrap().clone()
    }
}

impl Tracer for RecordingTracer {
    fn start_span(&self, operation: &str, parent: Option<&SpanContext>) -> Box<dyn Span> {
        let mut spans = self.spans.lock().unwrap();
        spans.push(SpanRecord {
            operation: operation.to_string(),
            parent: parent.copied(),
            ..Default::default()
        });
        Box::new(RecordingSpan {
            index: spans.len() - 1,
            spans: self.spans.clone(),
        })
    }
}

struct RecordingSpan {
    index: usize,
    spans: Arc<Mutex<Vec<SpanRecord>>>,
}

impl RecordingSpan {
    fn update(&self, f: impl FnOnce(&mut SpanRecord)) {
        f(&mut self.spans.lock().unwrap()[self.index])
    }
}

impl Span for RecordingSpan {
    fn context(&self) -> Option<SpanContext> {
        Some(SpanContext {
            trace_id: 1,
            span_id: self.index as u64 + 1,
        })
    }

    fn set_tag(&mut self, key: &str, value: &str) {
        self.update(|s| {
            s.tags.insert(key.to_string(), value.to_string());
        })
    }

    fn log_field(&mut self, key: &str, value: &str) {
        self.update(|s| {
            s.fields.insert(key.to_string(), value.to_string());
        })
    }

    fn set_error(&mut self, err: &Error) {
        self.update(|s| s.error = Some(err.kind()))
    }

    fn finish(&mut self) {
        self.update(|s| {
            assert!(!s.finished, "span finished twice");
            s.finished = true;
        })
    }
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    code: String,
    item: Value,
}

#[tokio::test]
async fn test_signed_post() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    let url = format!("{}/v3/payment/online", server.uri());
    Mock::given(method("POST"))
        .and(path("/v3/payment/online"))
        .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .and(header_regex("x-nonce-str", "^[a-zA-Z0-9]{25}$"))
        .and(header_regex("x-timestamp", "^[0-9]+$"))
        .and(body_string(r#"{"amount":100,"currency":"MYR"}"#))
        .respond_with(VerifySignature::new(
            &url,
            ResponseTemplate::new(200).set_body_json(json!({
                "code": "SUCCESS",
                "item": {"checkoutId": "1234"}
            })),
        ))
        .expect(2)
        .mount(&server)
        .await;

    let client = Client::builder(init_config(&server))
        .build(init_context())
        .await?;
    assert_eq!(client.open_url("/v3/payment/online"), url);

    for _ in 0..2 {
        let req = Request::new("create_online_payment", Method::POST, &url)
            .with_json(json!({"currency": "MYR", "amount": 100}));
        let resp: Option<PaymentResponse> = client.execute(req).await?;
        let resp = resp.expect("response must have a body");
        assert_eq!(resp.code, RESPONSE_SUCCESS);
        assert_eq!(resp.item, json!({"checkoutId": "1234"}));
    }
    Ok(())
}

#[tokio::test]
async fn test_get_without_body() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    let url = format!("{}/v3/store/store-1", server.uri());
    Mock::given(method("GET"))
        .and(path("/v3/store/store-1"))
        .and(body_string(""))
        .respond_with(VerifySignature::new(
            &url,
            ResponseTemplate::new(200).set_body_string(r#"{"code":"SUCCESS"}"#),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::builder(init_config(&server))
        .build(init_context())
        .await?;
    let req = Request::new("get_store", Method::GET, &url).with_json(json!({}));
    let resp = client.execute_raw(req).await?;
    assert_eq!(resp.as_deref(), Some(br#"{"code":"SUCCESS"}"#.as_slice()));
    Ok(())
}

#[test_case(ResponseTemplate::new(204), None; "no content")]
#[test_case(ResponseTemplate::new(502).set_body_string("upstream down"), Some(ErrorKind::BadGateway); "bad gateway")]
#[test_case(ResponseTemplate::new(500).set_body_string("<html>oops</html>"), Some(ErrorKind::Transport); "server error without json")]
#[test_case(ResponseTemplate::new(200).set_body_string("not json"), Some(ErrorKind::DecodingFailed); "undecodable success")]
#[test_case(ResponseTemplate::new(302).set_body_string("[]"), Some(ErrorKind::DecodingFailed); "redirect treated as success")]
#[tokio::test]
async fn test_status_routing(resp: ResponseTemplate, expected: Option<ErrorKind>) {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/v3/order"))
        .respond_with(resp)
        .mount(&server)
        .await;

    let tracer = RecordingTracer::default();
    let client = Client::builder(init_config(&server))
        .with_tracer(tracer.clone())
        .build(init_context())
        .await
        .unwrap();

    let req = Request::new("create_order", Method::POST, client.open_url("v3/order"))
        .with_json(json!({"amount": 1}));
    let result = client.execute::<PaymentResponse>(req).await;

    match expected {
        None => assert!(matches!(result, Ok(None)), "got {result:?}"),
        Some(kind) => assert_eq!(result.unwrap_err().kind(), kind),
    }

    let spans = tracer.spans();
    assert_eq!(spans.len(), 1);
    assert!(spans[0].finished);
    assert_eq!(spans[0].error, expected);
}

#[tokio::test]
async fn test_bad_gateway_message() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = Client::builder(init_config(&server))
        .build(init_context())
        .await
        .unwrap();
    let url = client.open_url("v3/order");
    let err = client
        .execute_raw(Request::new("create_order", Method::POST, &url))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), format!("bad gateway on POST: {url}"));
}

#[test_case(400, "VALIDATION_ERROR", ApiErrorKind::Validation; "validation")]
#[test_case(401, "INVALID_TOKEN", ApiErrorKind::Unauthorized; "unauthorized")]
#[test_case(429, "TOO_MANY_REQUESTS", ApiErrorKind::RateLimited; "rate limited")]
#[test_case(503, "MAINTENANCE", ApiErrorKind::Server; "server")]
#[tokio::test]
async fn test_api_errors(status: u16, code: &str, expected: ApiErrorKind) {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/v3/order"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "error": {"code": code, "message": "rejected", "debug": "trace-1"}
        })))
        .mount(&server)
        .await;

    let client = Client::builder(init_config(&server))
        .build(init_context())
        .await
        .unwrap();
    let req = Request::new("create_order", Method::POST, client.open_url("v3/order"))
        .with_json(json!({"amount": 1}));
    let err = client.execute::<Value>(req).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Api);
    let api = err.api_error().unwrap();
    assert_eq!(api.kind, expected);
    assert_eq!(api.status, status);
    assert_eq!(api.code, code);
    assert_eq!(api.debug.as_deref(), Some("trace-1"));
    assert_eq!(api.request_body.as_deref(), Some(r#"{"amount":1}"#));
}

#[tokio::test]
async fn test_auth_failure_skips_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": "INVALID_CLIENT", "message": "unknown client"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path("/v3/order"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = Client::builder(init_config(&server))
        .build(init_context())
        .await
        .unwrap();
    let req = Request::new("create_order", Method::POST, client.open_url("v3/order"))
        .with_json(json!({"amount": 1}));
    let err = client.execute::<Value>(req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthFailed);
    assert!(err.is_pre_network());
}

#[tokio::test]
async fn test_invalid_body_skips_network() {
    let server = MockServer::start().await;
    mount_token(&server, 0).await;
    Mock::given(path("/v3/order"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = Client::builder(init_config(&server))
        .build(init_context())
        .await
        .unwrap();
    for body in ["{not json", "[1,2,3]"] {
        let req = Request::new("create_order", Method::POST, client.open_url("v3/order"))
            .with_raw_body(body);
        let err = client.execute::<Value>(req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodingInvalid);
    }
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(path("/v3/order"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let tracer = RecordingTracer::default();
    let client = Client::builder(init_config(&server))
        .with_tracer(tracer.clone())
        .build(init_context())
        .await
        .unwrap();

    let started = Instant::now();
    let req = Request::new("create_order", Method::POST, client.open_url("v3/order"))
        .with_timeout(Duration::from_millis(200));
    let err = client.execute::<Value>(req).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Canceled);
    assert!(started.elapsed() < Duration::from_secs(5));
    let spans = tracer.spans();
    assert!(spans[0].finished);
    assert_eq!(spans[0].error, Some(ErrorKind::Canceled));
}

#[tokio::test]
async fn test_cancellation() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(path("/v3/order"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let tracer = RecordingTracer::default();
    let client = Client::builder(init_config(&server))
        .with_tracer(tracer.clone())
        .build(init_context())
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let req = Request::new("create_order", Method::POST, client.open_url("v3/order"))
        .with_cancellation(cancel);
    let err = client.execute::<Value>(req).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Canceled);
    assert!(started.elapsed() < Duration::from_secs(5));
    let spans = tracer.spans();
    assert!(spans[0].finished);
    assert_eq!(spans[0].error, Some(ErrorKind::Canceled));
}

#[tokio::test]
async fn test_span_records_call() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/v3/order"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"code":"SUCCESS"}"#))
        .mount(&server)
        .await;

    let tracer = RecordingTracer::default();
    let client = Client::builder(init_config(&server))
        .with_tracer(tracer.clone())
        .build(init_context())
        .await?;

    let parent = SpanContext {
        trace_id: 7,
        span_id: 9,
    };
    let url = client.open_url("v3/order");
    let req = Request::new("create_order", Method::POST, &url)
        .with_json(json!({"b": 2, "a": 1}))
        .with_parent_span(parent);
    client.execute::<Value>(req).await?;

    let spans = tracer.spans();
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.operation, "create_order");
    assert_eq!(span.parent, Some(parent));
    assert_eq!(span.tags["http.url"], url);
    assert_eq!(span.tags["http.method"], "POST");
    assert_eq!(span.tags["http.status_code"], "200");
    assert_eq!(span.tags["component"], "paysign-revenue-monster");
    assert_eq!(span.fields["http.request.body"], r#"{"a":1,"b":2}"#);
    assert_eq!(span.fields["http.response.body"], r#"{"code":"SUCCESS"}"#);
    assert_eq!(span.error, None);
    assert!(span.finished);
    Ok(())
}

#[tokio::test]
async fn test_span_without_bodies() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/v3/order"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"code":"SUCCESS"}"#))
        .mount(&server)
        .await;

    let tracer = RecordingTracer::default();
    let client = Client::builder(init_config(&server).with_record_bodies(false))
        .with_tracer(tracer.clone())
        .build(init_context())
        .await?;

    let req = Request::new("create_order", Method::POST, client.open_url("v3/order"))
        .with_json(json!({"card": "4111111111111111"}));
    client.execute::<Value>(req).await?;

    let span = &tracer.spans()[0];
    assert_eq!(span.fields["http.request.body"], "<27 bytes>");
    assert_eq!(span.fields["http.response.body"], "<18 bytes>");
    Ok(())
}

#[tokio::test]
async fn test_set_token_provider() -> Result<()> {
    let server = MockServer::start().await;
    mount_token(&server, 0).await;
    for token in ["first", "second"] {
        Mock::given(method("GET"))
            .and(path("/v3/store"))
            .and(header("authorization", format!("Bearer {token}").as_str()))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = Client::builder(Config::new().with_private_key(PRIVATE_KEY).with_endpoints(
        server.uri(),
        server.uri(),
    ))
    .with_token_provider(StaticTokenProvider::new("first"))
    .build(init_context())
    .await?;

    let url = client.open_url("v3/store");
    client
        .execute_raw(Request::new("get_store", Method::GET, &url))
        .await?;
    client
        .set_token_provider(StaticTokenProvider::new("second"))
        .await;
    client
        .execute_raw(Request::new("get_store", Method::GET, &url))
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_build_requires_credentials() {
    let err = Client::builder(Config::new().with_private_key(PRIVATE_KEY))
        .build(init_context())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

    let err = Client::builder(Config::new().with_client_credentials("id", "secret"))
        .build(init_context())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}
