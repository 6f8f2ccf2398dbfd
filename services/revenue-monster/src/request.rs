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

use std::time::Duration;

use bytes::Bytes;
use http::Method;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use paysign_core::{Error, Result, SpanContext};

/// Body of a [`Request`].
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Structured body, canonicalized before sending.
    Json(Value),
    /// Raw JSON bytes, validated and canonicalized before sending.
    Raw(Bytes),
}

/// Request describes one call to the gateway.
///
/// `endpoint` is the full URL, it is signed exactly as given.
#[derive(Debug, Clone)]
pub struct Request {
    /// Operation name, used as the span name.
    pub operation: String,
    /// HTTP method.
    pub method: Method,
    /// Full URL of the endpoint.
    pub endpoint: String,
    /// Optional body.
    pub body: Option<Body>,
    /// Parent of the span opened for this call.
    pub parent: Option<SpanContext>,
    /// Cancels the call when triggered.
    pub cancel: Option<CancellationToken>,
    /// Deadline of the whole call, token refresh included.
    pub timeout: Option<Duration>,
}

impl Request {
    /// Create a request without body.
    pub fn new(operation: impl Into<String>, method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            method,
            endpoint: endpoint.into(),
            body: None,
            parent: None,
            cancel: None,
            timeout: None,
        }
    }

    /// Set a body from any serializable value.
    pub fn with_body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            Error::encoding_invalid("request body is not serializable").with_source(e)
        })?;
        self.body = Some(Body::Json(value));
        Ok(self)
    }

    /// Set a structured body.
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(Body::Json(body));
        self
    }

    /// Set a raw JSON body.
    pub fn with_raw_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(Body::Raw(body.into()));
        self
    }

    /// Attach the span of this call to `parent`.
    pub fn with_parent_span(mut self, parent: SpanContext) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Abort the call once `token` is canceled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Abort the call once `timeout` elapsed.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paysign_core::ErrorKind;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_with_body() {
        let mut body = HashMap::new();
        body.insert("amount", 100);
        let req = Request::new("create_order", Method::POST, "https://x/v3/order")
            .with_body(&body)
            .unwrap();
        assert_eq!(req.body, Some(Body::Json(json!({"amount": 100}))));
    }

    #[test]
    fn test_with_body_not_serializable() {
        let mut body = HashMap::new();
        body.insert(vec![1u8], 1);
        let err = Request::new("op", Method::POST, "https://x")
            .with_body(&body)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodingInvalid);
    }
}
