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

use http::StatusCode;
use serde::Deserialize;

use paysign_core::{ApiError, ApiErrorKind, Error};

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: ErrorDetail },
    Flat(ErrorDetail),
}

#[derive(Deserialize)]
struct ErrorDetail {
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    debug: Option<String>,
}

/// Turn an error response into a typed [`Error`].
///
/// A structured gateway body becomes an [`ErrorKind::Api`](paysign_core::ErrorKind::Api)
/// carrying an [`ApiError`]. Anything else becomes a transport error with the
/// status, url and raw body.
pub fn classify(
    status: StatusCode,
    url: &str,
    request_body: Option<&[u8]>,
    response_body: &[u8],
) -> Error {
    let detail = match serde_json::from_slice::<ErrorBody>(response_body) {
        Ok(ErrorBody::Nested { error }) => error,
        Ok(ErrorBody::Flat(detail)) => detail,
        Err(_) => {
            return Error::transport(format!(
                "unexpected response {status} from {url}: {}",
                String::from_utf8_lossy(response_body)
            ))
        }
    };

    Error::api(ApiError {
        status: status.as_u16(),
        kind: classify_kind(status, &detail.code),
        code: detail.code,
        message: detail.message,
        debug: detail.debug.filter(|v| !v.is_empty()),
        url: url.to_string(),
        request_body: request_body.map(|v| String::from_utf8_lossy(v).to_string()),
    })
}

fn classify_kind(status: StatusCode, code: &str) -> ApiErrorKind {
    match code {
        "UNAUTHORIZED" | "UNAUTHENTICATED" | "INVALID_TOKEN" | "TOKEN_EXPIRED"
        | "INVALID_SIGNATURE" | "PERMISSION_DENIED" | "FORBIDDEN" => ApiErrorKind::Unauthorized,
        "VALIDATION_ERROR" | "INVALID_REQUEST" | "INVALID_ARGUMENT" | "BAD_REQUEST"
        | "INVALID_PARAMETER" => ApiErrorKind::Validation,
        "RATE_LIMIT" | "RATE_LIMIT_EXCEEDED" | "TOO_MANY_REQUESTS" => ApiErrorKind::RateLimited,
        "INTERNAL_SERVER_ERROR" | "SERVICE_UNAVAILABLE" => ApiErrorKind::Server,
        _ => match status.as_u16() {
            401 | 403 => ApiErrorKind::Unauthorized,
            400 | 409 | 422 => ApiErrorKind::Validation,
            429 => ApiErrorKind::RateLimited,
            500..=599 => ApiErrorKind::Server,
            _ => ApiErrorKind::Other,
        },
    }
}
