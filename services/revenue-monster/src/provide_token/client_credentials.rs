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

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::HeaderValue;
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

use paysign_core::hash::base64_encode;
use paysign_core::time::now;
use paysign_core::utils::Redact;
use paysign_core::{Context, Error, ProvideToken, Result, Token};

use crate::constants::CONTENT_TYPE_JSON;

/// Token request of the client credentials grant.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest {
    grant_type: &'static str,
}

/// Token response of the auth server.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Error body of the auth server.
#[derive(Deserialize)]
struct TokenErrorResponse {
    error: TokenError,
}

#[derive(Deserialize)]
struct TokenError {
    code: String,
    #[serde(default)]
    message: String,
}

/// ClientCredentialsTokenProvider exchanges the client id and secret for an access token.
///
/// It performs the OAuth2 client credentials grant against `{endpoint}/v1/token`.
#[derive(Clone)]
pub struct ClientCredentialsTokenProvider {
    client_id: String,
    client_secret: String,
    endpoint: String,
}

impl Debug for ClientCredentialsTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentialsTokenProvider")
            .field("client_id", &self.client_id)
            .field("client_secret", &Redact::from(&self.client_secret))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl ClientCredentialsTokenProvider {
    /// Create a provider against the auth host `endpoint`.
    pub fn new(client_id: &str, client_secret: &str, endpoint: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ProvideToken for ClientCredentialsTokenProvider {
    async fn provide_token(&self, ctx: &Context) -> Result<Token> {
        let url = format!("{}/v1/token", self.endpoint);
        debug!("exchanging client credentials for access token at {url}");

        let body = serde_json::to_vec(&TokenRequest {
            grant_type: "client_credentials",
        })
        .map_err(|e| Error::unexpected("failed to serialize token request").with_source(e))?;

        let mut auth: HeaderValue = format!(
            "Basic {}",
            base64_encode(format!("{}:{}", self.client_id, self.client_secret).as_bytes())
        )
        .parse()?;
        auth.set_sensitive(true);

        let req = http::Request::builder()
            .method(http::Method::POST)
            .uri(&url)
            .header(ACCEPT, CONTENT_TYPE_JSON)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .header(AUTHORIZATION, auth)
            .body(Bytes::from(body))
            .map_err(|e| Error::auth_failed("failed to build token request").with_source(e))?;

        let resp = ctx
            .http_send(req)
            .await
            .map_err(|e| Error::auth_failed("token exchange request failed").with_source(e))?;

        if resp.status() != http::StatusCode::OK {
            error!("token exchange got unexpected response: {}", resp.status());
            let message = match serde_json::from_slice::<TokenErrorResponse>(resp.body()) {
                Ok(v) => format!("{}: {}", v.error.code, v.error.message),
                Err(_) => String::from_utf8_lossy(resp.body()).to_string(),
            };
            return Err(Error::auth_failed(format!(
                "token exchange failed with {}: {message}",
                resp.status()
            )));
        }

        let token_resp: TokenResponse = serde_json::from_slice(resp.body())
            .map_err(|e| Error::auth_failed("failed to parse token response").with_source(e))?;

        let expires_at = token_resp
            .expires_in
            .and_then(chrono::TimeDelta::try_seconds)
            .map(|ttl| now() + ttl);

        Ok(Token {
            access_token: token_resp.access_token,
            token_type: token_resp.token_type,
            refresh_token: token_resp.refresh_token,
            expires_at,
        })
    }
}
