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

use std::fmt::{self, Debug};
use std::future::pending;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderValue, StatusCode, Uri};
use log::debug;
use serde::de::DeserializeOwned;

use paysign_core::canonical::{canonicalize, canonicalize_value};
use paysign_core::hash::{base64_encode, hex_sha256};
use paysign_core::time::{now, unix_seconds};
use paysign_core::utils::{random_nonce, NONCE_LENGTH};
use paysign_core::{
    ActiveSpan, Context, Error, NoopTracer, PrivateKey, ProvideToken, PublicKey, Result,
    SignType, SigningMaterial, TokenSource, Tracer,
};

use crate::classify::classify;
use crate::constants::*;
use crate::provide_token::ClientCredentialsTokenProvider;
use crate::request::{Body, Request};
use crate::Config;

/// Client sends signed requests to the Revenue Monster open API.
///
/// Cloning is cheap, all clones share the same token cache.
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    ctx: Context,
    config: Config,
    private_key: PrivateKey,
    public_key: Option<PublicKey>,
    oauth_endpoint: String,
    open_endpoint: String,
    tokens: TokenSource,
    tracer: Arc<dyn Tracer>,
}

impl Debug for Inner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("oauth_endpoint", &self.oauth_endpoint)
            .field("open_endpoint", &self.open_endpoint)
            .field("tracer", &self.tracer)
            .finish_non_exhaustive()
    }
}

/// ClientBuilder configures and loads a [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    config: Config,
    tracer: Option<Arc<dyn Tracer>>,
    provider: Option<Arc<dyn ProvideToken>>,
}

impl ClientBuilder {
    /// Report spans to `tracer`, [`NoopTracer`] by default.
    pub fn with_tracer(mut self, tracer: impl Tracer) -> Self {
        self.tracer = Some(Arc::new(tracer));
        self
    }

    /// Use `provider` for access tokens instead of the client credentials exchange.
    pub fn with_token_provider(mut self, provider: impl ProvideToken) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    /// Load keys and build the client.
    ///
    /// Fails with [`ErrorKind::ConfigInvalid`](paysign_core::ErrorKind::ConfigInvalid)
    /// if the private key is missing or malformed, or if neither client
    /// credentials nor a token provider are configured.
    pub async fn build(self, ctx: Context) -> Result<Client> {
        let config = self.config;
        let private_key = config.load_private_key(&ctx).await?;
        let public_key = config.load_public_key()?;
        let oauth_endpoint = config.resolved_oauth_endpoint();
        let open_endpoint = config.resolved_open_endpoint();

        let provider: Arc<dyn ProvideToken> = match self.provider {
            Some(provider) => provider,
            None => match (&config.client_id, &config.client_secret) {
                (Some(id), Some(secret)) => Arc::new(ClientCredentialsTokenProvider::new(
                    id,
                    secret,
                    &oauth_endpoint,
                )),
                _ => {
                    return Err(Error::config_invalid(
                        "client_id and client_secret are required without a token provider",
                    ))
                }
            },
        };
        let tokens = TokenSource::from_arc(ctx.clone(), provider);

        debug!("revenue monster client built against {open_endpoint}");
        Ok(Client {
            inner: Arc::new(Inner {
                ctx,
                config,
                private_key,
                public_key,
                oauth_endpoint,
                open_endpoint,
                tokens,
                tracer: self.tracer.unwrap_or_else(|| Arc::new(NoopTracer)),
            }),
        })
    }
}

impl Client {
    /// Start building a client from `config`.
    pub fn builder(config: Config) -> ClientBuilder {
        ClientBuilder {
            config,
            tracer: None,
            provider: None,
        }
    }

    /// Store id from the config.
    pub fn store_id(&self) -> Option<&str> {
        self.inner.config.store_id.as_deref()
    }

    /// Auth host in use.
    pub fn oauth_endpoint(&self) -> &str {
        &self.inner.oauth_endpoint
    }

    /// Business API host in use.
    pub fn open_endpoint(&self) -> &str {
        &self.inner.open_endpoint
    }

    /// Build a business API url, e.g. `open_url("v3/payment/online")`.
    pub fn open_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.inner.open_endpoint,
            path.trim_start_matches('/')
        )
    }

    /// Public key of the gateway, if configured.
    pub fn public_key(&self) -> Option<&PublicKey> {
        self.inner.public_key.as_ref()
    }

    /// Swap the token provider, the cached token is dropped.
    pub async fn set_token_provider(&self, provider: impl ProvideToken) {
        self.inner.tokens.set_provider(provider).await
    }

    /// Drop the cached token so the next call fetches a new one.
    pub async fn invalidate_token(&self) {
        self.inner.tokens.invalidate().await
    }

    /// Send `req` and decode the response body into `T`.
    ///
    /// Returns `Ok(None)` for `204 No Content`.
    pub async fn execute<T: DeserializeOwned>(&self, req: Request) -> Result<Option<T>> {
        self.run(req, |url, body| {
            serde_json::from_slice(&body).map_err(|e| {
                Error::decoding_failed(format!("failed to decode response from {url}"))
                    .with_source(e)
            })
        })
        .await
    }

    /// Send `req` and return the raw response body.
    ///
    /// Returns `Ok(None)` for `204 No Content`.
    pub async fn execute_raw(&self, req: Request) -> Result<Option<Bytes>> {
        self.run(req, |_, body| Ok(body)).await
    }

    async fn run<T>(
        &self,
        req: Request,
        decode: impl FnOnce(&str, Bytes) -> Result<T>,
    ) -> Result<Option<T>> {
        let mut span = ActiveSpan::start(
            self.inner.tracer.as_ref(),
            &req.operation,
            req.parent.as_ref(),
        );

        let canceled = async {
            match &req.cancel {
                Some(token) => token.cancelled().await,
                None => pending().await,
            }
        };
        let deadline = async {
            match req.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => pending().await,
            }
        };

        let result = tokio::select! {
            res = self.send(&req, &mut span) => res,
            _ = canceled => Err(Error::canceled(format!("{} canceled", req.operation))),
            _ = deadline => Err(Error::canceled(format!(
                "{} timed out after {:?}",
                req.operation,
                req.timeout.unwrap_or_default()
            ))),
        };
        let result = result.and_then(|body| body.map(|v| decode(&req.endpoint, v)).transpose());

        if let Err(err) = &result {
            debug!("{} {} failed: {err}", req.method, req.endpoint);
            span.set_error(err);
        }
        result
    }

    async fn send(&self, req: &Request, span: &mut ActiveSpan) -> Result<Option<Bytes>> {
        let uri: Uri = req.endpoint.parse()?;
        span.set_tag(TAG_COMPONENT, COMPONENT);
        span.set_tag(TAG_HTTP_URL, &req.endpoint);
        span.set_tag(TAG_HTTP_METHOD, req.method.as_str());

        let body = match &req.body {
            None => None,
            Some(Body::Json(value)) => canonicalize_value(value)?,
            Some(Body::Raw(raw)) => canonicalize(raw)?,
        };
        if let Some(body) = &body {
            debug!("{} canonical body sha256={}", req.operation, hex_sha256(body));
            self.record_body(span, FIELD_REQUEST_BODY, body);
        }

        let token = self.inner.tokens.token().await?;

        let material = SigningMaterial {
            data: body.as_deref().map(base64_encode),
            method: req.method.as_str().to_lowercase(),
            nonce_str: random_nonce(NONCE_LENGTH),
            request_url: req.endpoint.clone(),
            sign_type: SignType::Sha256,
            timestamp: unix_seconds(now()),
        };
        let signature = material.sign(&self.inner.private_key)?;

        let mut authorization = HeaderValue::try_from(format!("Bearer {}", token.access_token))
            .map_err(|e| {
                Error::auth_failed("access token is not a valid header value").with_source(e)
            })?;
        authorization.set_sensitive(true);

        let http_req = http::Request::builder()
            .method(req.method.clone())
            .uri(uri)
            .header(ACCEPT, CONTENT_TYPE_JSON)
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .header(AUTHORIZATION, authorization)
            .header(X_NONCE_STR, &material.nonce_str)
            .header(
                X_SIGNATURE,
                format!("{} {signature}", material.sign_type.as_str()),
            )
            .header(X_TIMESTAMP, &material.timestamp)
            .body(body.clone().map(Bytes::from).unwrap_or_default())?;

        debug!("sending {} {}", req.method, req.endpoint);
        let resp = self.inner.ctx.http_send(http_req).await?;
        let status = resp.status();
        span.set_tag(TAG_HTTP_STATUS_CODE, status.as_str());
        debug!("{} {} got {status}", req.method, req.endpoint);

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let resp_body = resp.into_body();
        self.record_body(span, FIELD_RESPONSE_BODY, &resp_body);

        if status == StatusCode::BAD_GATEWAY {
            return Err(Error::bad_gateway(req.method.as_str(), &req.endpoint));
        }
        if !(200..400).contains(&status.as_u16()) {
            return Err(classify(
                status,
                &req.endpoint,
                body.as_deref(),
                &resp_body,
            ));
        }
        Ok(Some(resp_body))
    }

    fn record_body(&self, span: &mut ActiveSpan, field: &str, body: &[u8]) {
        if self.inner.config.record_bodies {
            span.log_field(field, &String::from_utf8_lossy(body));
        } else {
            span.log_field(field, &format!("<{} bytes>", body.len()));
        }
    }
}
