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
use std::sync::Arc;

use log::debug;
use tokio::sync::Mutex;

use crate::time::{now, DateTime};
use crate::utils::Redact;
use crate::{Context, Error, ErrorKind, ProvideToken, Result};

/// Token is a bearer token issued by the gateway's auth server.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Token {
    /// The access token sent as `Authorization: Bearer <access_token>`.
    pub access_token: String,
    /// Token type, usually `Bearer`.
    pub token_type: Option<String>,
    /// Refresh token if the auth server returned one.
    pub refresh_token: Option<String>,
    /// Expiration time, `None` means the token never expires.
    pub expires_at: Option<DateTime>,
}

impl Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &Redact::from(&self.access_token))
            .field("token_type", &self.token_type)
            .field("refresh_token", &Redact::from(&self.refresh_token))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Token {
    /// Create a token that never expires.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            ..Default::default()
        }
    }

    /// Set the expiration time.
    pub fn with_expires_at(mut self, expires_at: DateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Check if the token can still be used.
    pub fn is_valid(&self) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        // Take 10s as buffer to avoid using a token that expires in flight.
        match self.expires_at {
            Some(expires_at) => {
                expires_at > now() + chrono::TimeDelta::try_seconds(10).expect("in bounds")
            }
            None => true,
        }
    }
}

struct State {
    provider: Arc<dyn ProvideToken>,
    token: Option<Token>,
}

/// TokenSource caches the token of a [`ProvideToken`] and refreshes it on expiry.
///
/// The cached token and the provider live behind one async mutex. A refresh
/// runs while the lock is held, so concurrent callers wait for the in-flight
/// refresh instead of starting their own, and [`TokenSource::set_provider`]
/// never races an in-flight refresh on the old provider.
pub struct TokenSource {
    ctx: Context,
    state: Mutex<State>,
}

impl Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSource")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}

impl TokenSource {
    /// Create a new token source on top of `provider`.
    pub fn new(ctx: Context, provider: impl ProvideToken) -> Self {
        Self::from_arc(ctx, Arc::new(provider))
    }

    /// Create a new token source from a shared provider.
    pub fn from_arc(ctx: Context, provider: Arc<dyn ProvideToken>) -> Self {
        Self {
            ctx,
            state: Mutex::new(State {
                provider,
                token: None,
            }),
        }
    }

    /// Return a valid token, refreshing it first if needed.
    pub async fn token(&self) -> Result<Token> {
        let mut state = self.state.lock().await;
        if let Some(token) = state.token.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.clone());
        }

        debug!("access token is absent or expired, refreshing");
        let token = state
            .provider
            .provide_token(&self.ctx)
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::AuthFailed => err,
                _ => Error::auth_failed("failed to acquire access token").with_source(err),
            })?;
        if token.access_token.is_empty() {
            return Err(Error::auth_failed("token provider returned an empty token"));
        }

        debug!("access token refreshed: {token:?}");
        state.token = Some(token.clone());
        Ok(token)
    }

    /// Replace the token provider and drop the cached token.
    ///
    /// Waits for any in-flight refresh on the old provider to finish.
    pub async fn set_provider(&self, provider: impl ProvideToken) {
        let mut state = self.state.lock().await;
        state.provider = Arc::new(provider);
        state.token = None;
    }

    /// Drop the cached token, the next call to [`TokenSource::token`] refreshes.
    pub async fn invalidate(&self) {
        self.state.lock().await.token = None;
    }
}
