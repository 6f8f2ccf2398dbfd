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

use paysign_core::utils::Redact;
use paysign_core::{Context, Error, PrivateKey, PublicKey, Result};

use crate::constants::*;

/// Config carries all the configuration for the Revenue Monster client.
#[derive(Clone)]
pub struct Config {
    /// `client_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REVENUE_MONSTER_CLIENT_ID`]
    pub client_id: Option<String>,
    /// `client_secret` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REVENUE_MONSTER_CLIENT_SECRET`]
    pub client_secret: Option<String>,
    /// PEM encoded RSA private key, loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REVENUE_MONSTER_PRIVATE_KEY`]
    pub private_key: Option<String>,
    /// Path of a PEM file holding the private key, used when `private_key` is not set.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REVENUE_MONSTER_PRIVATE_KEY_PATH`]
    pub private_key_path: Option<String>,
    /// PEM encoded public key of the gateway, reserved for response verification.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REVENUE_MONSTER_PUBLIC_KEY`]
    pub public_key: Option<String>,
    /// Store used by business operations.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REVENUE_MONSTER_STORE_ID`]
    pub store_id: Option<String>,
    /// Use the sandbox hosts.
    ///
    /// - this field if it's `true`
    /// - env value: [`REVENUE_MONSTER_SANDBOX`] set to `true`, `1` or `on`
    pub sandbox: bool,
    /// Override of the auth host.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REVENUE_MONSTER_OAUTH_ENDPOINT`]
    pub oauth_endpoint: Option<String>,
    /// Override of the business API host.
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REVENUE_MONSTER_OPEN_ENDPOINT`]
    pub open_endpoint: Option<String>,
    /// Record request and response bodies on trace spans.
    ///
    /// Bodies may carry customer data. When disabled only their size is recorded.
    pub record_bodies: bool,
}

impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &Redact::from(&self.client_secret))
            .field("private_key", &Redact::from(&self.private_key))
            .field("private_key_path", &self.private_key_path)
            .field("public_key", &self.public_key.is_some())
            .field("store_id", &self.store_id)
            .field("sandbox", &self.sandbox)
            .field("oauth_endpoint", &self.oauth_endpoint)
            .field("open_endpoint", &self.open_endpoint)
            .field("record_bodies", &self.record_bodies)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            private_key: None,
            private_key_path: None,
            public_key: None,
            store_id: None,
            sandbox: false,
            oauth_endpoint: None,
            open_endpoint: None,
            record_bodies: true,
        }
    }
}

impl Config {
    /// Create a config against the production hosts with body recording enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(REVENUE_MONSTER_CLIENT_ID) {
            self.client_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(REVENUE_MONSTER_CLIENT_SECRET) {
            self.client_secret.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(REVENUE_MONSTER_PRIVATE_KEY) {
            self.private_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(REVENUE_MONSTER_PRIVATE_KEY_PATH) {
            self.private_key_path.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(REVENUE_MONSTER_PUBLIC_KEY) {
            self.public_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(REVENUE_MONSTER_STORE_ID) {
            self.store_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(REVENUE_MONSTER_SANDBOX) {
            self.sandbox |= matches!(v.to_lowercase().as_str(), "true" | "1" | "on");
        }
        if let Some(v) = ctx.env_var(REVENUE_MONSTER_OAUTH_ENDPOINT) {
            self.oauth_endpoint.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(REVENUE_MONSTER_OPEN_ENDPOINT) {
            self.open_endpoint.get_or_insert(v);
        }

        self
    }

    /// Set the client id and secret used for the token exchange.
    pub fn with_client_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Set the PEM encoded private key.
    pub fn with_private_key(mut self, pem: impl Into<String>) -> Self {
        self.private_key = Some(pem.into());
        self
    }

    /// Set the store id.
    pub fn with_store_id(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = Some(store_id.into());
        self
    }

    /// Switch to the sandbox hosts.
    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Override both hosts, mostly useful against a mock server.
    pub fn with_endpoints(
        mut self,
        oauth_endpoint: impl Into<String>,
        open_endpoint: impl Into<String>,
    ) -> Self {
        self.oauth_endpoint = Some(oauth_endpoint.into());
        self.open_endpoint = Some(open_endpoint.into());
        self
    }

    /// Enable or disable recording bodies on spans.
    pub fn with_record_bodies(mut self, record: bool) -> Self {
        self.record_bodies = record;
        self
    }

    /// The auth host in use, without trailing slash.
    pub fn resolved_oauth_endpoint(&self) -> String {
        let default = if self.sandbox {
            SANDBOX_OAUTH_ENDPOINT
        } else {
            OAUTH_ENDPOINT
        };
        trim_endpoint(self.oauth_endpoint.as_deref().unwrap_or(default))
    }

    /// The business API host in use, without trailing slash.
    pub fn resolved_open_endpoint(&self) -> String {
        let default = if self.sandbox {
            SANDBOX_OPEN_ENDPOINT
        } else {
            OPEN_ENDPOINT
        };
        trim_endpoint(self.open_endpoint.as_deref().unwrap_or(default))
    }

    /// Load and parse the private key, from `private_key` or `private_key_path`.
    pub async fn load_private_key(&self, ctx: &Context) -> Result<PrivateKey> {
        if let Some(pem) = &self.private_key {
            return PrivateKey::from_pem(pem);
        }

        let Some(path) = &self.private_key_path else {
            return Err(Error::config_invalid(
                "private key is required, set private_key or private_key_path",
            ));
        };
        let path = ctx.expand_home_dir(path).ok_or_else(|| {
            Error::config_invalid(format!("can't expand home dir in private key path {path}"))
        })?;
        let pem = ctx.file_read_as_string(&path).await.map_err(|e| {
            Error::config_invalid(format!("failed to read private key from {path}")).with_source(e)
        })?;
        PrivateKey::from_pem(&pem)
    }

    /// Parse the public key if one is configured.
    pub fn load_public_key(&self) -> Result<Option<PublicKey>> {
        self.public_key
            .as_deref()
            .map(PublicKey::from_pem)
            .transpose()
    }
}

fn trim_endpoint(endpoint: &str) -> String {
    endpoint.trim_end_matches('/').to_string()
}
