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

//! Revenue Monster open API client for paysign.
//!
//! This crate sends requests to the Revenue Monster payment gateway. Every
//! call is canonicalized, signed with the merchant's RSA key and carries a
//! bearer token that is fetched and refreshed transparently.
//!
//! ## Quick Start
//!
//! ```no_run
//! use paysign_core::{Context, OsEnv, Result};
//! use paysign_http_send_reqwest::ReqwestHttpSend;
//! use paysign_revenue_monster::{Client, Config, Request};
//! use serde_json::{json, Value};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     let config = Config::new().with_sandbox(true).from_env(&ctx);
//!     let client = Client::builder(config).build(ctx).await?;
//!
//!     let req = Request::new(
//!         "create_online_payment",
//!         http::Method::POST,
//!         client.open_url("v3/payment/online"),
//!     )
//!     .with_json(json!({
//!         "storeId": client.store_id().unwrap_or_default(),
//!         "order": {"id": "1", "amount": 100, "currencyType": "MYR"}
//!     }));
//!
//!     let resp: Option<Value> = client.execute(req).await?;
//!     println!("{resp:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Credential Sources
//!
//! ### Environment Variables
//!
//! ```bash
//! export REVENUE_MONSTER_CLIENT_ID=your-client-id
//! export REVENUE_MONSTER_CLIENT_SECRET=your-client-secret
//! export REVENUE_MONSTER_PRIVATE_KEY_PATH=~/.revenue-monster/private_key.pem
//! export REVENUE_MONSTER_STORE_ID=your-store-id
//! export REVENUE_MONSTER_SANDBOX=true
//! ```
//!
//! ### Custom Token Provider
//!
//! Tokens can be supplied by any [`ProvideToken`](paysign_core::ProvideToken)
//! through [`ClientBuilder::with_token_provider`], and swapped at runtime via
//! [`Client::set_token_provider`].
//!
//! ## Errors
//!
//! Failures are returned as [`paysign_core::Error`]. Gateway errors carry a
//! structured [`ApiError`](paysign_core::ApiError), see [`classify`].

mod constants;
pub use constants::RESPONSE_SUCCESS;

mod config;
pub use config::Config;

mod classify;
pub use classify::classify;

mod request;
pub use request::{Body, Request};

mod client;
pub use client::{Client, ClientBuilder};

mod provide_token;
pub use provide_token::*;
