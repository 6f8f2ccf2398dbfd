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

//! Signed, token-authenticated requests to payment gateway APIs.
//!
//! This crate re-exports [`paysign_core`] and the gateway crates behind
//! features, and ships a [`DefaultContext`] wired with Tokio file reading,
//! reqwest and the OS environment.
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> paysign::Result<()> {
//! use paysign::revenue_monster::{Config, Request};
//!
//! let client = paysign::revenue_monster::default_client(Config::new().with_sandbox(true)).await?;
//! let req = Request::new("get_merchant", http::Method::GET, client.open_url("v3/merchant"));
//! let merchant: Option<serde_json::Value> = client.execute(req).await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use paysign_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::{default_context, DefaultContext};

#[cfg(feature = "revenue-monster")]
pub mod revenue_monster;
