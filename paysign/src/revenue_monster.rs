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

//! Revenue Monster support with convenience APIs.

pub use paysign_revenue_monster::*;

#[cfg(feature = "default-context")]
use crate::{default_context, Result};

/// Build a client with the default context.
///
/// Unset fields of `config` are loaded from `REVENUE_MONSTER_*` env values.
///
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> paysign_core::Result<()> {
/// let config = paysign::revenue_monster::Config::new().with_store_id("store-1");
/// let client = paysign::revenue_monster::default_client(config).await?;
/// assert_eq!(client.store_id(), Some("store-1"));
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub async fn default_client(config: Config) -> Result<Client> {
    let ctx = default_context();
    let config = config.from_env(&ctx);
    Client::builder(config).build(ctx).await
}
