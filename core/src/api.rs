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

use crate::{Context, Result, Token};
use std::fmt::Debug;

/// ProvideToken is the capability of supplying bearer tokens for the gateway.
///
/// The transport pipeline depends on this trait only: the OAuth2
/// client-credentials exchange is one implementation, a token handed out by
/// an external token service is another.
///
/// Implementations don't need to cache, [`TokenSource`](crate::TokenSource)
/// does that for them.
#[async_trait::async_trait]
pub trait ProvideToken: Debug + Send + Sync + 'static {
    /// Acquire a fresh token.
    async fn provide_token(&self, ctx: &Context) -> Result<Token>;
}
