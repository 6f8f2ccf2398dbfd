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
use paysign_core::{Context, ProvideToken, Result, Token};

/// StaticTokenProvider always hands out the same token.
///
/// Use it when tokens are managed by an external token service and injected
/// into the process, or in tests.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: Token,
}

impl StaticTokenProvider {
    /// Create a provider for an access token that never expires.
    pub fn new(access_token: &str) -> Self {
        Self {
            token: Token::new(access_token),
        }
    }

    /// Create a provider from a full token.
    pub fn from_token(token: Token) -> Self {
        Self { token }
    }
}

#[async_trait]
impl ProvideToken for StaticTokenProvider {
    async fn provide_token(&self, _: &Context) -> Result<Token> {
        Ok(self.token.clone())
    }
}
