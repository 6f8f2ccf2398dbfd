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

//! Core components for signing payment gateway requests.
//!
//! This crate provides the foundational types and traits for the paysign ecosystem.
//! Service crates build their transport pipeline out of these pieces.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for file reading, HTTP sending, and environment access
//! - **Canonicalizer**: [`canonical`] renders a request body into deterministic bytes
//! - **Signer**: [`sign`] produces RSA PKCS#1 v1.5 signatures over a [`SigningMaterial`]
//! - **Tokens**: [`ProvideToken`] supplies bearer tokens, [`TokenSource`] caches and refreshes them
//! - **Tracing**: [`Tracer`] and [`Span`] are the hooks the pipeline reports to
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use paysign_core::{Context, ProvideToken, Result, Token, TokenSource};
//!
//! #[derive(Debug)]
//! struct MyProvider;
//!
//! #[async_trait]
//! impl ProvideToken for MyProvider {
//!     async fn provide_token(&self, ctx: &Context) -> Result<Token> {
//!         let token = ctx.env_var("MY_GATEWAY_TOKEN").unwrap_or_default();
//!         Ok(Token::new(token))
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let source = TokenSource::new(Context::default(), MyProvider);
//! let token = source.token().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Base64 and hashing utilities
//! - [`time`]: Time utilities
//! - [`utils`]: Nonce generation and data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod canonical;
pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{
    Context, Env, FileRead, HttpSend, NoopEnv, NoopFileRead, NoopHttpSend, OsEnv, StaticEnv,
};

mod error;
pub use error::{ApiError, ApiErrorKind, Error, ErrorKind, Result};

mod api;
pub use api::ProvideToken;
mod token;
pub use token::{Token, TokenSource};

mod sign;
pub use sign::{sign, PrivateKey, PublicKey, SignType, SigningMaterial};

mod trace;
pub use trace::{ActiveSpan, LogTracer, NoopTracer, Span, SpanContext, Tracer};
