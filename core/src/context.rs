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

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;

use crate::{Error, Result};

/// Context carries the I/O a gateway client needs.
///
/// Token providers use it for the token exchange, config loading uses it for
/// env values and PEM files, and the transport pipeline sends every signed
/// call through it. Core ships no real I/O: every slot starts as a noop that
/// fails or returns nothing until replaced.
///
/// ```
/// use paysign_core::{Context, OsEnv};
///
/// let ctx = Context::new().with_env(OsEnv);
/// assert_eq!(ctx.expand_home_dir("/etc/key.pem").as_deref(), Some("/etc/key.pem"));
/// ```
#[derive(Clone)]
pub struct Context {
    file_read: Arc<dyn FileRead>,
    http_send: Arc<dyn HttpSend>,
    env: Arc<dyn Env>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("file_read", &self.file_read)
            .field("http_send", &self.http_send)
            .field("env", &self.env)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a context where every capability is a noop.
    pub fn new() -> Self {
        Self {
            file_read: Arc::new(NoopFileRead),
            http_send: Arc::new(NoopHttpSend),
            env: Arc::new(NoopEnv),
        }
    }

    /// Read key files with `file_read`.
    pub fn with_file_read(mut self, file_read: impl FileRead) -> Self {
        self.file_read = Arc::new(file_read);
        self
    }

    /// Send token exchanges and gateway calls with `http_send`.
    pub fn with_http_send(mut self, http_send: impl HttpSend) -> Self {
        self.http_send = Arc::new(http_send);
        self
    }

    /// Look up env values and the home dir in `env`.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Read a whole file.
    #[inline]
    pub async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        self.file_read.file_read(path).await
    }

    /// Read a whole file as text, invalid utf-8 is replaced.
    pub async fn file_read_as_string(&self, path: &str) -> Result<String> {
        let content = self.file_read(path).await?;
        Ok(String::from_utf8_lossy(&content).into_owned())
    }

    /// Send `req` and collect the full response.
    #[inline]
    pub async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.http_send.http_send(req).await
    }

    /// Home dir of the current user.
    #[inline]
    pub fn home_dir(&self) -> Option<PathBuf> {
        self.env.home_dir()
    }

    /// Replace a leading `~` in a key path with the home dir.
    ///
    /// Paths without a leading `~/` or `~\\` are returned as is. Returns
    /// `None` when the path needs the home dir and there is none.
    pub fn expand_home_dir(&self, path: &str) -> Option<String> {
        if !(path.starts_with("~/") || path.starts_with("~\\")) {
            return Some(path.to_string());
        }
        let home = self.home_dir()?;
        Some(path.replacen('~', &home.to_string_lossy(), 1))
    }

    /// Value of the env variable `key`.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }
}

/// FileRead loads files, PEM keys in practice.
#[async_trait::async_trait]
pub trait FileRead: Debug + Send + Sync + 'static {
    /// Read the whole file at `path`.
    async fn file_read(&self, path: &str) -> Result<Vec<u8>>;
}

/// HttpSend performs one HTTP exchange, both for token exchange and for the
/// signed business calls.
///
/// Implementations return the raw status and body bytes, the pipeline does
/// its own routing and decoding.
#[async_trait::async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send `req` and collect the full response.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// Env answers the lookups gateway configs make: single variables and the
/// home dir used to expand key paths.
pub trait Env: Debug + Send + Sync + 'static {
    /// Value of `key`, `None` if unset or not valid utf-8.
    fn var(&self, key: &str) -> Option<String>;

    /// Home dir of the current user, `None` if it can't be determined.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// OsEnv reads the process environment.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        home::home_dir()
    }
}

/// StaticEnv serves a fixed set of values, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    /// Home dir to report.
    pub home_dir: Option<PathBuf>,
    /// Env values to serve.
    pub envs: HashMap<String, String>,
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home_dir.clone()
    }
}

/// NoopFileRead fails every read.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFileRead;

#[async_trait::async_trait]
impl FileRead for NoopFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        Err(Error::unexpected(format!(
            "can't read {path}: context has no file reader"
        )))
    }
}

/// NoopHttpSend fails every request with a transport error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpSend;

#[async_trait::async_trait]
impl HttpSend for NoopHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Err(Error::transport(format!(
            "can't send {} {}: context has no http client",
            req.method(),
            req.uri()
        )))
    }
}

/// NoopEnv has no variables and no home dir.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _: &str) -> Option<String> {
        None
    }

    fn home_dir(&self) -> Option<PathBuf> {
        None
    }
}
