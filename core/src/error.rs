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

use std::fmt;
use thiserror::Error;

/// The error type for paysign operations
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    api: Option<Box<ApiError>>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
///
/// Kinds before [`ErrorKind::Transport`] are raised before any byte hits the
/// network, the rest after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request body is not valid structured data
    EncodingInvalid,

    /// The signing primitive failed
    SigningFailed,

    /// Access token could not be acquired
    AuthFailed,

    /// Configuration error (missing fields, malformed keys)
    ConfigInvalid,

    /// Connection level failure, or an error response we could not parse
    Transport,

    /// The gateway answered with `502 Bad Gateway`
    BadGateway,

    /// The gateway answered with a structured error, see [`Error::api_error`]
    Api,

    /// Response body didn't match the expected shape
    DecodingFailed,

    /// The call was canceled or ran past its deadline
    Canceled,

    /// Anything else
    Unexpected,
}

/// Category of a structured error returned by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The token or signature was rejected.
    Unauthorized,
    /// The request was understood but its content is invalid.
    Validation,
    /// Too many requests.
    RateLimited,
    /// The gateway failed to process a valid request.
    Server,
    /// Not mapped to any of the above.
    Other,
}

/// Structured error returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code of the response.
    pub status: u16,
    /// Classified category.
    pub kind: ApiErrorKind,
    /// Machine readable error code, e.g. `INVALID_REQUEST`.
    pub code: String,
    /// Human readable message.
    pub message: String,
    /// Extra debug information if the gateway sent any.
    pub debug: Option<String>,
    /// URL of the failed request.
    pub url: String,
    /// Body we sent, for diagnostics.
    pub request_body: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) on {}: {}",
            self.code, self.status, self.url, self.message
        )?;
        if let Some(debug) = &self.debug {
            write!(f, " [{debug}]")?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            api: None,
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the structured gateway error, only set for [`ErrorKind::Api`].
    pub fn api_error(&self) -> Option<&ApiError> {
        self.api.as_deref()
    }

    /// Check if this error was raised before the request was sent.
    pub fn is_pre_network(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::EncodingInvalid
                | ErrorKind::SigningFailed
                | ErrorKind::AuthFailed
                | ErrorKind::ConfigInvalid
        )
    }
}

// Convenience constructors
impl Error {
    /// Create an encoding error
    pub fn encoding_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EncodingInvalid, message)
    }

    /// Create a signing error
    pub fn signing_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SigningFailed, message)
    }

    /// Create an auth error
    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthFailed, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Create a bad gateway error
    pub fn bad_gateway(method: &str, url: &str) -> Self {
        Self::new(
            ErrorKind::BadGateway,
            format!("bad gateway on {method}: {url}"),
        )
    }

    /// Create an error from a structured gateway error
    pub fn api(err: ApiError) -> Self {
        Self {
            kind: ErrorKind::Api,
            message: err.to_string(),
            api: Some(Box::new(err)),
            source: None,
        }
    }

    /// Create a decoding error
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DecodingFailed, message)
    }

    /// Create a canceled error
    pub fn canceled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Canceled, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::EncodingInvalid => write!(f, "invalid request body"),
            ErrorKind::SigningFailed => write!(f, "signing failed"),
            ErrorKind::AuthFailed => write!(f, "token acquisition failed"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::BadGateway => write!(f, "bad gateway"),
            ErrorKind::Api => write!(f, "api error"),
            ErrorKind::DecodingFailed => write!(f, "invalid response body"),
            ErrorKind::Canceled => write!(f, "canceled"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::config_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
