//! Error types shared by every protocol client.
//!
//! Failures fall into three tiers: transport errors (the HTTP exchange itself
//! failed), engine errors (the server answered but embedded a failure in the
//! payload) and local precondition errors (a file named by the caller could
//! not be read). Output collection has its own error type, wrapped here.

use std::io;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;

use crate::collect::CollectError;

/// Main error type for all client operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The server base URL is not an absolute http(s) URL
    #[error("invalid host URL `{host}`: {reason}")]
    InvalidHost { host: String, reason: String },

    /// The HTTP request could not be sent or its body could not be read
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP status without an engine failure envelope
    #[error("server returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A successful response whose body is not valid JSON
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The engine reported a failure inside the response payload
    #[error("{message}")]
    Engine { message: String },

    /// The response lacks the field the operation returns
    #[error("response is missing the `{field}` field")]
    MissingField { field: &'static str },

    /// The response field is present but has an unexpected shape
    #[error("unexpected shape for `{field}` in response: {source}")]
    UnexpectedShape {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A local file referenced by the request could not be read
    #[error("failed to read {}: {source}", path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A local file that must hold JSON does not
    #[error("invalid JSON in {}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Output collection stopped
    #[error(transparent)]
    Collect(#[from] CollectError),
}

impl Error {
    /// Create an engine error from the envelope's message, if any.
    pub fn engine(message: Option<&str>, status: &str) -> Self {
        let message = match message {
            Some(m) => m.to_string(),
            None => format!("engine reported status `{}`", status),
        };
        Error::Engine { message }
    }

    /// Network or HTTP-level failure.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::InvalidHost { .. }
                | Error::Transport { .. }
                | Error::Http { .. }
                | Error::Decode { .. }
        )
    }

    /// Failure reported by the engine in a well-formed response.
    pub fn is_engine(&self) -> bool {
        matches!(self, Error::Engine { .. })
    }

    /// A local file could not be used; no request was sent.
    pub fn is_local(&self) -> bool {
        matches!(self, Error::LocalFile { .. } | Error::InvalidJson { .. })
    }
}

/// Result type for client operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Check a decoded body for the conventional failure envelope.
///
/// Only an object whose `status` is the string `fail` or `error` is a failure.
/// A body without a `status` field is a success.
pub fn check_envelope(body: &Value) -> Result<()> {
    let Some(status) = body.get("status").and_then(Value::as_str) else {
        return Ok(());
    };

    if status == "fail" || status == "error" {
        let message = body.get("message").and_then(Value::as_str);
        return Err(Error::engine(message, status));
    }

    Ok(())
}

/// Extension trait attaching the offending path to local IO errors
pub trait IntoLocalError<T> {
    fn local_context(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IntoLocalError<T> for std::result::Result<T, io::Error> {
    fn local_context(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::LocalFile {
            path: path.into(),
            source,
        })
    }
}
