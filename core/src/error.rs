//! Error types for the REST client.
//!
//! # Design
//! Missing environment setup, server-side failures, and transport failures
//! are separate types so callers can tell "fix your shell" apart from "the
//! server said no". `RequestError` keeps the whole exchange (payload,
//! headers, URL, raw body, status, reason) so a caller can log or re-render
//! the failure without rebuilding any of it.

use std::path::PathBuf;

use thiserror::Error;

use crate::http::Payload;

/// Required environment configuration is absent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    #[error("The {name} variable is not set. {hint}")]
    MissingVariable { name: &'static str, hint: &'static str },
}

/// The server answered with a status of 400 or above.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("HTTP {status} {reason} from {url}")]
pub struct RequestError {
    pub payload: Payload,
    pub request_headers: Vec<(String, String)>,
    pub url: String,
    /// Response body exactly as received; never decoded.
    pub raw_body: Vec<u8>,
    pub status: u16,
    pub reason: String,
    pub response_headers: Vec<(String, String)>,
}

impl RequestError {
    /// Body as text, for logging. Invalid UTF-8 is replaced.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.raw_body).into_owned()
    }
}

/// Failures below HTTP status handling: certificates and the network.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid certificate material in {path}: {reason}")]
    Certificate { path: PathBuf, reason: String },

    #[error("no CA certificates found in {0}")]
    NoCaCertificates(PathBuf),

    #[error("transport error: {0}")]
    Http(#[from] ureq::Error),
}

/// Everything a verb call on `RestClient` can fail with.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Request(Box<RequestError>),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to decode JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<RequestError> for ClientError {
    fn from(err: RequestError) -> Self {
        ClientError::Request(Box::new(err))
    }
}

impl ClientError {
    /// The server-side failure, if this is one.
    pub fn as_request(&self) -> Option<&RequestError> {
        match self {
            ClientError::Request(err) => Some(err),
            _ => None,
        }
    }
}
