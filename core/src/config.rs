//! Client construction parameters.

use std::path::PathBuf;

use serde::Deserialize;

/// Where to send requests and which certificate to present.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Host, optionally with `:port`. The scheme is always `https`; a trailing
    /// `/` is ignored when URLs are built.
    pub host: String,
    /// Proxy or user certificate file holding both certificate and key.
    pub certificate_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            certificate_path: None,
        }
    }
}

impl ClientConfig {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
            certificate_path: None,
        }
    }

    pub fn with_certificate(mut self, path: impl Into<PathBuf>) -> Self {
        self.certificate_path = Some(path.into());
        self
    }
}
