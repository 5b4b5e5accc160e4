//! Authenticated REST client for grid services.
//!
//! # Design
//! `RestClient` owns its configuration, one transport and one CA-path
//! resolver. Every verb goes through `request`: build headers, escape the
//! path, assemble the URL, resolve credentials, exchange, then classify. A
//! status of 400 or above becomes a `RequestError` carrying the raw body;
//! anything below is decoded as JSON. Verb methods take `&mut self`, so one
//! client serves one caller at a time.

use serde_json::Value;

use crate::cert::{CaPathResolver, EnvCaPath};
use crate::config::ClientConfig;
use crate::error::{ClientError, RequestError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Payload};
use crate::transport::{Credentials, Transport, UreqTransport};

/// Sent as the `User-Agent` header on every request.
pub const USER_AGENT: &str = concat!("gridrest/", env!("CARGO_PKG_VERSION"));

/// A decoded successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub body: Value,
    pub status: u16,
    pub reason: String,
}

/// Issues REST calls to a single host.
#[derive(Debug)]
pub struct RestClient<T = UreqTransport, R = EnvCaPath> {
    config: ClientConfig,
    transport: T,
    resolver: R,
}

impl RestClient {
    /// Client using ureq over mutual TLS, with the CA directory taken from
    /// `X509_CERT_DIR`.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_parts(config, UreqTransport::new(), EnvCaPath)
    }
}

impl<T: Transport, R: CaPathResolver> RestClient<T, R> {
    pub fn with_parts(config: ClientConfig, transport: T, resolver: R) -> Self {
        Self {
            config,
            transport,
            resolver,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn get(&mut self, path: &str, data: &Payload) -> Result<Response, ClientError> {
        self.request(path, data, HttpMethod::Get)
    }

    pub fn post(&mut self, path: &str, data: &Payload) -> Result<Response, ClientError> {
        self.request(path, data, HttpMethod::Post)
    }

    pub fn put(&mut self, path: &str, data: &Payload) -> Result<Response, ClientError> {
        self.request(path, data, HttpMethod::Put)
    }

    /// Be careful: the server acts on this.
    pub fn delete(&mut self, path: &str, data: &Payload) -> Result<Response, ClientError> {
        self.request(path, data, HttpMethod::Delete)
    }

    /// Run the full pipeline for one request.
    pub fn request(
        &mut self,
        path: &str,
        data: &Payload,
        method: HttpMethod,
    ) -> Result<Response, ClientError> {
        let headers = request_headers();
        let escaped = escape_path(path);
        let request = HttpRequest {
            method,
            url: self.build_url(&escaped),
            headers,
            payload: data.clone(),
        };

        let credentials = Credentials {
            certificate: self.config.certificate_path.clone(),
            ca_dir: self.resolver.ca_dir()?,
        };

        tracing::debug!(method = %method, url = %request.url, "sending request");
        let response = self.transport.exchange(&request, &credentials)?;
        tracing::debug!(status = response.status, url = %request.url, "received response");

        if response.status >= 400 {
            return Err(self.request_error(request, &escaped, response).into());
        }

        Ok(Response {
            body: self.decode(&response.body)?,
            status: response.status,
            reason: response.reason,
        })
    }

    /// Decode a response body as JSON.
    pub fn decode(&self, body: &[u8]) -> Result<Value, ClientError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Absolute URL for an already-escaped path.
    pub fn build_url(&self, escaped_path: &str) -> String {
        format!("https://{}{escaped_path}", self.config.host.trim_end_matches('/'))
    }

    fn request_error(&self, request: HttpRequest, escaped_path: &str, response: HttpResponse) -> RequestError {
        RequestError {
            payload: request.payload,
            request_headers: request.headers,
            url: self.build_url(escaped_path),
            raw_body: response.body,
            status: response.status,
            reason: response.reason,
            response_headers: response.headers,
        }
    }
}

fn request_headers() -> Vec<(String, String)> {
    vec![
        ("User-Agent".to_string(), USER_AGENT.to_string()),
        ("Accept".to_string(), "*/*".to_string()),
    ]
}

/// Percent-encode each `/`-separated segment of `path`, keeping the slashes.
///
/// Request names end up in paths and may contain spaces.
pub fn escape_path(path: &str) -> String {
    path.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}
