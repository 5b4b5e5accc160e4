//! Synchronous REST client for grid services authenticated with X.509 proxies.
//!
//! # Overview
//! `RestClient` sends GET/POST/PUT/DELETE requests to `https://<host><path>`
//! over mutual TLS, classifies the status, and decodes successful bodies as
//! JSON. Failures come back as typed errors: missing environment setup,
//! server-side errors with the full exchange attached, or transport errors.
//!
//! # Design
//! - The HTTP round-trip sits behind the `Transport` trait; `UreqTransport`
//!   is the production implementation.
//! - The CA directory comes from a `CaPathResolver`; `EnvCaPath` reads
//!   `X509_CERT_DIR`.
//! - Response bodies stay raw bytes until classification, so errors carry
//!   exactly what the server sent.

pub mod cert;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod tls;
pub mod transport;

pub use cert::{CaPathResolver, EnvCaPath, FixedCaPath, CA_DIR_ENV};
pub use client::{escape_path, Response, RestClient, USER_AGENT};
pub use config::ClientConfig;
pub use error::{ClientError, EnvironmentError, RequestError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Payload};
pub use transport::{Credentials, Transport, UreqTransport};
