//! Transports perform a single HTTP exchange for `RestClient`.
//!
//! # Design
//! A transport never interprets the status code: 4xx and 5xx come back as
//! `HttpResponse` values and classification stays with the client. The
//! credentials travel with each exchange, but `UreqTransport` builds its
//! agent only once, on the first exchange, and reuses it afterwards.

use std::path::PathBuf;

use ureq::http::Response;
use ureq::{Agent, Body};

use crate::error::TransportError;
use crate::http::{form_pairs, HttpMethod, HttpRequest, HttpResponse};
use crate::tls;

/// Certificate material for one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Proxy or user certificate file, used as both certificate and key.
    pub certificate: Option<PathBuf>,
    /// Directory of trusted CA certificates.
    pub ca_dir: PathBuf,
}

/// Performs one request/response exchange.
pub trait Transport {
    fn exchange(
        &mut self,
        request: &HttpRequest,
        credentials: &Credentials,
    ) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a ureq agent with rustls.
///
/// The agent is built from the credentials of the first exchange and kept for
/// the life of the transport; later credentials do not rebuild it.
#[derive(Debug, Default)]
pub struct UreqTransport {
    agent: Option<Agent>,
    /// CA directory the agent was built from; `None` for injected agents.
    ca_dir: Option<PathBuf>,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            agent: None,
            ca_dir: None,
        }
    }

    /// Use a preconfigured agent instead of building one from the
    /// credentials. The agent should have `http_status_as_error(false)`.
    pub fn with_agent(agent: Agent) -> Self {
        Self {
            agent: Some(agent),
            ca_dir: None,
        }
    }

    fn agent(&mut self, credentials: &Credentials) -> Result<&Agent, TransportError> {
        let agent = match self.agent.take() {
            Some(agent) => {
                if let Some(built_with) = self.ca_dir.as_ref().filter(|dir| **dir != credentials.ca_dir) {
                    tracing::debug!(
                        built_with = %built_with.display(),
                        requested = %credentials.ca_dir.display(),
                        "CA directory changed; keeping the existing agent"
                    );
                }
                agent
            }
            None => {
                let tls = tls::tls_config(credentials.certificate.as_deref(), &credentials.ca_dir)?;
                self.ca_dir = Some(credentials.ca_dir.clone());
                Agent::config_builder()
                    .http_status_as_error(false)
                    .tls_config(tls)
                    .build()
                    .new_agent()
            }
        };
        Ok(&*self.agent.insert(agent))
    }
}

impl Transport for UreqTransport {
    fn exchange(
        &mut self,
        request: &HttpRequest,
        credentials: &Credentials,
    ) -> Result<HttpResponse, TransportError> {
        let agent = self.agent(credentials)?;
        let pairs = form_pairs(&request.payload);
        let url = request.url.as_str();

        let response = match request.method {
            HttpMethod::Get => with_headers(agent.get(url), &request.headers).query_pairs(pairs).call(),
            HttpMethod::Delete => with_headers(agent.delete(url), &request.headers).query_pairs(pairs).call(),
            HttpMethod::Post => with_headers(agent.post(url), &request.headers).send_form(pairs),
            HttpMethod::Put => with_headers(agent.put(url), &request.headers).send_form(pairs),
        }?;

        into_http_response(response)
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn into_http_response(mut response: Response<Body>) -> Result<HttpResponse, TransportError> {
    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    // No size cap: the body is handed back exactly as received.
    let body = response.body_mut().with_config().limit(u64::MAX).read_to_vec()?;

    Ok(HttpResponse {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or_default().to_string(),
        headers,
        body,
    })
}
