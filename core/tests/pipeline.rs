//! Request pipeline checks against an in-memory transport.
//!
//! The transport records every request it receives and replies with a
//! scripted response, so URL building, escaping, status classification and
//! decoding can be verified without a network.

use std::path::PathBuf;

use gridrest_core::{
    CaPathResolver, ClientConfig, ClientError, Credentials, EnvironmentError, FixedCaPath, HttpMethod,
    HttpRequest, HttpResponse, Payload, RestClient, Transport, TransportError, CA_DIR_ENV, USER_AGENT,
};
use serde_json::{json, Value};

struct Recording {
    reply: HttpResponse,
    requests: Vec<(HttpRequest, Credentials)>,
}

impl Transport for Recording {
    fn exchange(
        &mut self,
        request: &HttpRequest,
        credentials: &Credentials,
    ) -> Result<HttpResponse, TransportError> {
        self.requests.push((request.clone(), credentials.clone()));
        Ok(self.reply.clone())
    }
}

/// Behaves like `X509_CERT_DIR` being unset.
struct Unset;

impl CaPathResolver for Unset {
    fn ca_dir(&self) -> Result<PathBuf, EnvironmentError> {
        Err(EnvironmentError::MissingVariable {
            name: CA_DIR_ENV,
            hint: "Did you forget to source the grid environment before running?",
        })
    }
}

const CA_DIR: &str = "/etc/grid-security/certificates";
const PROXY: &str = "/tmp/x509up_u1000";

fn reply(status: u16, reason: &str, body: &[u8]) -> HttpResponse {
    HttpResponse {
        status,
        reason: reason.to_string(),
        headers: vec![("content-type".to_string(), "text/plain".to_string())],
        body: body.to_vec(),
    }
}

fn recording(response: HttpResponse) -> Recording {
    Recording {
        reply: response,
        requests: Vec::new(),
    }
}

fn client(response: HttpResponse) -> RestClient<Recording, FixedCaPath> {
    RestClient::with_parts(
        ClientConfig::new("cmsweb.cern.ch").with_certificate(PROXY),
        recording(response),
        FixedCaPath(PathBuf::from(CA_DIR)),
    )
}

fn payload(value: Value) -> Payload {
    value.as_object().cloned().unwrap()
}

fn sent(c: &RestClient<Recording, FixedCaPath>) -> &(HttpRequest, Credentials) {
    c.transport().requests.last().expect("no request sent")
}

// ---------------------------------------------------------------------------
// Success path
// ---------------------------------------------------------------------------

#[test]
fn get_info_returns_decoded_body_status_and_reason() {
    let mut c = client(reply(200, "OK", br#"{"result":["ok"]}"#));
    let response = c.get("/info", &Payload::new()).unwrap();

    assert_eq!(response.body, json!({"result": ["ok"]}));
    assert_eq!(response.status, 200);
    assert_eq!(response.reason, "OK");
}

#[test]
fn representative_json_bodies_decode_to_what_was_encoded() {
    let values = [
        json!({"result": [{"taskname": "150101_120000:user_crab_test", "status": "SUBMITTED"}]}),
        json!([1, 2, 3]),
        json!("100% done %20 literally"),
        json!({}),
    ];
    for value in values {
        let body = serde_json::to_vec(&value).unwrap();
        let mut c = client(reply(201, "Created", &body));
        let response = c.post("/task", &Payload::new()).unwrap();
        assert_eq!(response.body, value);
        assert_eq!(response.status, 201);
        assert_eq!(response.reason, "Created");
    }
}

// ---------------------------------------------------------------------------
// Request construction
// ---------------------------------------------------------------------------

#[test]
fn request_carries_headers_payload_and_credentials() {
    let mut c = client(reply(200, "OK", b"{}"));
    let data = payload(json!({"workflow": "150101_a", "limit": 5}));
    c.put("/rest/task", &data).unwrap();

    let (request, credentials) = sent(&c);
    assert_eq!(request.method, HttpMethod::Put);
    assert_eq!(request.url, "https://cmsweb.cern.ch/rest/task");
    assert_eq!(request.payload, data);
    assert!(request
        .headers
        .contains(&("User-Agent".to_string(), USER_AGENT.to_string())));
    assert!(request.headers.contains(&("Accept".to_string(), "*/*".to_string())));
    assert_eq!(credentials.certificate, Some(PathBuf::from(PROXY)));
    assert_eq!(credentials.ca_dir, PathBuf::from(CA_DIR));
}

#[test]
fn path_with_space_produces_url_without_space() {
    let mut c = client(reply(200, "OK", b"{}"));
    c.get("/rest/workflow/My Task", &Payload::new()).unwrap();

    let (request, _) = sent(&c);
    assert!(!request.url.contains(' '));
    assert_eq!(request.url, "https://cmsweb.cern.ch/rest/workflow/My%20Task");
}

#[test]
fn delete_escapes_request_name_in_path() {
    let mut c = client(reply(200, "OK", b"{}"));
    c.delete("/task/My Job", &Payload::new()).unwrap();

    let (request, _) = sent(&c);
    assert_eq!(request.method, HttpMethod::Delete);
    assert!(request.url.ends_with("/task/My%20Job"));
}

#[test]
fn certificate_path_is_the_same_for_every_request() {
    let mut c = client(reply(200, "OK", b"{}"));
    for path in ["/a", "/b", "/c"] {
        c.get(path, &Payload::new()).unwrap();
    }
    let certificates: Vec<_> = c
        .transport()
        .requests
        .iter()
        .map(|(_, creds)| creds.certificate.clone())
        .collect();
    assert_eq!(certificates, vec![Some(PathBuf::from(PROXY)); 3]);
}

#[test]
fn client_without_certificate_sends_none() {
    let mut c = RestClient::with_parts(
        ClientConfig::default(),
        recording(reply(200, "OK", b"{}")),
        FixedCaPath(PathBuf::from(CA_DIR)),
    );
    c.get("/info", &Payload::new()).unwrap();

    let (request, credentials) = c.transport().requests.last().unwrap();
    assert_eq!(request.url, "https://localhost/info");
    assert!(credentials.certificate.is_none());
}

// ---------------------------------------------------------------------------
// Error path
// ---------------------------------------------------------------------------

#[test]
fn post_not_found_is_a_request_error() {
    let mut c = client(reply(404, "Not Found", b"no such task"));
    let data = payload(json!({"name": "x"}));
    let err = c.post("/task", &data).unwrap_err();

    let err = match err {
        ClientError::Request(err) => err,
        other => panic!("expected RequestError, got {other:?}"),
    };
    assert_eq!(err.status, 404);
    assert_eq!(err.reason, "Not Found");
    assert!(err.url.ends_with("/task"));
    assert_eq!(err.url, "https://cmsweb.cern.ch/task");
    assert_eq!(err.payload, data);
    assert!(err
        .request_headers
        .contains(&("Accept".to_string(), "*/*".to_string())));
    assert_eq!(
        err.response_headers,
        vec![("content-type".to_string(), "text/plain".to_string())]
    );
}

#[test]
fn every_error_status_keeps_the_raw_body_for_every_verb() {
    let body: &[u8] = b"{\"truncated\": \xff";
    for status in [400, 401, 403, 404, 409, 500, 502, 503] {
        for method in [HttpMethod::Get, HttpMethod::Post, HttpMethod::Put, HttpMethod::Delete] {
            let mut c = client(reply(status, "Error", body));
            let err = c.request("/task/My Job", &Payload::new(), method).unwrap_err();
            let err = err.as_request().expect("expected RequestError");
            assert_eq!(err.status, status);
            assert_eq!(err.raw_body, body);
            assert_eq!(err.url, "https://cmsweb.cern.ch/task/My%20Job");
        }
    }
}

#[test]
fn status_399_is_still_decoded() {
    let mut c = client(reply(399, "", b"[]"));
    let response = c.get("/info", &Payload::new()).unwrap();
    assert_eq!(response.status, 399);
    assert_eq!(response.body, json!([]));
}

#[test]
fn missing_ca_directory_fails_before_any_exchange() {
    let mut c = RestClient::with_parts(
        ClientConfig::new("cmsweb.cern.ch"),
        recording(reply(200, "OK", b"{}")),
        Unset,
    );
    let err = c.get("/info", &Payload::new()).unwrap_err();

    assert!(matches!(
        err,
        ClientError::Environment(EnvironmentError::MissingVariable { name: CA_DIR_ENV, .. })
    ));
    assert!(c.transport().requests.is_empty());
}
