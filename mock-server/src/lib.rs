//! Stand-in for a grid REST service, served over plain HTTP.
//!
//! - `GET /info` answers `{"result":["ok"]}`.
//! - `/echo/{*path}` answers any verb with a JSON description of the request
//!   as received: method, raw (still percent-encoded) path, query pairs, form
//!   pairs from the body, and the identifying headers.
//! - `/status/{code}` answers any verb with that status and a plain-text body.
//! - `GET /large/{len}` answers with a JSON string of `len` characters.

use axum::{
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// What `/echo` saw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub user_agent: Option<String>,
    pub accept: Option<String>,
}

pub fn app() -> Router {
    Router::new()
        .route("/info", get(info))
        .route("/echo/{*rest}", any(echo))
        .route("/status/{code}", any(status))
        .route("/large/{len}", get(large))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn info() -> Json<Value> {
    Json(json!({"result": ["ok"]}))
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Result<Json<Echo>, StatusCode> {
    let query = parse_pairs(uri.query().unwrap_or_default())?;
    let form = parse_pairs(&body)?;
    tracing::debug!(%method, path = uri.path(), "echo");
    Ok(Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        form,
        user_agent: header_text(&headers, header::USER_AGENT),
        accept: header_text(&headers, header::ACCEPT),
    }))
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}

async fn large(Path(len): Path<usize>) -> ([(header::HeaderName, &'static str); 1], String) {
    ([(header::CONTENT_TYPE, "application/json")], format!("\"{}\"", "x".repeat(len)))
}

fn parse_pairs(encoded: &str) -> Result<Vec<(String, String)>, StatusCode> {
    serde_urlencoded::from_str(encoded).map_err(|_| StatusCode::BAD_REQUEST)
}

fn header_text(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}
