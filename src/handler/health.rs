//! Liveness and readiness endpoints
//!
//! Readiness optionally probes one TCP dependency. A failed probe is reported,
//! never raised.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::HealthConfig;
use crate::http;

/// Classified result of a dependency probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Reachable,
    Refused,
    TimedOut,
    Unreachable { reason: String },
}

impl ProbeOutcome {
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Reachable)
    }
}

#[derive(Debug, Serialize)]
struct DependencyStatus<'a> {
    address: &'a str,
    #[serde(flatten)]
    outcome: ProbeOutcome,
}

/// Attempt a TCP connect to `addr` (`host:port`) within `timeout`
pub async fn probe(addr: &str, timeout: Duration) -> ProbeOutcome {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => ProbeOutcome::Reachable,
        Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => ProbeOutcome::Refused,
        Ok(Err(e)) => ProbeOutcome::Unreachable {
            reason: e.to_string(),
        },
        Err(_) => ProbeOutcome::TimedOut,
    }
}

pub fn liveness() -> Response<Full<Bytes>> {
    http::json_response(StatusCode::OK, &serde_json::json!({ "status": "ok" }))
}

pub async fn readiness(config: &HealthConfig) -> Response<Full<Bytes>> {
    let Some(address) = config.dependency.as_deref() else {
        return http::json_response(StatusCode::OK, &serde_json::json!({ "status": "ok" }));
    };

    let outcome = probe(address, Duration::from_millis(config.probe_timeout_ms)).await;
    let (status, label) = if outcome.is_ready() {
        (StatusCode::OK, "ok")
    } else {
        crate::logger::log_warning(&format!("Readiness probe to {address} failed: {outcome:?}"));
        (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
    };

    let dependency = DependencyStatus { address, outcome };
    http::json_response(
        status,
        &serde_json::json!({
            "status": label,
            "dependency": dependency,
        }),
    )
}
