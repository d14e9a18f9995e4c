//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route matching, and dispatching.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::health;
use super::query::{self, QUERY_ALLOW, QUERY_PATH};
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};

const HEALTH_ALLOW: &str = "GET, HEAD, OPTIONS";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_log = state.config.logging.access_log;
    let mut entry = access_log.then(|| AccessLogEntry::from_request(&req, peer_addr));

    let mut response = route_request(req, &state).await;
    http::apply_common_headers(&mut response, &state.config.http);

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path and method
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = req.uri().path().to_string();
    let method = req.method().clone();
    let health_cfg = &state.config.health;

    // 0. Health check endpoints
    if health_cfg.enabled
        && (path == health_cfg.liveness_path || path == health_cfg.readiness_path)
    {
        return match method {
            Method::GET | Method::HEAD if path == health_cfg.liveness_path => health::liveness(),
            Method::GET | Method::HEAD => health::readiness(health_cfg).await,
            Method::OPTIONS => http::build_options_response(HEALTH_ALLOW),
            _ => reject_method(&method, &path, HEALTH_ALLOW),
        };
    }

    // 1. Query endpoint
    if path == QUERY_PATH {
        return match method {
            Method::POST => query::handle_query(req, state).await,
            Method::OPTIONS => http::build_options_response(QUERY_ALLOW),
            _ => reject_method(&method, &path, QUERY_ALLOW),
        };
    }

    logger::log_debug(&format!("No route for {method} {path}"));
    http::build_404_response(&available_endpoints(state))
}

fn reject_method(method: &Method, path: &str, allow: &str) -> Response<Full<Bytes>> {
    logger::log_warning(&format!("Method not allowed: {method} {path}"));
    http::build_405_response(allow)
}

fn available_endpoints(state: &AppState) -> Vec<&str> {
    let mut endpoints = vec![QUERY_PATH];
    if state.config.health.enabled {
        endpoints.push(&state.config.health.liveness_path);
        endpoints.push(&state.config.health.readiness_path);
    }
    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::header::{ALLOW, CONTENT_TYPE, SERVER};
    use hyper::StatusCode;

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn request(method: Method, uri: &str, body: &'static str) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<Full<Bytes>>) -> Response<Full<Bytes>> {
        handle_request(req, Arc::clone(state), peer()).await.unwrap()
    }

    fn quiet_state(config: Config) -> Arc<AppState> {
        let mut config = config;
        config.logging.access_log = false;
        Arc::new(AppState::new(config))
    }

    #[tokio::test]
    async fn test_query_route() {
        let state = quiet_state(Config::default());
        let response = send(
            &state,
            request(Method::POST, "/empathy-query", r#"{"message": "I feel anxious"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[SERVER], "empathy-gateway");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["result"].as_str().unwrap().contains("anxious"));
    }

    #[tokio::test]
    async fn test_query_route_rejects_get() {
        let state = quiet_state(Config::default());
        let response = send(&state, request(Method::GET, "/empathy-query", "")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], QUERY_ALLOW);
    }

    #[tokio::test]
    async fn test_options_preflight_with_cors() {
        let mut config = Config::default();
        config.http.enable_cors = true;
        let state = quiet_state(config);

        let response = send(&state, request(Method::OPTIONS, "/empathy-query", "")).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_health_routes() {
        let state = quiet_state(Config::default());
        let live = send(&state, request(Method::GET, "/healthz", "")).await;
        assert_eq!(live.status(), StatusCode::OK);
        let ready = send(&state, request(Method::GET, "/readyz", "")).await;
        assert_eq!(ready.status(), StatusCode::OK);
        let post = send(&state, request(Method::POST, "/healthz", "")).await;
        assert_eq!(post.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_health_disabled_falls_through_to_404() {
        let mut config = Config::default();
        config.health.enabled = false;
        let state = quiet_state(config);

        let response = send(&state, request(Method::GET, "/healthz", "")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["available_endpoints"], serde_json::json!(["/empathy-query"]));
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let state = quiet_state(Config::default());
        let response = send(&state, request(Method::POST, "/empathy", "{}")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_access_log_enabled_path() {
        // Exercises entry capture and formatting end to end
        let mut config = Config::default();
        config.logging.access_log_format = "json".to_string();
        let state = Arc::new(AppState::new(config));
        let response = send(&state, request(Method::POST, "/empathy-query", "[1]")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
