//! `POST /empathy-query`
//!
//! Decodes the JSON body into a [`Query`], runs it through the configured
//! processor and answers `{"result": ...}`.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Request, Response, StatusCode};

use crate::config::AppState;
use crate::error::QueryError;
use crate::http;
use crate::logger;
use crate::processor::{Query, QueryResponse};

pub const QUERY_PATH: &str = "/empathy-query";
pub const QUERY_ALLOW: &str = "POST, OPTIONS";

pub async fn handle_query<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match run_query(req, state).await {
        Ok(body) => http::json_response(StatusCode::OK, &body),
        Err(e) => {
            logger::log_warning(&format!("Rejected query: {e}"));
            http::error_response(&e)
        }
    }
}

async fn run_query<B>(req: Request<B>, state: &AppState) -> Result<QueryResponse, QueryError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = state.config.http.max_body_size;

    check_content_type(req.headers())?;
    check_declared_length(req.headers(), limit)?;

    let body = read_body(req.into_body(), limit).await?;
    if body.is_empty() {
        return Err(QueryError::EmptyBody);
    }

    let query = Query::from_slice(&body)?;
    logger::log_debug(&format!("Processing query: {query}"));

    let result = state.processor.process(&query)?;
    Ok(QueryResponse { result })
}

/// Only `application/json` and `+json` media types are accepted
fn check_content_type(headers: &HeaderMap) -> Result<(), QueryError> {
    let raw = headers
        .get(CONTENT_TYPE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default();

    let essence = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
    {
        Ok(())
    } else {
        Err(QueryError::UnsupportedMediaType(raw))
    }
}

/// Reject early when Content-Length already exceeds the limit
fn check_declared_length(headers: &HeaderMap, limit: u64) -> Result<(), QueryError> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Ok(());
    };

    match value.to_str().ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(size) if size > limit => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {limit})"
            ));
            Err(QueryError::PayloadTooLarge { limit })
        }
        Some(_) => Ok(()),
        None => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: {value:?}, skipping size check"
            ));
            Ok(())
        }
    }
}

/// Collect the body, enforcing the limit on chunked bodies as well
async fn read_body<B>(body: B, limit: u64) -> Result<Bytes, QueryError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max = usize::try_from(limit).unwrap_or(usize::MAX);
    match Limited::new(body, max).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(QueryError::PayloadTooLarge { limit })
        }
        Err(e) => Err(QueryError::BodyRead(e.to_string())),
    }
}
