//! Query processing step
//!
//! A [`Query`] is whatever JSON the client sent. Processors turn it into the
//! string placed under `result` in the response. [`EchoProcessor`] is the only
//! shipped implementation; other logic backends plug in through
//! [`QueryProcessor`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::QueryError;

/// Opaque JSON payload submitted by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Query(Value);

impl Query {
    /// Decode a request body. No schema is enforced.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, QueryError> {
        Ok(Self(serde_json::from_slice(bytes)?))
    }
}

impl From<Value> for Query {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

// Compact JSON rendering
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Response body of `POST /empathy-query`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub result: String,
}

pub trait QueryProcessor: Send + Sync {
    fn process(&self, query: &Query) -> Result<String, QueryError>;
}

/// Renders `Received <query>` and nothing else
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoProcessor;

impl QueryProcessor for EchoProcessor {
    fn process(&self, query: &Query) -> Result<String, QueryError> {
        Ok(format!("Received {query}"))
    }
}
