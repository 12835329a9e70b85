//! Remote data gateway seam
//!
//! Everything the app reads from or writes to the hosted backend goes
//! through [`RemoteGateway`]. Rows cross the seam as JSON values so the
//! trait stays object safe; typed decoding happens in the callers.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

/// Remote collections (tables) used by the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    LostFound,
    Thrift,
}

impl Collection {
    /// Table name on the backend
    pub fn table(self) -> &'static str {
        match self {
            Collection::LostFound => "lost_found_items",
            Collection::Thrift => "thrift_items",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Equality filter on a named field; a slice of these is a conjunction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate {
    pub field: &'static str,
    pub value: &'static str,
}

impl Predicate {
    pub const fn eq(field: &'static str, value: &'static str) -> Self {
        Self { field, value }
    }

    /// PostgREST query pair, e.g. `("status", "eq.active")`
    pub fn query_pair(&self) -> (&'static str, String) {
        (self.field, format!("eq.{}", self.value))
    }
}

/// Read/write operations the app needs from the backend
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Full, unpaginated snapshot of a collection in the backend's default order
    async fn fetch_all(&self, collection: Collection) -> Result<Vec<Value>, GatewayError>;

    /// Row count matching every predicate, without row payloads
    async fn count(
        &self,
        collection: Collection,
        predicates: &[Predicate],
    ) -> Result<u64, GatewayError>;

    /// Insert one row and return the stored representation
    async fn insert(&self, collection: Collection, row: Value) -> Result<Value, GatewayError>;
}

/// Gateway errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(reqwest::Error),

    #[error("Failed to decode row: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Missing or malformed row count: {0}")]
    MissingCount(String),

    #[error("No row returned from insert")]
    NoRowReturned,
}
