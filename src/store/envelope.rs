//! Uniform `{rows, count}` shape for remote responses

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

/// Normalized result of any terminal table operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    pub rows: Vec<Value>,
    pub count: usize,
    /// Total reported by the remote when a count mode was requested
    pub total: Option<u64>,
}

impl Envelope {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalize a decoded JSON document: list as-is, object as one row,
    /// null as nothing.
    pub fn from_value(value: Value) -> Self {
        let rows = match value {
            Value::Array(rows) => rows,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        let count = rows.len();
        Self { rows, count, total: None }
    }

    /// Parse a raw response body. An empty body (e.g. `204 No Content`) is an
    /// empty envelope.
    pub fn from_body(body: &str) -> StoreResult<Self> {
        if body.trim().is_empty() {
            return Ok(Self::empty());
        }
        let value: Value =
            serde_json::from_str(body).map_err(|e| StoreError::MalformedBody(e.to_string()))?;
        Ok(Self::from_value(value))
    }

    /// Attach the total from a `Content-Range: 0-9/42` header
    pub fn with_content_range(mut self, content_range: Option<&str>) -> Self {
        self.total = content_range
            .and_then(|range| range.rsplit_once('/'))
            .and_then(|(_, total)| total.parse().ok());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Decode every row into `T`, dropping (and logging) rows that do not fit
    pub fn decode<T: DeserializeOwned>(&self) -> Vec<T> {
        self.rows
            .iter()
            .filter_map(|row| match serde_json::from_value(row.clone()) {
                Ok(decoded) => Some(decoded),
                Err(e) => {
                    tracing::warn!("Skipping undecodable row: {}", e);
                    None
                }
            })
            .collect()
    }

    /// First row decoded into `T`; an undecodable row is logged and reads as `None`
    pub fn first<T: DeserializeOwned>(&self) -> Option<T> {
        let row = self.rows.first()?;
        match serde_json::from_value(row.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!("Undecodable first row: {}", e);
                None
            }
        }
    }
}
