//! Table rows
//!
//! A row is one record instance: its primary key, its secondary-index
//! projections, a revision counter for conditional writes, and a flat
//! JSON attribute map as the body. The repository layer owns the mapping
//! between rows and typed entities; storage treats bodies as opaque.

use ragamala_core::{Error, IndexKeySet, ItemKey, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// One table row
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Primary key
    pub key: ItemKey,
    /// Secondary-index projections; absent slots are omitted
    pub index: IndexKeySet,
    /// Row revision, compared by conditional writes
    pub version: u64,
    /// Flat attribute map
    pub body: serde_json::Value,
}

impl Row {
    /// Encode a typed record into a row
    pub fn encode<T: Serialize>(
        key: ItemKey,
        index: IndexKeySet,
        version: u64,
        record: &T,
    ) -> Result<Row> {
        let body = serde_json::to_value(record)
            .map_err(|e| Error::Corruption(format!("row encode for {key}: {e}")))?;
        Ok(Row {
            key,
            index,
            version,
            body,
        })
    }

    /// Decode the body back into a typed record
    ///
    /// A body that no longer matches the record shape is surfaced as
    /// corruption, never silently skipped.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| Error::Corruption(format!("row decode for {}: {e}", self.key)))
    }
}
