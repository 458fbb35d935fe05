//! Opaque pagination cursors
//!
//! A cursor encodes the last evaluated position of an index scan so a
//! follow-up query resumes exactly where the page ended. Callers treat
//! the token as unparseable text and pass it back verbatim.
//!
//! ## Contract
//!
//! - Round-trip: decode → resume → identical ordering
//! - A token is bound to the index and partition that issued it; replaying
//!   it against any other query fails instead of leaking rows from a
//!   partition the caller never scanned

use crate::key::ItemKey;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Cursor decode/validation errors
///
/// These surface to callers as `ValidationError`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    /// Token is not a cursor this service issued
    #[error("pagination token is not valid")]
    Undecodable,

    /// Token was issued by a different index
    #[error("pagination token does not match the queried index")]
    IndexMismatch,

    /// Token was issued for a different partition
    #[error("pagination token does not match the queried partition")]
    PartitionMismatch,
}

/// Last evaluated position of an index scan
///
/// `index` is 0 for the primary index, 1..=6 for the GSI slots. The
/// partition value is carried so resumption can be checked against the
/// query, and the full primary key disambiguates duplicate sort values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Index the scan ran over (0 = primary, 1..=6 = GSI slot)
    pub index: u8,
    /// Partition value the scan was scoped to
    pub partition: String,
    /// Sort value of the last evaluated entry
    pub sort: String,
    /// Primary key of the last evaluated row
    pub last_key: ItemKey,
}

impl Cursor {
    /// Encode into an opaque token
    pub fn encode(&self) -> String {
        // bincode of this struct cannot fail; the types are plain strings
        let bytes = bincode::serialize(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Decode a token and bind it to the resuming query
    ///
    /// Fails when the token is garbage or was issued by a different
    /// index or partition.
    pub fn resume(token: &str, index: u8, partition: &str) -> Result<Cursor, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| CursorError::Undecodable)?;
        let cursor: Cursor =
            bincode::deserialize(&bytes).map_err(|_| CursorError::Undecodable)?;
        if cursor.index != index {
            return Err(CursorError::IndexMismatch);
        }
        if cursor.partition != partition {
            return Err(CursorError::PartitionMismatch);
        }
        Ok(cursor)
    }
}
