//! Search input contract

use ragamala_core::EntityId;
use serde::{Deserialize, Serialize};

/// Caller-facing search parameters
///
/// All filters are optional; the router picks exactly one branch by a
/// fixed priority. `limit` is 1–100 with a default of 20, enforced at
/// planning time before any storage I/O.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchParams {
    /// Free-text prefix over titles/names
    pub query: Option<String>,
    /// Tradition filter ("carnatic", "hindustani", ...)
    pub tradition: Option<String>,
    /// Language filter (compositions)
    pub language: Option<String>,
    /// Attributed artist (compositions, via the relation)
    pub artist_id: Option<EntityId>,
    /// Raga reference (compositions)
    pub raga_id: Option<EntityId>,
    /// Tala reference (compositions)
    pub tala_id: Option<EntityId>,
    /// Page size (1–100, default 20)
    pub limit: Option<u32>,
    /// Resume token from a prior page
    pub next_token: Option<String>,
}

impl SearchParams {
    /// A plain listing request: no filters
    pub fn listing() -> Self {
        SearchParams::default()
    }

    /// Prefix search shorthand
    pub fn query(text: impl Into<String>) -> Self {
        SearchParams {
            query: Some(text.into()),
            ..Default::default()
        }
    }
}
