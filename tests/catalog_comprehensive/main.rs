//! End-to-end tests of the catalog service facade
//!
//! These exercise the full stack: facade → managers → repository →
//! key codec → in-memory table, with the rate limiter at the boundary.

mod attribution_flow;
mod failures;
mod lifecycle;
mod pagination;
mod rate_limiting;
mod search_flow;

use ragamala::{Caller, CatalogService, Composition, EntityId};

/// A service over a fresh in-memory table
pub fn service() -> CatalogService {
    CatalogService::in_memory()
}

/// An authenticated editor
pub fn editor(name: &str) -> Caller {
    Caller::user(name)
}

/// A composition draft with the given refs
pub fn composition(title: &str, language: &str, raga: &str, tala: &str) -> Composition {
    Composition::new(
        title,
        language,
        "carnatic",
        EntityId::new(raga),
        EntityId::new(tala),
        "seed".into(),
    )
}
