//! Ragamala — catalog service core for Carnatic and Hindustani music
//!
//! A data-access core over one wide-column table: a key codec mapping
//! four entity kinds and their relations onto six overloaded secondary
//! indexes, a generic repository with versioning and cursor pagination,
//! an attribution relation with a verification workflow, deterministic
//! search dispatch, and a sliding-window rate limiter at the boundary.
//!
//! # Quick start
//!
//! ```
//! use ragamala::{Caller, CatalogService, Raga};
//!
//! let service = CatalogService::in_memory();
//! let editor = Caller::user("alice");
//!
//! let raga = service
//!     .create(&editor, Raga::new("kalyani", "carnatic", "alice".into()))
//!     .unwrap();
//! let read: Raga = service.get(&editor, &raga.id, None).unwrap();
//! assert!(read.revision.is_latest);
//! ```
//!
//! The HTTP/RPC layer, page rendering, and authentication live outside
//! this crate: callers hand in validated input and an already-resolved
//! [`Caller`], and consume typed results or the error taxonomy.

mod service;

pub use service::{CatalogService, ServiceRecord};

// Re-export the public surface of the member crates.
pub use ragamala_catalog::{
    AttributionManager, AttributionSearchParams, CatalogRecord, IntegrityReport, Page, Repository,
    VersioningManager,
};
pub use ragamala_core::{
    slots, Artist, Attribution, AttributionPatch, AttributionType, Composition, Confidence,
    Cursor, EntityId, EntityKind, Error, IndexKey, IndexKeySet, IndexSlot, ItemKey, KeyError,
    PageLimits, Raga, RecordKey, Result, Revision, Tala, Timestamp, UserId,
};
pub use ragamala_ratelimit::{
    Caller, CallerId, ClassLimit, Decision, RateLimitClass, RateLimitConfig, RateLimiter,
    TrustedSources,
};
pub use ragamala_search::{SearchParams, SearchPlan};
pub use ragamala_storage::{
    Direction, FaultyTable, IndexQuery, IndexSelector, MemoryTable, QueryPage, Row, SortCond,
    Table,
};
