//! Core types for the Ragamala catalog
//!
//! This crate defines the foundational types used throughout the system:
//! - EntityKind, EntityId, UserId: identity types for catalog records
//! - Timestamp: microsecond-precision time
//! - RecordKey / ItemKey: the single-table key codec
//! - IndexSlot / IndexKey / IndexKeySet: the six-slot secondary-index contract
//! - Cursor: opaque pagination tokens
//! - Error: error type hierarchy
//! - Domain entities: Composition, Raga, Tala, Artist, Attribution

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cursor;
pub mod entity;
pub mod error;
pub mod key;
pub mod limits;
pub mod normalize;
pub mod timestamp;
pub mod types;

pub use cursor::{Cursor, CursorError};
pub use entity::{
    Artist, Attribution, AttributionPatch, AttributionType, Composition, Confidence, Raga,
    Revision, Tala,
};
pub use error::{Error, Result};
pub use key::{slots, IndexKey, IndexKeySet, IndexSlot, ItemKey, KeyError, RecordKey, DELIMITER};
pub use limits::PageLimits;
pub use timestamp::Timestamp;
pub use types::{EntityId, EntityKind, UserId};
