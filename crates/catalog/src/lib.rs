//! Catalog managers for Ragamala
//!
//! The domain layer over the storage table:
//! - `CatalogRecord`: binds an entity type to its kind, keys, and
//!   secondary-index contract
//! - `Repository<R>`: generic CRUD, queries, and batch reads
//! - `VersioningManager<R>`: wiki-style version history with a
//!   single-writer-wins latest pointer
//! - `AttributionManager`: the composition–artist relation lifecycle
//!
//! Managers delegate every physical read and write to the storage
//! layer; none of them hold state beyond an `Arc` of the table.

pub mod attribution;
pub mod record;
pub mod repository;
pub mod versioning;

pub use attribution::{AttributionManager, AttributionSearchParams};
pub use record::CatalogRecord;
pub use repository::{Page, Repository};
pub use versioning::{IntegrityReport, VersioningManager};
