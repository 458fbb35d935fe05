//! Storage layer for the Ragamala catalog
//!
//! One wide-column table, addressed by a primary `pk`/`sk` pair plus six
//! overloaded secondary indexes. The [`Table`] trait is the seam between
//! the repository layer and a concrete backend; [`MemoryTable`] is the
//! in-process reference backend.
//!
//! The trait contract allows secondary-index reads to lag the primary
//! key (eventual consistency); the in-memory backend happens to be
//! strongly consistent, callers must not rely on that.

pub mod memory;
pub mod row;
pub mod table;
pub mod testing;

pub use memory::MemoryTable;
pub use row::Row;
pub use table::{Direction, IndexQuery, IndexSelector, QueryPage, SortCond, Table};
pub use testing::FaultyTable;
