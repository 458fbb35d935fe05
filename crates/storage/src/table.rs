//! The table abstraction
//!
//! `Table` is the seam between the repository layer and a concrete
//! wide-column backend. Implementations guarantee per-row atomic writes
//! and read-after-write consistency on the primary key; secondary-index
//! reads may lag. Swapping backends must not break upper layers.

use crate::row::Row;
use ragamala_core::{Cursor, IndexSlot, ItemKey, Result};

/// Which index a query scans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSelector {
    /// The primary pk/sk index
    Primary,
    /// One of the six secondary-index slots
    Gsi(IndexSlot),
}

impl IndexSelector {
    /// Index id carried inside pagination cursors (0 = primary)
    pub fn cursor_index(&self) -> u8 {
        match self {
            IndexSelector::Primary => 0,
            IndexSelector::Gsi(slot) => slot.position() as u8 + 1,
        }
    }
}

/// Sort-key constraint of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortCond {
    /// Whole partition
    All,
    /// Sort values starting with a prefix
    BeginsWith(String),
}

impl SortCond {
    fn matches(&self, sort: &str) -> bool {
        match self {
            SortCond::All => true,
            SortCond::BeginsWith(prefix) => sort.starts_with(prefix.as_str()),
        }
    }
}

/// Scan direction
///
/// Ascending by sort key unless the index semantics dictate otherwise;
/// the popularity slot stores inverted scores, so even ranked queries
/// scan ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Low to high sort values
    #[default]
    Ascending,
    /// High to low sort values
    Descending,
}

/// One paginated index scan
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    /// Index to scan
    pub index: IndexSelector,
    /// Partition value
    pub partition: String,
    /// Sort-key constraint
    pub sort: SortCond,
    /// Scan direction
    pub direction: Direction,
    /// Resume position from a prior page
    pub cursor: Option<Cursor>,
    /// Page size (>= 1); resolved by the caller before it gets here
    pub limit: usize,
}

impl IndexQuery {
    /// Scan a whole partition, ascending, first page
    pub fn partition(index: IndexSelector, partition: impl Into<String>, limit: usize) -> Self {
        IndexQuery {
            index,
            partition: partition.into(),
            sort: SortCond::All,
            direction: Direction::Ascending,
            cursor: None,
            limit,
        }
    }

    /// Constrain to sort values starting with a prefix
    pub fn begins_with(mut self, prefix: impl Into<String>) -> Self {
        self.sort = SortCond::BeginsWith(prefix.into());
        self
    }

    /// Resume from a cursor
    pub fn after(mut self, cursor: Option<Cursor>) -> Self {
        self.cursor = cursor;
        self
    }

    pub(crate) fn sort_matches(&self, sort: &str) -> bool {
        self.sort.matches(sort)
    }
}

/// One page of query results
#[derive(Debug, Clone)]
pub struct QueryPage {
    /// Rows of the page, in scan order
    pub rows: Vec<Row>,
    /// Resume position; `None` exactly when `has_more` is false
    pub cursor: Option<Cursor>,
    /// True when the scan has further rows
    pub has_more: bool,
}

/// Storage abstraction for the catalog table
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads.
pub trait Table: Send + Sync {
    /// Unconditional upsert
    fn put(&self, row: Row) -> Result<()>;

    /// Create-only write; fails with `Conflict` if the key exists
    fn put_new(&self, row: Row) -> Result<()>;

    /// Conditional replace: the stored row must exist and carry
    /// `expected_version`; fails with `NotFound` or `Conflict`
    fn put_expecting(&self, row: Row, expected_version: u64) -> Result<()>;

    /// Read one row by primary key
    fn get(&self, key: &ItemKey) -> Result<Option<Row>>;

    /// Delete one row; returns the previous row if it existed
    fn delete(&self, key: &ItemKey) -> Result<Option<Row>>;

    /// Paginated index scan
    fn query(&self, query: &IndexQuery) -> Result<QueryPage>;

    /// Read many rows; the result is aligned with the caller-supplied
    /// key order, absent keys yielding `None`
    fn batch_get(&self, keys: &[ItemKey]) -> Result<Vec<Option<Row>>>;
}
