//! Test doubles for the storage layer
//!
//! `FaultyTable` wraps any backend and, when armed, fails every
//! operation with `StorageUnavailable`. Upper layers use it to assert
//! that backend failures propagate unchanged, with no internal retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::row::Row;
use crate::table::{IndexQuery, QueryPage, Table};
use ragamala_core::{Error, ItemKey, Result};

/// Fault-injection wrapper around a real table
pub struct FaultyTable {
    inner: Arc<dyn Table>,
    failing: AtomicBool,
}

impl FaultyTable {
    /// Wrap a backend; starts healthy
    pub fn new(inner: Arc<dyn Table>) -> Self {
        FaultyTable {
            inner,
            failing: AtomicBool::new(false),
        }
    }

    /// Arm or disarm fault injection
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::Acquire) {
            return Err(Error::StorageUnavailable("injected fault".into()));
        }
        Ok(())
    }
}

impl Table for FaultyTable {
    fn put(&self, row: Row) -> Result<()> {
        self.check()?;
        self.inner.put(row)
    }

    fn put_new(&self, row: Row) -> Result<()> {
        self.check()?;
        self.inner.put_new(row)
    }

    fn put_expecting(&self, row: Row, expected_version: u64) -> Result<()> {
        self.check()?;
        self.inner.put_expecting(row, expected_version)
    }

    fn get(&self, key: &ItemKey) -> Result<Option<Row>> {
        self.check()?;
        self.inner.get(key)
    }

    fn delete(&self, key: &ItemKey) -> Result<Option<Row>> {
        self.check()?;
        self.inner.delete(key)
    }

    fn query(&self, query: &IndexQuery) -> Result<QueryPage> {
        self.check()?;
        self.inner.query(query)
    }

    fn batch_get(&self, keys: &[ItemKey]) -> Result<Vec<Option<Row>>> {
        self.check()?;
        self.inner.batch_get(keys)
    }
}
