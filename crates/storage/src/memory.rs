//! In-memory reference backend
//!
//! `MemoryTable` implements [`Table`] over a `BTreeMap` main map plus six
//! ordered GSI projections, all guarded by one `parking_lot::RwLock` so
//! every projection is updated atomically with the main map. This is the
//! backend used by tests and single-process deployments.

use std::collections::BTreeMap;
use std::ops::Bound;

use parking_lot::RwLock;

use crate::row::Row;
use crate::table::{Direction, IndexQuery, IndexSelector, QueryPage, Table};
use ragamala_core::{Cursor, Error, ItemKey, Result};

/// GSI projection entry: (index pk, index sk, primary key)
///
/// The primary key participates in the ordering so rows sharing a sort
/// value have a stable, resumable order.
type GsiEntry = (String, String, ItemKey);

#[derive(Default)]
struct Inner {
    rows: BTreeMap<ItemKey, Row>,
    gsi: [BTreeMap<GsiEntry, ()>; 6],
}

impl Inner {
    fn unlink(&mut self, row: &Row) {
        for (slot, key) in row.index.iter() {
            self.gsi[slot.position()].remove(&(
                key.pk.clone(),
                key.sk.clone(),
                row.key.clone(),
            ));
        }
    }

    fn link(&mut self, row: &Row) {
        for (slot, key) in row.index.iter() {
            self.gsi[slot.position()]
                .insert((key.pk.clone(), key.sk.clone(), row.key.clone()), ());
        }
    }

    fn insert(&mut self, row: Row) {
        let old = self.rows.get(&row.key).cloned();
        if let Some(old) = old {
            self.unlink(&old);
        }
        self.link(&row);
        self.rows.insert(row.key.clone(), row);
    }
}

/// In-memory wide-column table
///
/// Strongly consistent across all indexes; the [`Table`] contract only
/// promises that for the primary key.
#[derive(Default)]
pub struct MemoryTable {
    inner: RwLock<Inner>,
}

impl MemoryTable {
    /// Create an empty table
    pub fn new() -> Self {
        MemoryTable::default()
    }

    /// Number of rows, for tests and diagnostics
    pub fn len(&self) -> usize {
        self.inner.read().rows.len()
    }

    /// True when no rows are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Collect the (sort, primary key) entries of a partition, ascending
    fn partition_entries(inner: &Inner, query: &IndexQuery) -> Result<Vec<(String, ItemKey)>> {
        let mut entries = Vec::new();
        match query.index {
            IndexSelector::Primary => {
                let start = ItemKey::new(query.partition.clone(), "");
                for (key, _) in inner
                    .rows
                    .range((Bound::Included(start), Bound::Unbounded))
                    .take_while(|(key, _)| key.pk == query.partition)
                {
                    if query.sort_matches(&key.sk) {
                        entries.push((key.sk.clone(), key.clone()));
                    }
                }
            }
            IndexSelector::Gsi(slot) => {
                let start = (query.partition.clone(), String::new(), ItemKey::new("", ""));
                for ((_, sk, primary), _) in inner.gsi[slot.position()]
                    .range((Bound::Included(start), Bound::Unbounded))
                    .take_while(|((pk, _, _), _)| *pk == query.partition)
                {
                    if query.sort_matches(sk) {
                        entries.push((sk.clone(), primary.clone()));
                    }
                }
            }
        }
        Ok(entries)
    }
}

impl Table for MemoryTable {
    fn put(&self, row: Row) -> Result<()> {
        self.inner.write().insert(row);
        Ok(())
    }

    fn put_new(&self, row: Row) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.rows.contains_key(&row.key) {
            return Err(Error::Conflict(format!("row already exists: {}", row.key)));
        }
        inner.insert(row);
        Ok(())
    }

    fn put_expecting(&self, row: Row, expected_version: u64) -> Result<()> {
        let mut inner = self.inner.write();
        match inner.rows.get(&row.key) {
            None => Err(Error::not_found("row", &row.key)),
            Some(existing) if existing.version != expected_version => Err(Error::Conflict(
                format!(
                    "version check failed for {}: expected {expected_version}, found {}",
                    row.key, existing.version
                ),
            )),
            Some(_) => {
                inner.insert(row);
                Ok(())
            }
        }
    }

    fn get(&self, key: &ItemKey) -> Result<Option<Row>> {
        Ok(self.inner.read().rows.get(key).cloned())
    }

    fn delete(&self, key: &ItemKey) -> Result<Option<Row>> {
        let mut inner = self.inner.write();
        let removed = inner.rows.remove(key);
        if let Some(ref row) = removed {
            inner.unlink(row);
        }
        Ok(removed)
    }

    fn query(&self, query: &IndexQuery) -> Result<QueryPage> {
        if query.limit == 0 {
            return Err(Error::Validation("page size must be at least 1".into()));
        }

        let inner = self.inner.read();
        let mut entries = Self::partition_entries(&inner, query)?;
        if query.direction == Direction::Descending {
            entries.reverse();
        }

        // Resume strictly past the cursor position in scan order.
        if let Some(cursor) = &query.cursor {
            let position = (cursor.sort.clone(), cursor.last_key.clone());
            entries.retain(|entry| match query.direction {
                Direction::Ascending => *entry > position,
                Direction::Descending => *entry < position,
            });
        }

        let has_more = entries.len() > query.limit;
        entries.truncate(query.limit);

        let mut rows = Vec::with_capacity(entries.len());
        for (_, key) in &entries {
            let row = inner
                .rows
                .get(key)
                .cloned()
                .ok_or_else(|| Error::Corruption(format!("dangling index entry for {key}")))?;
            rows.push(row);
        }

        let cursor = if has_more {
            entries.last().map(|(sort, key)| Cursor {
                index: query.index.cursor_index(),
                partition: query.partition.clone(),
                sort: sort.clone(),
                last_key: key.clone(),
            })
        } else {
            None
        };

        Ok(QueryPage {
            rows,
            cursor,
            has_more,
        })
    }

    fn batch_get(&self, keys: &[ItemKey]) -> Result<Vec<Option<Row>>> {
        let inner = self.inner.read();
        Ok(keys.iter().map(|key| inner.rows.get(key).cloned()).collect())
    }
}
