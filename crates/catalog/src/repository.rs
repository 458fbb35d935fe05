//! Generic repository
//!
//! Stateless facade over the table, parameterized by record type. The
//! repository exclusively owns row encoding and decoding; managers and
//! the facade never touch `Row` directly.
//!
//! ## Write discipline
//!
//! - `create` is a create-only write (duplicate id → `Conflict`)
//! - `update` and `update_counters` are conditional writes against the
//!   version that was read (optimistic; a lost race → `Conflict`)
//! - every write refreshes `updated_at`; nothing ever mutates
//!   `created_at` after creation

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::record::CatalogRecord;
use ragamala_core::{
    Cursor, EntityId, Error, IndexKeySet, ItemKey, RecordKey, Result, Revision, Timestamp, UserId,
};
use ragamala_storage::{IndexQuery, IndexSelector, Row, Table};

/// One page of decoded records
#[derive(Debug, Clone)]
pub struct Page<R> {
    /// Records of the page, in scan order
    pub items: Vec<R>,
    /// Opaque resume token; present exactly when `has_more`
    pub next_token: Option<String>,
    /// True when further records exist
    pub has_more: bool,
}

impl<R> Page<R> {
    /// Map the items to another type, keeping pagination state
    pub fn map<T>(self, f: impl FnMut(R) -> T) -> Page<T> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_token: self.next_token,
            has_more: self.has_more,
        }
    }
}

/// Generic repository over one record type
pub struct Repository<R> {
    table: Arc<dyn Table>,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Repository {
            table: Arc::clone(&self.table),
            _marker: PhantomData,
        }
    }
}

impl<R: CatalogRecord> Repository<R> {
    /// Create a repository over a table
    pub fn new(table: Arc<dyn Table>) -> Self {
        Repository {
            table,
            _marker: PhantomData,
        }
    }

    pub(crate) fn table(&self) -> &Arc<dyn Table> {
        &self.table
    }

    pub(crate) fn latest_key(id: &EntityId) -> Result<ItemKey> {
        Ok(RecordKey::Latest {
            kind: R::KIND,
            id: id.clone(),
        }
        .encode()?)
    }

    pub(crate) fn version_key(id: &EntityId, version: u32) -> Result<ItemKey> {
        Ok(RecordKey::Version {
            kind: R::KIND,
            id: id.clone(),
            version,
        }
        .encode()?)
    }

    /// Encode the latest row of a record, all index slots populated
    pub(crate) fn latest_row(record: &R) -> Result<Row> {
        Row::encode(
            Self::latest_key(record.id())?,
            record.index_keys(),
            record.revision().version as u64,
            record,
        )
    }

    /// Create a record
    ///
    /// Assigns a fresh id when the draft has none, normalizes free-text
    /// fields, and stamps the revision metadata. Fails with `Conflict`
    /// when the id already exists.
    pub fn create(&self, mut record: R, now: Timestamp) -> Result<R> {
        if record.id().is_empty() {
            record.set_id(EntityId::generate());
        }
        record.normalize();
        {
            let added_by = record.revision().added_by.clone();
            let rev = record.revision_mut();
            rev.version = 1;
            rev.created_at = now;
            rev.updated_at = now;
            rev.edited_by = vec![added_by];
            rev.is_latest = true;
            rev.recompute_popularity();
        }

        self.table.put_new(Self::latest_row(&record)?)?;
        debug!(kind = %R::KIND, id = %record.id(), "record created");
        Ok(record)
    }

    /// Read the latest version
    pub fn get(&self, id: &EntityId) -> Result<Option<R>> {
        let key = Self::latest_key(id)?;
        match self.table.get(&key)? {
            Some(row) => Ok(Some(row.decode()?)),
            None => Ok(None),
        }
    }

    /// Read a specific version
    ///
    /// The current version lives on the latest row; superseded versions
    /// live on archive rows.
    pub fn get_version(&self, id: &EntityId, version: u32) -> Result<Option<R>> {
        if let Some(latest) = self.get(id)? {
            if latest.revision().version == version {
                return Ok(Some(latest));
            }
        }
        let key = Self::version_key(id, version)?;
        match self.table.get(&key)? {
            Some(row) => Ok(Some(row.decode()?)),
            None => Ok(None),
        }
    }

    /// Merge changes into the latest row, in place
    ///
    /// The closure mutates a clone; identity and lineage fields (id,
    /// version, `created_at`, `added_by`, `edited_by`, `is_latest`) are
    /// restored afterwards, so a closure cannot corrupt them. The write
    /// is conditional on the version that was read.
    pub fn update(
        &self,
        id: &EntityId,
        editor: &UserId,
        mutate: impl FnOnce(&mut R),
        now: Timestamp,
    ) -> Result<R> {
        let current = self
            .get(id)?
            .ok_or_else(|| Error::not_found(R::KIND.as_str(), id))?;
        let expected = current.revision().version as u64;

        let mut next = current.clone();
        mutate(&mut next);
        Self::restore_lineage(&current, &mut next);
        next.normalize();
        next.revision_mut().touch(editor, now);
        next.revision_mut().recompute_popularity();

        self.table.put_expecting(Self::latest_row(&next)?, expected)?;
        debug!(kind = %R::KIND, id = %id, editor = %editor, "record updated");
        Ok(next)
    }

    /// Merge counter changes without recording an editor
    ///
    /// View and favorite tracking go through here: `updated_at` moves,
    /// `edited_by` does not.
    pub fn update_counters(
        &self,
        id: &EntityId,
        mutate: impl FnOnce(&mut Revision),
        now: Timestamp,
    ) -> Result<R> {
        let current = self
            .get(id)?
            .ok_or_else(|| Error::not_found(R::KIND.as_str(), id))?;
        let expected = current.revision().version as u64;

        let mut next = current.clone();
        mutate(next.revision_mut());
        Self::restore_lineage(&current, &mut next);
        next.revision_mut().updated_at = now;
        next.revision_mut().recompute_popularity();

        self.table.put_expecting(Self::latest_row(&next)?, expected)?;
        Ok(next)
    }

    fn restore_lineage(current: &R, next: &mut R) {
        next.set_id(current.id().clone());
        let source = current.revision();
        let rev = next.revision_mut();
        rev.version = source.version;
        rev.created_at = source.created_at;
        rev.added_by = source.added_by.clone();
        rev.edited_by = source.edited_by.clone();
        rev.is_latest = true;
    }

    /// Delete a record and its entire version history
    ///
    /// Irreversible. Attribution rows sharing the partition are not
    /// touched; relation cleanup belongs to the attribution manager.
    pub fn delete(&self, id: &EntityId) -> Result<()> {
        let latest_key = Self::latest_key(id)?;
        let removed = self.table.delete(&latest_key)?;
        if removed.is_none() {
            return Err(Error::not_found(R::KIND.as_str(), id));
        }

        loop {
            let page = self.table.query(
                &IndexQuery::partition(IndexSelector::Primary, latest_key.pk.clone(), 100)
                    .begins_with("VERSION#"),
            )?;
            if page.rows.is_empty() {
                break;
            }
            for row in &page.rows {
                self.table.delete(&row.key)?;
            }
            if !page.has_more {
                break;
            }
        }
        debug!(kind = %R::KIND, id = %id, "record deleted");
        Ok(())
    }

    /// Run a paginated index query
    ///
    /// `token` is the opaque cursor from a prior page; it must have been
    /// issued by the same index and partition or the query fails before
    /// any storage I/O.
    pub fn query(&self, mut query: IndexQuery, token: Option<&str>) -> Result<Page<R>> {
        if let Some(token) = token {
            let cursor =
                Cursor::resume(token, query.index.cursor_index(), &query.partition)?;
            query.cursor = Some(cursor);
        }
        let page = self.table.query(&query)?;

        let mut items = Vec::with_capacity(page.rows.len());
        for row in &page.rows {
            items.push(row.decode()?);
        }
        Ok(Page {
            items,
            next_token: page.cursor.as_ref().map(Cursor::encode),
            has_more: page.has_more,
        })
    }

    /// Read many records by id, preserving the caller-supplied order
    ///
    /// Absent ids yield `None` in their position; downstream projections
    /// (attribution fan-out) rely on this alignment.
    pub fn batch_get(&self, ids: &[EntityId]) -> Result<Vec<Option<R>>> {
        let keys = ids
            .iter()
            .map(Self::latest_key)
            .collect::<Result<Vec<_>>>()?;
        let rows = self.table.batch_get(&keys)?;
        rows.into_iter()
            .map(|row| row.map(|r| r.decode()).transpose())
            .collect()
    }
}

/// Build an archive row: a superseded version, no index keys
pub(crate) fn archive_row<R: CatalogRecord>(record: &R) -> Result<Row> {
    let rev = record.revision();
    Row::encode(
        Repository::<R>::version_key(record.id(), rev.version)?,
        IndexKeySet::empty(),
        rev.version as u64,
        record,
    )
}
