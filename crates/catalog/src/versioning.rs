//! Wiki-style versioning
//!
//! The `LATEST` row is both the latest pointer and the latest content,
//! so there is never a window with two authoritative rows. Creating a
//! version is a two-step sequence:
//!
//! 1. archive the superseded content at `VERSION#<n>` with a create-only
//!    write (`is_latest = false`, no index keys)
//! 2. advance the `LATEST` row with a write conditional on the version
//!    that was read
//!
//! Two writers racing on the same id both read version N; at most one
//! passes step 2 — single-writer-wins. An interrupted run can leave an
//! orphan archive at version N while the pointer still reads N; step 1
//! detects that case (the archived content cannot differ, the pointer
//! never moved) and proceeds, and [`VersioningManager::verify_integrity`]
//! exposes the same check to operators.

use tracing::{debug, warn};

use crate::record::CatalogRecord;
use crate::repository::{archive_row, Repository};
use ragamala_core::{EntityId, Error, Result, Timestamp, UserId};
use ragamala_storage::{IndexQuery, IndexSelector};

/// Integrity state of one entity's version chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityReport {
    /// History and latest pointer agree
    Consistent,
    /// An interrupted version creation left an archive row at the
    /// current version; the next `create_version` absorbs it
    PendingArchive {
        /// The version carried by both the pointer and the orphan archive
        version: u32,
    },
}

/// Version lifecycle manager for one record type
#[derive(Clone)]
pub struct VersioningManager<R> {
    repo: Repository<R>,
}

impl<R: CatalogRecord> VersioningManager<R> {
    /// Build over an existing repository
    pub fn new(repo: Repository<R>) -> Self {
        VersioningManager { repo }
    }

    /// The underlying repository
    pub fn repository(&self) -> &Repository<R> {
        &self.repo
    }

    /// Create version N+1 from the current latest
    ///
    /// Clones the latest content, applies `mutate`, and advances the
    /// pointer. A concurrent creation on the same id fails with
    /// `Conflict`; the caller may retry from a fresh read.
    pub fn create_version(
        &self,
        id: &EntityId,
        editor: &UserId,
        mutate: impl FnOnce(&mut R),
        now: Timestamp,
    ) -> Result<R> {
        let latest = self
            .repo
            .get(id)?
            .ok_or_else(|| Error::not_found(R::KIND.as_str(), id))?;
        let prior_version = latest.revision().version;

        self.archive(&latest)?;

        let mut next = latest.clone();
        mutate(&mut next);
        // Lineage survives whatever the closure did.
        next.set_id(latest.id().clone());
        {
            let source = latest.revision();
            let rev = next.revision_mut();
            rev.version = prior_version;
            rev.created_at = source.created_at;
            rev.added_by = source.added_by.clone();
            rev.edited_by = source.edited_by.clone();
            rev.is_latest = true;
        }
        next.normalize();
        next.revision_mut().version = prior_version + 1;
        next.revision_mut().touch(editor, now);
        next.revision_mut().recompute_popularity();

        self.repo
            .table()
            .put_expecting(Repository::latest_row(&next)?, prior_version as u64)
            .map_err(|e| match e {
                Error::Conflict(_) => Error::Conflict(format!(
                    "concurrent version creation on {} {id}",
                    R::KIND
                )),
                other => other,
            })?;

        debug!(
            kind = %R::KIND,
            id = %id,
            version = next.revision().version,
            editor = %editor,
            "version created"
        );
        Ok(next)
    }

    /// Archive the superseded content, tolerating an orphan from an
    /// interrupted predecessor
    fn archive(&self, latest: &R) -> Result<()> {
        let mut superseded = latest.clone();
        superseded.revision_mut().is_latest = false;

        match self.repo.table().put_new(archive_row(&superseded)?) {
            Ok(()) => Ok(()),
            Err(Error::Conflict(_)) => {
                // The archive for this version already exists. The
                // pointer still reads the same version, so the stored
                // archive is a clone of the same content: an interrupted
                // or racing attempt got here first. Step 2's conditional
                // write arbitrates; nothing to do now.
                warn!(
                    kind = %R::KIND,
                    id = %latest.id(),
                    version = latest.revision().version,
                    "archive row already present, absorbing"
                );
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    /// Read a version: `None` selects the latest
    pub fn get(&self, id: &EntityId, version: Option<u32>) -> Result<Option<R>> {
        match version {
            None => self.repo.get(id),
            Some(v) => self.repo.get_version(id, v),
        }
    }

    /// All versions, oldest to newest
    ///
    /// Archive rows (strictly increasing, immutable once superseded)
    /// followed by the current latest row.
    pub fn history(&self, id: &EntityId) -> Result<Vec<R>> {
        let latest = self
            .repo
            .get(id)?
            .ok_or_else(|| Error::not_found(R::KIND.as_str(), id))?;
        let current_version = latest.revision().version;

        let mut versions = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self.repo.query(
                IndexQuery::partition(
                    IndexSelector::Primary,
                    Repository::<R>::latest_key(id)?.pk,
                    100,
                )
                .begins_with("VERSION#"),
                token.as_deref(),
            )?;
            versions.extend(page.items);
            match page.next_token {
                Some(next) if page.has_more => token = Some(next),
                _ => break,
            }
        }

        // An interrupted creation may have archived the current version
        // already; the latest row stays authoritative for it.
        versions.retain(|v| v.revision().version < current_version);
        versions.push(latest);
        Ok(versions)
    }

    /// Check the version-chain invariant for one entity
    pub fn verify_integrity(&self, id: &EntityId) -> Result<IntegrityReport> {
        let latest = self
            .repo
            .get(id)?
            .ok_or_else(|| Error::not_found(R::KIND.as_str(), id))?;
        let version = latest.revision().version;

        match self.repo.get_version(id, version)? {
            Some(archived) if !archived.revision().is_latest => {
                Ok(IntegrityReport::PendingArchive { version })
            }
            _ => Ok(IntegrityReport::Consistent),
        }
    }
}
