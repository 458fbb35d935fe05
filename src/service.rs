//! The catalog service facade
//!
//! `CatalogService` composes the repositories, the versioning and
//! attribution managers, the search router, and one rate limiter. Every
//! public operation resolves the caller, checks admission **before any
//! storage I/O**, and then runs; a denial short-circuits with
//! `RateLimitExceeded` and the retry-after duration.
//!
//! The limiter is owned here as an explicit instance; its periodic
//! sweep is driven by whoever owns the service, never self-scheduled.

use std::sync::Arc;

use ragamala_catalog::{
    AttributionManager, AttributionSearchParams, CatalogRecord, Page, Repository,
    VersioningManager,
};
use ragamala_core::{
    Artist, Attribution, AttributionPatch, AttributionType, Composition, Confidence, EntityId,
    EntityKind, Error, Raga, Result, Tala, Timestamp, UserId,
};
use ragamala_ratelimit::{Caller, RateLimitClass, RateLimitConfig, RateLimiter};
use ragamala_search::{plan, plan_popular, SearchParams, SearchPlan};
use ragamala_storage::{MemoryTable, Table};

/// A versioned record wired into the service
///
/// Binds each record type to its manager field, so the facade can be
/// generic over the four entity kinds.
pub trait ServiceRecord: CatalogRecord {
    /// The manager owning this record type
    fn manager(service: &CatalogService) -> &VersioningManager<Self>
    where
        Self: Sized;
}

impl ServiceRecord for Composition {
    fn manager(service: &CatalogService) -> &VersioningManager<Self> {
        &service.compositions
    }
}

impl ServiceRecord for Artist {
    fn manager(service: &CatalogService) -> &VersioningManager<Self> {
        &service.artists
    }
}

impl ServiceRecord for Raga {
    fn manager(service: &CatalogService) -> &VersioningManager<Self> {
        &service.ragas
    }
}

impl ServiceRecord for Tala {
    fn manager(service: &CatalogService) -> &VersioningManager<Self> {
        &service.talas
    }
}

/// The catalog service
pub struct CatalogService {
    compositions: VersioningManager<Composition>,
    artists: VersioningManager<Artist>,
    ragas: VersioningManager<Raga>,
    talas: VersioningManager<Tala>,
    attributions: AttributionManager,
    limiter: RateLimiter,
}

impl CatalogService {
    /// Build over a table backend
    pub fn new(table: Arc<dyn Table>, config: RateLimitConfig) -> Self {
        CatalogService {
            compositions: VersioningManager::new(Repository::new(Arc::clone(&table))),
            artists: VersioningManager::new(Repository::new(Arc::clone(&table))),
            ragas: VersioningManager::new(Repository::new(Arc::clone(&table))),
            talas: VersioningManager::new(Repository::new(Arc::clone(&table))),
            attributions: AttributionManager::new(Arc::clone(&table)),
            limiter: RateLimiter::new(config),
        }
    }

    /// Build over a fresh in-memory table with default limits
    pub fn in_memory() -> Self {
        CatalogService::new(Arc::new(MemoryTable::new()), RateLimitConfig::default())
    }

    /// The rate limiter, for sweeps and boundary headers
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Drop idle rate-limit buckets; driven by an external scheduler
    pub fn sweep_rate_limits(&self) -> usize {
        self.limiter.sweep(Timestamp::now())
    }

    /// Admission check; must pass before any storage I/O
    ///
    /// Unauthenticated callers fall to the anonymous class for read and
    /// search traffic; write-ish classes keep their own budgets.
    fn guard(&self, caller: &Caller, class: RateLimitClass) -> Result<()> {
        let class = match class {
            RateLimitClass::General | RateLimitClass::Search if caller.is_anonymous() => {
                RateLimitClass::Anonymous
            }
            other => other,
        };
        let decision = self.limiter.check(class, caller);
        if !decision.allowed {
            return Err(Error::RateLimitExceeded {
                retry_after: decision.retry_after,
            });
        }
        Ok(())
    }

    /// Writes need a resolved user identity
    fn editor(caller: &Caller) -> Result<UserId> {
        caller
            .user_id
            .clone()
            .ok_or_else(|| Error::Validation("writes require an authenticated user".into()))
    }

    // ========== Versioned entities ==========

    /// Create a record
    pub fn create<R: ServiceRecord>(&self, caller: &Caller, mut draft: R) -> Result<R> {
        self.guard(caller, RateLimitClass::Write)?;
        let editor = Self::editor(caller)?;
        draft.revision_mut().added_by = editor;
        R::manager(self)
            .repository()
            .create(draft, Timestamp::now())
    }

    /// Read a record; `version = None` selects the latest
    pub fn get<R: ServiceRecord>(
        &self,
        caller: &Caller,
        id: &EntityId,
        version: Option<u32>,
    ) -> Result<R> {
        self.guard(caller, RateLimitClass::General)?;
        R::manager(self)
            .get(id, version)?
            .ok_or_else(|| Error::not_found(R::KIND.as_str(), id))
    }

    /// Read many records, in request order
    pub fn batch_get<R: ServiceRecord>(
        &self,
        caller: &Caller,
        ids: &[EntityId],
    ) -> Result<Vec<Option<R>>> {
        self.guard(caller, RateLimitClass::General)?;
        R::manager(self).repository().batch_get(ids)
    }

    /// Merge changes into the latest row without creating a version
    pub fn update<R: ServiceRecord>(
        &self,
        caller: &Caller,
        id: &EntityId,
        mutate: impl FnOnce(&mut R),
    ) -> Result<R> {
        self.guard(caller, RateLimitClass::Write)?;
        let editor = Self::editor(caller)?;
        R::manager(self)
            .repository()
            .update(id, &editor, mutate, Timestamp::now())
    }

    /// Create the next version of a record
    pub fn create_version<R: ServiceRecord>(
        &self,
        caller: &Caller,
        id: &EntityId,
        mutate: impl FnOnce(&mut R),
    ) -> Result<R> {
        self.guard(caller, RateLimitClass::Write)?;
        let editor = Self::editor(caller)?;
        R::manager(self).create_version(id, &editor, mutate, Timestamp::now())
    }

    /// All versions of a record, oldest to newest
    pub fn history<R: ServiceRecord>(&self, caller: &Caller, id: &EntityId) -> Result<Vec<R>> {
        self.guard(caller, RateLimitClass::General)?;
        R::manager(self).history(id)
    }

    /// Delete a record with its whole version history
    ///
    /// Deleting a composition cascades over its attribution rows.
    pub fn delete<R: ServiceRecord>(&self, caller: &Caller, id: &EntityId) -> Result<()> {
        self.guard(caller, RateLimitClass::Write)?;
        Self::editor(caller)?;
        if R::KIND == EntityKind::Composition {
            self.attributions.delete_for_composition(id)?;
        }
        R::manager(self).repository().delete(id)
    }

    // ========== Search ==========

    /// Search one entity kind
    ///
    /// The artist filter routes through the attribution relation and is
    /// only meaningful for compositions; use [`Self::search_compositions`].
    pub fn search<R: ServiceRecord>(
        &self,
        caller: &Caller,
        params: &SearchParams,
    ) -> Result<Page<R>> {
        self.guard(caller, RateLimitClass::Search)?;
        match plan(R::KIND, params)? {
            SearchPlan::Scan(query) => R::manager(self)
                .repository()
                .query(query, params.next_token.as_deref()),
            SearchPlan::ArtistAttributions { .. } => Err(Error::Validation(
                "the artist filter applies to composition search".into(),
            )),
        }
    }

    /// Search compositions, including the artist fan-out branch
    pub fn search_compositions(
        &self,
        caller: &Caller,
        params: &SearchParams,
    ) -> Result<Page<Composition>> {
        self.guard(caller, RateLimitClass::Search)?;
        match plan(EntityKind::Composition, params)? {
            SearchPlan::Scan(query) => self
                .compositions
                .repository()
                .query(query, params.next_token.as_deref()),
            SearchPlan::ArtistAttributions { artist_id, limit } => {
                let page = self.attributions.compositions_for_artist(
                    &artist_id,
                    self.compositions.repository(),
                    Some(limit as u32),
                    params.next_token.as_deref(),
                )?;
                Ok(page.map(|(_, composition)| composition).map_some())
            }
        }
    }

    /// Most popular records of a kind, best first
    pub fn popular<R: ServiceRecord>(
        &self,
        caller: &Caller,
        limit: Option<u32>,
        next_token: Option<&str>,
    ) -> Result<Page<R>> {
        self.guard(caller, RateLimitClass::Search)?;
        let query = plan_popular(R::KIND, limit)?;
        R::manager(self).repository().query(query, next_token)
    }

    // ========== Attributions ==========

    /// Record a composition–artist claim
    pub fn attribute(
        &self,
        caller: &Caller,
        composition_id: EntityId,
        artist_id: EntityId,
        attribution_type: AttributionType,
        confidence: Confidence,
    ) -> Result<Attribution> {
        self.guard(caller, RateLimitClass::Write)?;
        let editor = Self::editor(caller)?;
        self.attributions.create(
            composition_id,
            artist_id,
            attribution_type,
            confidence,
            editor,
            Timestamp::now(),
        )
    }

    /// Merge a partial update into a claim
    pub fn update_attribution(
        &self,
        caller: &Caller,
        composition_id: &EntityId,
        artist_id: &EntityId,
        patch: AttributionPatch,
    ) -> Result<Attribution> {
        self.guard(caller, RateLimitClass::Write)?;
        let editor = Self::editor(caller)?;
        self.attributions
            .update(composition_id, artist_id, patch, &editor, Timestamp::now())
    }

    /// Verify a claim, idempotently
    pub fn verify_attribution(
        &self,
        caller: &Caller,
        composition_id: &EntityId,
        artist_id: &EntityId,
    ) -> Result<Attribution> {
        self.guard(caller, RateLimitClass::Write)?;
        let verifier = Self::editor(caller)?;
        self.attributions
            .verify(composition_id, artist_id, verifier, Timestamp::now())
    }

    /// Search claims with the deterministic dispatch
    pub fn search_attributions(
        &self,
        caller: &Caller,
        params: &AttributionSearchParams,
    ) -> Result<Page<Attribution>> {
        self.guard(caller, RateLimitClass::Search)?;
        self.attributions.search(params)
    }

    /// Claims of one artist joined with their compositions
    pub fn attributions_for_artist(
        &self,
        caller: &Caller,
        artist_id: &EntityId,
        limit: Option<u32>,
        next_token: Option<&str>,
    ) -> Result<Page<(Attribution, Option<Composition>)>> {
        self.guard(caller, RateLimitClass::Search)?;
        self.attributions.compositions_for_artist(
            artist_id,
            self.compositions.repository(),
            limit,
            next_token,
        )
    }

    // ========== Engagement side effects ==========

    /// Record a view
    ///
    /// Bot traffic is a no-op: the flag decides whether the side effect
    /// is applied at all.
    pub fn record_view<R: ServiceRecord>(&self, caller: &Caller, id: &EntityId) -> Result<()> {
        if caller.is_bot {
            return Ok(());
        }
        self.guard(caller, RateLimitClass::ViewTracking)?;
        R::manager(self)
            .repository()
            .update_counters(id, |rev| rev.view_count += 1, Timestamp::now())?;
        Ok(())
    }

    /// Record a favorite
    pub fn favorite<R: ServiceRecord>(&self, caller: &Caller, id: &EntityId) -> Result<()> {
        self.guard(caller, RateLimitClass::Write)?;
        Self::editor(caller)?;
        R::manager(self)
            .repository()
            .update_counters(id, |rev| rev.favorite_count += 1, Timestamp::now())?;
        Ok(())
    }
}

/// Page helper for the artist fan-out projection
trait PageSome<T> {
    fn map_some(self) -> Page<T>;
}

impl<T> PageSome<T> for Page<Option<T>> {
    fn map_some(self) -> Page<T> {
        Page {
            items: self.items.into_iter().flatten().collect(),
            next_token: self.next_token,
            has_more: self.has_more,
        }
    }
}
