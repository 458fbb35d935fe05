//! Attribution lifecycle
//!
//! Attributions are the many-to-many relation between compositions and
//! artists, keyed by the pair. Rows are collocated with their
//! composition on the primary index, reachable by artist through GSI5,
//! and disputed claims additionally populate the sparse GSI6 scope.
//!
//! Search dispatch is deterministic: a disputed-type filter wins over
//! any supplied ids, then composition-keyed, then artist-keyed. At most
//! one index scan happens per call.

use std::sync::Arc;

use tracing::debug;

use crate::repository::{Page, Repository};
use ragamala_core::{
    slots, Attribution, AttributionPatch, AttributionType, Composition, Confidence, Cursor,
    EntityId, Error, IndexKeySet, IndexSlot, PageLimits, RecordKey, Result, Timestamp, UserId,
};
use ragamala_storage::{IndexQuery, IndexSelector, Row, Table};

/// Search input for attributions
#[derive(Debug, Clone, Default)]
pub struct AttributionSearchParams {
    /// Scope to one composition
    pub composition_id: Option<EntityId>,
    /// Scope to one artist
    pub artist_id: Option<EntityId>,
    /// Filter by claim type; `disputed` selects the dedicated scope
    pub attribution_type: Option<AttributionType>,
    /// Page size (1–100, default 20)
    pub limit: Option<u32>,
    /// Resume token from a prior page
    pub next_token: Option<String>,
}

/// Manager for the composition–artist relation
#[derive(Clone)]
pub struct AttributionManager {
    table: Arc<dyn Table>,
    limits: PageLimits,
}

impl AttributionManager {
    /// Build over the shared table
    pub fn new(table: Arc<dyn Table>) -> Self {
        AttributionManager {
            table,
            limits: PageLimits::default(),
        }
    }

    fn key(composition_id: &EntityId, artist_id: &EntityId) -> Result<ragamala_core::ItemKey> {
        Ok(RecordKey::Attribution {
            composition_id: composition_id.clone(),
            artist_id: artist_id.clone(),
        }
        .encode()?)
    }

    /// Primary partition shared by a composition and its attributions
    fn composition_partition(composition_id: &EntityId) -> Result<String> {
        Ok(RecordKey::Latest {
            kind: ragamala_core::EntityKind::Composition,
            id: composition_id.clone(),
        }
        .encode()?
        .pk)
    }

    fn row(attribution: &Attribution) -> Result<Row> {
        let mut index = IndexKeySet::empty().with(
            IndexSlot::Gsi5,
            slots::artist_ref(&attribution.artist_id, &attribution.composition_id),
        );
        if attribution.attribution_type == AttributionType::Disputed {
            index = index.with(
                IndexSlot::Gsi6,
                slots::disputed(attribution.created_at.as_micros()),
            );
        }
        Row::encode(
            Self::key(&attribution.composition_id, &attribution.artist_id)?,
            index,
            0,
            attribution,
        )
    }

    /// Record a new claim; the pair must not exist yet
    pub fn create(
        &self,
        composition_id: EntityId,
        artist_id: EntityId,
        attribution_type: AttributionType,
        confidence: Confidence,
        added_by: UserId,
        now: Timestamp,
    ) -> Result<Attribution> {
        let attribution = Attribution::new(
            composition_id,
            artist_id,
            attribution_type,
            confidence,
            added_by,
            now,
        );
        self.table.put_new(Self::row(&attribution)?).map_err(|e| {
            match e {
                Error::Conflict(_) => Error::Conflict(format!(
                    "attribution already exists: {} / {}",
                    attribution.composition_id, attribution.artist_id
                )),
                other => other,
            }
        })?;
        debug!(
            composition = %attribution.composition_id,
            artist = %attribution.artist_id,
            kind = %attribution.attribution_type,
            "attribution created"
        );
        Ok(attribution)
    }

    /// Read one claim by pair
    pub fn get(
        &self,
        composition_id: &EntityId,
        artist_id: &EntityId,
    ) -> Result<Option<Attribution>> {
        let key = Self::key(composition_id, artist_id)?;
        match self.table.get(&key)? {
            Some(row) => Ok(Some(row.decode()?)),
            None => Ok(None),
        }
    }

    fn load(&self, composition_id: &EntityId, artist_id: &EntityId) -> Result<Attribution> {
        self.get(composition_id, artist_id)?.ok_or_else(|| {
            Error::not_found("attribution", format!("{composition_id}/{artist_id}"))
        })
    }

    /// Merge a partial update into a claim
    ///
    /// Type and confidence are the only mutable claim fields; the GSI6
    /// disputed scope follows the type.
    pub fn update(
        &self,
        composition_id: &EntityId,
        artist_id: &EntityId,
        patch: AttributionPatch,
        edited_by: &UserId,
        now: Timestamp,
    ) -> Result<Attribution> {
        let mut attribution = self.load(composition_id, artist_id)?;
        if let Some(t) = patch.attribution_type {
            attribution.attribution_type = t;
        }
        if let Some(c) = patch.confidence {
            attribution.confidence = c;
        }
        attribution.updated_at = now;
        if attribution.edited_by.last() != Some(edited_by) {
            attribution.edited_by.push(edited_by.clone());
        }

        self.table.put(Self::row(&attribution)?)?;
        Ok(attribution)
    }

    /// Record a verification, idempotently
    ///
    /// An already-present verifier is a no-op (no write); type and
    /// confidence are never touched.
    pub fn verify(
        &self,
        composition_id: &EntityId,
        artist_id: &EntityId,
        verifier: UserId,
        now: Timestamp,
    ) -> Result<Attribution> {
        let mut attribution = self.load(composition_id, artist_id)?;
        if !attribution.add_verifier(verifier.clone()) {
            return Ok(attribution);
        }
        attribution.updated_at = now;
        self.table.put(Self::row(&attribution)?)?;
        debug!(
            composition = %composition_id,
            artist = %artist_id,
            verifier = %verifier,
            "attribution verified"
        );
        Ok(attribution)
    }

    /// Remove one claim
    pub fn delete(&self, composition_id: &EntityId, artist_id: &EntityId) -> Result<()> {
        let key = Self::key(composition_id, artist_id)?;
        if self.table.delete(&key)?.is_none() {
            return Err(Error::not_found(
                "attribution",
                format!("{composition_id}/{artist_id}"),
            ));
        }
        Ok(())
    }

    /// Remove every claim of one composition (cascade on entity delete)
    pub fn delete_for_composition(&self, composition_id: &EntityId) -> Result<usize> {
        let partition = Self::composition_partition(composition_id)?;

        let mut removed = 0;
        loop {
            let page = self.table.query(
                &IndexQuery::partition(IndexSelector::Primary, partition.clone(), 100)
                    .begins_with("ATTRIBUTION#"),
            )?;
            if page.rows.is_empty() {
                break;
            }
            for row in &page.rows {
                self.table.delete(&row.key)?;
                removed += 1;
            }
            if !page.has_more {
                break;
            }
        }
        Ok(removed)
    }

    /// Search claims with deterministic index dispatch
    ///
    /// `attribution_type = disputed` routes to the dedicated scope and
    /// takes precedence over any ids; otherwise a composition id keys
    /// the primary index, then an artist id keys GSI5. Non-disputed type
    /// filters are applied to the page after the single scan.
    pub fn search(&self, params: &AttributionSearchParams) -> Result<Page<Attribution>> {
        let limit = self.limits.resolve(params.limit)?;
        let token = params.next_token.as_deref();

        let (query, post_filter) = if params.attribution_type == Some(AttributionType::Disputed)
        {
            (
                IndexQuery::partition(
                    IndexSelector::Gsi(IndexSlot::Gsi6),
                    slots::disputed_partition(),
                    limit,
                ),
                None,
            )
        } else if let Some(composition_id) = &params.composition_id {
            let partition = Self::composition_partition(composition_id)?;
            (
                IndexQuery::partition(IndexSelector::Primary, partition, limit)
                    .begins_with("ATTRIBUTION#"),
                params.attribution_type,
            )
        } else if let Some(artist_id) = &params.artist_id {
            (
                IndexQuery::partition(
                    IndexSelector::Gsi(IndexSlot::Gsi5),
                    slots::artist_ref_partition(artist_id),
                    limit,
                ),
                params.attribution_type,
            )
        } else {
            return Err(Error::Validation(
                "attribution search needs a type, composition, or artist filter".into(),
            ));
        };

        let page = self.query_page(query, token)?;
        let page = match post_filter {
            Some(wanted) => {
                let mut filtered = page;
                filtered.items.retain(|a| a.attribution_type == wanted);
                filtered
            }
            None => page,
        };
        Ok(page)
    }

    /// Relation rows of one artist joined with their compositions
    ///
    /// The composition details are resolved with one batch read and
    /// reassembled in relation order, not storage order; a dangling
    /// reference yields `None` rather than dropping the claim.
    pub fn compositions_for_artist(
        &self,
        artist_id: &EntityId,
        compositions: &Repository<Composition>,
        limit: Option<u32>,
        next_token: Option<&str>,
    ) -> Result<Page<(Attribution, Option<Composition>)>> {
        let limit = self.limits.resolve(limit)?;
        let page = self.query_page(
            IndexQuery::partition(
                IndexSelector::Gsi(IndexSlot::Gsi5),
                slots::artist_ref_partition(artist_id),
                limit,
            ),
            next_token,
        )?;

        let ids: Vec<EntityId> = page
            .items
            .iter()
            .map(|a| a.composition_id.clone())
            .collect();
        let resolved = compositions.batch_get(&ids)?;

        Ok(Page {
            items: page.items.into_iter().zip(resolved).collect(),
            next_token: page.next_token,
            has_more: page.has_more,
        })
    }

    fn query_page(&self, mut query: IndexQuery, token: Option<&str>) -> Result<Page<Attribution>> {
        if let Some(token) = token {
            query.cursor = Some(Cursor::resume(
                token,
                query.index.cursor_index(),
                &query.partition,
            )?);
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
}
