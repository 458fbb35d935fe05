//! Deterministic index dispatch
//!
//! One search call resolves to exactly one plan. The priority when
//! several filters are supplied is fixed:
//!
//! `query` > `tradition` > `language` > `artist_id` > `raga_id` >
//! `tala_id` > plain listing
//!
//! Branches are mutually exclusive; the artist branch routes through
//! the attribution relation instead of a direct entity scan, every
//! other branch is a single secondary-index query.

use crate::params::SearchParams;
use ragamala_core::{normalize, slots, EntityId, EntityKind, IndexSlot, PageLimits, Result};
use ragamala_storage::{IndexQuery, IndexSelector};

/// The branch a search call resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPlan {
    /// One secondary-index scan
    Scan(IndexQuery),
    /// Relation fan-out: attributions of the artist, then a batch read
    ArtistAttributions {
        /// The artist whose attributions key the scan
        artist_id: EntityId,
        /// Resolved page size
        limit: usize,
    },
}

/// Resolve parameters into a plan for one entity kind
///
/// Normalization happens here, before dispatch: free text is trimmed
/// and collapsed (text that normalizes to nothing is no filter at all),
/// languages map to their canonical capitalization, traditions are
/// title-cased. The returned scan still needs the caller's resume token
/// applied by the repository.
pub fn plan(kind: EntityKind, params: &SearchParams) -> Result<SearchPlan> {
    let limit = PageLimits::default().resolve(params.limit)?;

    let query_text = params
        .query
        .as_deref()
        .map(normalize::clean_text)
        .filter(|q| !q.is_empty());

    if let Some(prefix) = query_text {
        return Ok(SearchPlan::Scan(
            IndexQuery::partition(
                IndexSelector::Gsi(IndexSlot::Gsi1),
                slots::kind_listing_partition(kind),
                limit,
            )
            .begins_with(prefix),
        ));
    }

    if let Some(tradition) = params.tradition.as_deref() {
        let tradition = normalize::canonical_tradition(tradition);
        return Ok(SearchPlan::Scan(IndexQuery::partition(
            IndexSelector::Gsi(IndexSlot::Gsi3),
            slots::tradition_partition(kind, &tradition),
            limit,
        )));
    }

    if let Some(language) = params.language.as_deref() {
        let language = normalize::canonical_language(language);
        return Ok(SearchPlan::Scan(IndexQuery::partition(
            IndexSelector::Gsi(IndexSlot::Gsi4),
            slots::language_partition(kind, &language),
            limit,
        )));
    }

    if let Some(artist_id) = &params.artist_id {
        return Ok(SearchPlan::ArtistAttributions {
            artist_id: artist_id.clone(),
            limit,
        });
    }

    if let Some(raga_id) = &params.raga_id {
        return Ok(SearchPlan::Scan(IndexQuery::partition(
            IndexSelector::Gsi(IndexSlot::Gsi5),
            slots::raga_ref_partition(raga_id),
            limit,
        )));
    }

    if let Some(tala_id) = &params.tala_id {
        return Ok(SearchPlan::Scan(IndexQuery::partition(
            IndexSelector::Gsi(IndexSlot::Gsi6),
            slots::tala_ref_partition(tala_id),
            limit,
        )));
    }

    Ok(SearchPlan::Scan(IndexQuery::partition(
        IndexSelector::Gsi(IndexSlot::Gsi1),
        slots::kind_listing_partition(kind),
        limit,
    )))
}

/// Plan the popularity ranking for a kind
///
/// Always a single scan: the popularity slot stores inverted scores, so
/// the ascending scan already yields best-first.
pub fn plan_popular(kind: EntityKind, limit: Option<u32>) -> Result<IndexQuery> {
    let limit = PageLimits::default().resolve(limit)?;
    Ok(IndexQuery::partition(
        IndexSelector::Gsi(IndexSlot::Gsi2),
        slots::popularity_partition(kind),
        limit,
    ))
}
