//! Domain entities
//!
//! Four versioned entity kinds (Composition, Artist, Raga, Tala) share
//! the `Revision` metadata block; `Attribution` is the unversioned
//! many-to-many relation between compositions and artists.
//!
//! Row bodies serialize with camelCase field names — the wire shape of
//! the wide-column table the catalog fronts.

use crate::normalize;
use crate::timestamp::Timestamp;
use crate::types::{EntityId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weight of one favorite relative to one view in the popularity score
const FAVORITE_WEIGHT: u64 = 10;

/// Version metadata shared by every versioned entity
///
/// ## Invariants
///
/// - `version` starts at 1 and is monotonically increasing, never reused
/// - `created_at` is set once and never mutated afterwards
/// - `edited_by` is append-only and never has two equal consecutive
///   entries
/// - exactly one row per entity id carries `is_latest = true`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
    /// Version number of this content
    pub version: u32,
    /// Creation time of the entity (not of this version)
    pub created_at: Timestamp,
    /// Time of the last write touching this row
    pub updated_at: Timestamp,
    /// User who created the entity
    pub added_by: UserId,
    /// Ordered editors, append-only
    pub edited_by: Vec<UserId>,
    /// Number of recorded (non-bot) views
    pub view_count: u64,
    /// Number of recorded favorites
    pub favorite_count: u64,
    /// Derived ranking score
    pub popularity_score: u64,
    /// True only on the authoritative latest row
    pub is_latest: bool,
}

impl Revision {
    /// Metadata for a freshly created entity
    pub fn new(added_by: UserId, now: Timestamp) -> Self {
        Revision {
            version: 1,
            created_at: now,
            updated_at: now,
            edited_by: vec![added_by.clone()],
            added_by,
            view_count: 0,
            favorite_count: 0,
            popularity_score: 0,
            is_latest: true,
        }
    }

    /// Record an edit: bump `updated_at`, append the editor unless they
    /// are already the most recent entry
    pub fn touch(&mut self, editor: &UserId, now: Timestamp) {
        self.updated_at = now;
        if self.edited_by.last() != Some(editor) {
            self.edited_by.push(editor.clone());
        }
    }

    /// Recompute the ranking score from the counters
    pub fn recompute_popularity(&mut self) {
        self.popularity_score = self
            .view_count
            .saturating_add(self.favorite_count.saturating_mul(FAVORITE_WEIGHT));
    }
}

/// A musical composition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composition {
    /// Entity id
    pub id: EntityId,
    /// Title, normalized at write time
    pub title: String,
    /// Canonical language name
    pub language: String,
    /// Canonical tradition name
    pub tradition: String,
    /// Raga the composition is set in
    pub raga_id: EntityId,
    /// Tala the composition is set in
    pub tala_id: EntityId,
    /// Lyrics, where contributed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
    /// Meaning / translation, where contributed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    /// Version metadata
    #[serde(flatten)]
    pub revision: Revision,
}

impl Composition {
    /// Draft a new composition
    pub fn new(
        title: impl Into<String>,
        language: impl Into<String>,
        tradition: impl Into<String>,
        raga_id: EntityId,
        tala_id: EntityId,
        added_by: UserId,
    ) -> Self {
        Composition {
            id: EntityId::default(),
            title: title.into(),
            language: language.into(),
            tradition: tradition.into(),
            raga_id,
            tala_id,
            lyrics: None,
            meaning: None,
            revision: Revision::new(added_by, Timestamp::now()),
        }
    }

    /// Normalize free-text fields to their stored forms
    pub fn normalize(&mut self) {
        self.title = normalize::clean_text(&self.title);
        self.language = normalize::canonical_language(&self.language);
        self.tradition = normalize::canonical_tradition(&self.tradition);
    }
}

/// A composer or performing artist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    /// Entity id
    pub id: EntityId,
    /// Name, normalized at write time
    pub name: String,
    /// Canonical tradition name
    pub tradition: String,
    /// Era label ("18th century", "contemporary", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    /// Short biography
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Year of birth, where known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,
    /// Year of death, where known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub death_year: Option<i32>,
    /// Version metadata
    #[serde(flatten)]
    pub revision: Revision,
}

impl Artist {
    /// Draft a new artist
    pub fn new(
        name: impl Into<String>,
        tradition: impl Into<String>,
        added_by: UserId,
    ) -> Self {
        Artist {
            id: EntityId::default(),
            name: name.into(),
            tradition: tradition.into(),
            period: None,
            bio: None,
            birth_year: None,
            death_year: None,
            revision: Revision::new(added_by, Timestamp::now()),
        }
    }

    /// Normalize free-text fields to their stored forms
    pub fn normalize(&mut self) {
        self.name = normalize::clean_text(&self.name);
        self.tradition = normalize::canonical_tradition(&self.tradition);
    }
}

/// A melodic framework
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Raga {
    /// Entity id
    pub id: EntityId,
    /// Name, normalized at write time
    pub name: String,
    /// Canonical tradition name
    pub tradition: String,
    /// Melakarta (parent scale) number, for Carnatic ragas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub melakarta: Option<u8>,
    /// Ascending scale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arohanam: Option<String>,
    /// Descending scale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avarohanam: Option<String>,
    /// Version metadata
    #[serde(flatten)]
    pub revision: Revision,
}

impl Raga {
    /// Draft a new raga
    pub fn new(
        name: impl Into<String>,
        tradition: impl Into<String>,
        added_by: UserId,
    ) -> Self {
        Raga {
            id: EntityId::default(),
            name: name.into(),
            tradition: tradition.into(),
            melakarta: None,
            arohanam: None,
            avarohanam: None,
            revision: Revision::new(added_by, Timestamp::now()),
        }
    }

    /// Normalize free-text fields to their stored forms
    pub fn normalize(&mut self) {
        self.name = normalize::clean_text(&self.name);
        self.tradition = normalize::canonical_tradition(&self.tradition);
    }
}

/// A rhythmic cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tala {
    /// Entity id
    pub id: EntityId,
    /// Name, normalized at write time
    pub name: String,
    /// Canonical tradition name
    pub tradition: String,
    /// Beats per cycle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aksharas: Option<u32>,
    /// Structural description of the cycle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angas: Option<String>,
    /// Version metadata
    #[serde(flatten)]
    pub revision: Revision,
}

impl Tala {
    /// Draft a new tala
    pub fn new(
        name: impl Into<String>,
        tradition: impl Into<String>,
        added_by: UserId,
    ) -> Self {
        Tala {
            id: EntityId::default(),
            name: name.into(),
            tradition: tradition.into(),
            aksharas: None,
            angas: None,
            revision: Revision::new(added_by, Timestamp::now()),
        }
    }

    /// Normalize free-text fields to their stored forms
    pub fn normalize(&mut self) {
        self.name = normalize::clean_text(&self.name);
        self.tradition = normalize::canonical_tradition(&self.tradition);
    }
}

/// Nature of a composition–artist claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributionType {
    /// The generally accepted attribution
    Primary,
    /// Contested between scholars or schools
    Disputed,
    /// A credible alternative claim
    Alternative,
    /// Attributed by oral tradition
    Traditional,
}

impl fmt::Display for AttributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AttributionType::Primary => "primary",
            AttributionType::Disputed => "disputed",
            AttributionType::Alternative => "alternative",
            AttributionType::Traditional => "traditional",
        };
        f.write_str(s)
    }
}

/// Confidence in an attribution claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Well documented
    High,
    /// Plausible but thinly sourced
    Medium,
    /// Speculative
    Low,
}

/// A claim linking a composition to a contributing artist
///
/// Keyed by `(composition_id, artist_id)`; the pair is unique.
/// `verified_by` is an ordered, append-only, deduplicated set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    /// Composition side of the relation
    pub composition_id: EntityId,
    /// Artist side of the relation
    pub artist_id: EntityId,
    /// Nature of the claim
    pub attribution_type: AttributionType,
    /// Confidence in the claim
    pub confidence: Confidence,
    /// User who recorded the claim
    pub added_by: UserId,
    /// When the claim was recorded
    pub created_at: Timestamp,
    /// Time of the last write touching this row
    pub updated_at: Timestamp,
    /// Editors of the claim metadata, append-only
    pub edited_by: Vec<UserId>,
    /// Users who verified the claim, ordered, deduplicated
    pub verified_by: Vec<UserId>,
}

impl Attribution {
    /// Record a new claim
    pub fn new(
        composition_id: EntityId,
        artist_id: EntityId,
        attribution_type: AttributionType,
        confidence: Confidence,
        added_by: UserId,
        now: Timestamp,
    ) -> Self {
        Attribution {
            composition_id,
            artist_id,
            attribution_type,
            confidence,
            edited_by: vec![added_by.clone()],
            added_by,
            created_at: now,
            updated_at: now,
            verified_by: Vec::new(),
        }
    }

    /// Append a verifier, once
    ///
    /// Returns true when the verifier was newly added; appending an
    /// already-present verifier is a no-op.
    pub fn add_verifier(&mut self, verifier: UserId) -> bool {
        if self.verified_by.contains(&verifier) {
            return false;
        }
        self.verified_by.push(verifier);
        true
    }
}

/// Partial update for an attribution
///
/// Type and confidence are the only mutable claim fields; everything
/// else is metadata maintained by the manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributionPatch {
    /// New claim type, if changing
    pub attribution_type: Option<AttributionType>,
    /// New confidence, if changing
    pub confidence: Option<Confidence>,
}
