//! The record trait binding entities to the table
//!
//! `CatalogRecord` is what the generic repository is parameterized by:
//! each versioned entity type declares its kind tag, exposes its id and
//! revision metadata, and builds its secondary-index keys. The slot
//! assignment implemented here is the static per-kind contract — one
//! access pattern per slot, decided at compile time.

use ragamala_core::{
    slots, Artist, Composition, EntityId, EntityKind, IndexKeySet, IndexSlot, Raga, Revision, Tala,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A versioned entity stored in the catalog table
pub trait CatalogRecord:
    Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
    /// Kind tag selecting key shapes and index slots
    const KIND: EntityKind;

    /// Entity id
    fn id(&self) -> &EntityId;

    /// Assign the id (used once, when a draft has none)
    fn set_id(&mut self, id: EntityId);

    /// Version metadata
    fn revision(&self) -> &Revision;

    /// Version metadata, mutable
    fn revision_mut(&mut self) -> &mut Revision;

    /// The name or title rows are sorted by in listings
    fn display_name(&self) -> &str;

    /// Normalize free-text fields to their stored forms
    fn normalize(&mut self);

    /// Secondary-index keys of the latest row
    ///
    /// Archived version rows never call this; they carry no index keys.
    fn index_keys(&self) -> IndexKeySet;
}

impl CatalogRecord for Composition {
    const KIND: EntityKind = EntityKind::Composition;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn revision(&self) -> &Revision {
        &self.revision
    }

    fn revision_mut(&mut self) -> &mut Revision {
        &mut self.revision
    }

    fn display_name(&self) -> &str {
        &self.title
    }

    fn normalize(&mut self) {
        Composition::normalize(self);
    }

    fn index_keys(&self) -> IndexKeySet {
        let kind = Self::KIND;
        let mut keys = IndexKeySet::empty()
            .with(IndexSlot::Gsi1, slots::kind_listing(kind, &self.title))
            .with(
                IndexSlot::Gsi2,
                slots::popularity(kind, self.revision.popularity_score),
            )
            .with(
                IndexSlot::Gsi3,
                slots::tradition(kind, &self.tradition, &self.title),
            )
            .with(
                IndexSlot::Gsi4,
                slots::language(kind, &self.language, &self.title),
            );
        if !self.raga_id.is_empty() {
            keys = keys.with(IndexSlot::Gsi5, slots::raga_ref(&self.raga_id, &self.title));
        }
        if !self.tala_id.is_empty() {
            keys = keys.with(IndexSlot::Gsi6, slots::tala_ref(&self.tala_id, &self.title));
        }
        keys
    }
}

impl CatalogRecord for Artist {
    const KIND: EntityKind = EntityKind::Artist;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn revision(&self) -> &Revision {
        &self.revision
    }

    fn revision_mut(&mut self) -> &mut Revision {
        &mut self.revision
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn normalize(&mut self) {
        Artist::normalize(self);
    }

    fn index_keys(&self) -> IndexKeySet {
        let kind = Self::KIND;
        IndexKeySet::empty()
            .with(IndexSlot::Gsi1, slots::kind_listing(kind, &self.name))
            .with(
                IndexSlot::Gsi2,
                slots::popularity(kind, self.revision.popularity_score),
            )
            .with(
                IndexSlot::Gsi3,
                slots::tradition(kind, &self.tradition, &self.name),
            )
    }
}

impl CatalogRecord for Raga {
    const KIND: EntityKind = EntityKind::Raga;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn revision(&self) -> &Revision {
        &self.revision
    }

    fn revision_mut(&mut self) -> &mut Revision {
        &mut self.revision
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn normalize(&mut self) {
        Raga::normalize(self);
    }

    fn index_keys(&self) -> IndexKeySet {
        let kind = Self::KIND;
        IndexKeySet::empty()
            .with(IndexSlot::Gsi1, slots::kind_listing(kind, &self.name))
            .with(
                IndexSlot::Gsi2,
                slots::popularity(kind, self.revision.popularity_score),
            )
            .with(
                IndexSlot::Gsi3,
                slots::tradition(kind, &self.tradition, &self.name),
            )
    }
}

impl CatalogRecord for Tala {
    const KIND: EntityKind = EntityKind::Tala;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn revision(&self) -> &Revision {
        &self.revision
    }

    fn revision_mut(&mut self) -> &mut Revision {
        &mut self.revision
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn normalize(&mut self) {
        Tala::normalize(self);
    }

    fn index_keys(&self) -> IndexKeySet {
        let kind = Self::KIND;
        IndexKeySet::empty()
            .with(IndexSlot::Gsi1, slots::kind_listing(kind, &self.name))
            .with(
                IndexSlot::Gsi2,
                slots::popularity(kind, self.revision.popularity_score),
            )
            .with(
                IndexSlot::Gsi3,
                slots::tradition(kind, &self.tradition, &self.name),
            )
    }
}
