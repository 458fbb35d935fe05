//! Single-table key codec
//!
//! Every record in the catalog lives in one wide-column table addressed by
//! a `pk`/`sk` pair plus six optional secondary-index key pairs. This
//! module is the only place key strings are composed or parsed.
//!
//! ## Contract
//!
//! - `RecordKey::encode` and `RecordKey::decode` are deterministic and
//!   bijective for valid inputs
//! - Identifiers must be non-empty and must not contain the `#` delimiter
//! - Version numbers start at 1; version 0 is rejected
//! - Encoding has no side effects
//!
//! ## Key shapes
//!
//! | Record             | pk                        | sk                  |
//! |--------------------|---------------------------|---------------------|
//! | versioned, latest  | `<KIND>#<id>`             | `LATEST`            |
//! | versioned, archive | `<KIND>#<id>`             | `VERSION#<nnnnnn>`  |
//! | attribution        | `COMPOSITION#<compId>`    | `ATTRIBUTION#<artistId>` |
//!
//! Secondary-index slot assignment is a static contract per record kind;
//! the builders in [`slots`] are the closed set of (kind, access pattern)
//! key shapes.

use crate::types::{EntityId, EntityKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Delimiter separating key segments
pub const DELIMITER: char = '#';

/// Sort key of the latest row of a versioned entity
pub const LATEST_SK: &str = "LATEST";

/// Sort-key prefix of archived version rows
pub const VERSION_SK_PREFIX: &str = "VERSION#";

/// Sort-key prefix of attribution rows
pub const ATTRIBUTION_SK_PREFIX: &str = "ATTRIBUTION#";

/// Key validation and parse errors
///
/// These map to the `InvalidKey` entry of the error taxonomy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// Identifier is empty
    #[error("identifier cannot be empty")]
    EmptyId,

    /// Identifier contains the key delimiter
    #[error("identifier cannot contain '#': {0:?}")]
    ContainsDelimiter(String),

    /// Version numbers start at 1
    #[error("version numbers start at 1")]
    ZeroVersion,

    /// Partition key carries an unknown kind tag
    #[error("unknown record kind tag: {0:?}")]
    UnknownKind(String),

    /// Key does not match any known shape
    #[error("malformed key: {0}")]
    Malformed(String),
}

/// Validate an identifier segment
///
/// Identifiers are rejected when empty or when they contain the key
/// delimiter; anything else (including whitespace and Unicode) is legal.
pub fn validate_id(id: &str) -> Result<(), KeyError> {
    if id.is_empty() {
        return Err(KeyError::EmptyId);
    }
    if id.contains(DELIMITER) {
        return Err(KeyError::ContainsDelimiter(id.to_string()));
    }
    Ok(())
}

/// Primary key of a table row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemKey {
    /// Partition key
    pub pk: String,
    /// Sort key
    pub sk: String,
}

impl ItemKey {
    /// Build a key from raw parts
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        ItemKey {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pk, self.sk)
    }
}

/// Logical key of a record, the closed set of key shapes
///
/// `encode`/`decode` round-trip: `decode(encode(k)) == k` for every valid
/// key, and decoding a key that was not produced by `encode` fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    /// Latest row of a versioned entity
    Latest {
        /// Record kind
        kind: EntityKind,
        /// Entity id
        id: EntityId,
    },
    /// Archived version row of a versioned entity
    Version {
        /// Record kind
        kind: EntityKind,
        /// Entity id
        id: EntityId,
        /// Version number (>= 1)
        version: u32,
    },
    /// Attribution relation row, collocated with its composition
    Attribution {
        /// Composition side of the relation
        composition_id: EntityId,
        /// Artist side of the relation
        artist_id: EntityId,
    },
}

impl RecordKey {
    /// Encode into the physical pk/sk pair
    pub fn encode(&self) -> Result<ItemKey, KeyError> {
        match self {
            RecordKey::Latest { kind, id } => {
                validate_id(id.as_str())?;
                Ok(ItemKey::new(
                    format!("{}{DELIMITER}{}", kind.tag(), id),
                    LATEST_SK,
                ))
            }
            RecordKey::Version { kind, id, version } => {
                validate_id(id.as_str())?;
                if *version == 0 {
                    return Err(KeyError::ZeroVersion);
                }
                Ok(ItemKey::new(
                    format!("{}{DELIMITER}{}", kind.tag(), id),
                    format!("{VERSION_SK_PREFIX}{version:06}"),
                ))
            }
            RecordKey::Attribution {
                composition_id,
                artist_id,
            } => {
                validate_id(composition_id.as_str())?;
                validate_id(artist_id.as_str())?;
                Ok(ItemKey::new(
                    format!(
                        "{}{DELIMITER}{}",
                        EntityKind::Composition.tag(),
                        composition_id
                    ),
                    format!("{ATTRIBUTION_SK_PREFIX}{artist_id}"),
                ))
            }
        }
    }

    /// Decode a physical key back into its logical shape
    pub fn decode(key: &ItemKey) -> Result<RecordKey, KeyError> {
        let (tag, id) = key
            .pk
            .split_once(DELIMITER)
            .ok_or_else(|| KeyError::Malformed(format!("partition key {:?}", key.pk)))?;
        let kind =
            EntityKind::from_tag(tag).ok_or_else(|| KeyError::UnknownKind(tag.to_string()))?;
        validate_id(id)?;
        let id = EntityId::new(id);

        if key.sk == LATEST_SK {
            return Ok(RecordKey::Latest { kind, id });
        }
        if let Some(version) = key.sk.strip_prefix(VERSION_SK_PREFIX) {
            let version: u32 = version
                .parse()
                .map_err(|_| KeyError::Malformed(format!("version sort key {:?}", key.sk)))?;
            if version == 0 {
                return Err(KeyError::ZeroVersion);
            }
            return Ok(RecordKey::Version { kind, id, version });
        }
        if let Some(artist) = key.sk.strip_prefix(ATTRIBUTION_SK_PREFIX) {
            if kind != EntityKind::Composition {
                return Err(KeyError::Malformed(format!(
                    "attribution under {} partition",
                    kind
                )));
            }
            validate_id(artist)?;
            return Ok(RecordKey::Attribution {
                composition_id: id,
                artist_id: EntityId::new(artist),
            });
        }
        Err(KeyError::Malformed(format!("sort key {:?}", key.sk)))
    }
}

/// One of the six secondary-index slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexSlot {
    /// Kind catalog: listings, A-Z and first-letter prefix search
    Gsi1,
    /// Popularity ranking (ascending scan yields best-first)
    Gsi2,
    /// Tradition scope
    Gsi3,
    /// Language scope
    Gsi4,
    /// Primary related entity (composition→raga, attribution→artist)
    Gsi5,
    /// Secondary related entity (composition→tala) and the sparse
    /// disputed-attribution scope
    Gsi6,
}

impl IndexSlot {
    /// All slots in order
    pub const ALL: [IndexSlot; 6] = [
        IndexSlot::Gsi1,
        IndexSlot::Gsi2,
        IndexSlot::Gsi3,
        IndexSlot::Gsi4,
        IndexSlot::Gsi5,
        IndexSlot::Gsi6,
    ];

    /// Zero-based slot position
    pub fn position(&self) -> usize {
        match self {
            IndexSlot::Gsi1 => 0,
            IndexSlot::Gsi2 => 1,
            IndexSlot::Gsi3 => 2,
            IndexSlot::Gsi4 => 3,
            IndexSlot::Gsi5 => 4,
            IndexSlot::Gsi6 => 5,
        }
    }
}

impl fmt::Display for IndexSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gsi{}", self.position() + 1)
    }
}

/// Key pair projected into one secondary-index slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKey {
    /// Index partition key
    pub pk: String,
    /// Index sort key
    pub sk: String,
}

impl IndexKey {
    /// Build an index key from raw parts
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        IndexKey {
            pk: pk.into(),
            sk: sk.into(),
        }
    }
}

/// The six secondary-index slots of one row
///
/// Absent slots are omitted from the row entirely; a row binds at most
/// one access pattern per slot, fixed by its record kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKeySet([Option<IndexKey>; 6]);

impl IndexKeySet {
    /// A set with every slot absent (archived version rows)
    pub fn empty() -> Self {
        IndexKeySet::default()
    }

    /// Bind a slot; builder-style
    pub fn with(mut self, slot: IndexSlot, key: IndexKey) -> Self {
        self.0[slot.position()] = Some(key);
        self
    }

    /// The key bound to a slot, if any
    pub fn get(&self, slot: IndexSlot) -> Option<&IndexKey> {
        self.0[slot.position()].as_ref()
    }

    /// Iterate bound slots
    pub fn iter(&self) -> impl Iterator<Item = (IndexSlot, &IndexKey)> {
        IndexSlot::ALL
            .iter()
            .filter_map(move |slot| self.get(*slot).map(|key| (*slot, key)))
    }

    /// True when no slot is bound
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Option::is_none)
    }
}

/// The closed set of secondary-index key builders
///
/// One builder per (kind, access pattern) pair. Search dispatch and row
/// encoding both go through these, so partition strings have a single
/// source of truth.
pub mod slots {
    use super::*;

    /// GSI1 partition: all latest rows of a kind, ordered by name
    pub fn kind_listing_partition(kind: EntityKind) -> String {
        format!("KIND{DELIMITER}{}", kind.as_str())
    }

    /// GSI1 key for a latest row
    pub fn kind_listing(kind: EntityKind, sort_name: &str) -> IndexKey {
        IndexKey::new(kind_listing_partition(kind), sort_name)
    }

    /// GSI2 partition: latest rows of a kind ranked by popularity
    pub fn popularity_partition(kind: EntityKind) -> String {
        format!("POPULAR{DELIMITER}{}", kind.as_str())
    }

    /// GSI2 key for a latest row
    ///
    /// The sort key stores the inverted zero-padded score so a plain
    /// ascending scan returns best-first.
    pub fn popularity(kind: EntityKind, score: u64) -> IndexKey {
        IndexKey::new(
            popularity_partition(kind),
            format!("{:020}", u64::MAX - score),
        )
    }

    /// GSI3 partition: latest rows of a kind within one tradition
    pub fn tradition_partition(kind: EntityKind, tradition: &str) -> String {
        format!("{}{DELIMITER}TRADITION{DELIMITER}{tradition}", kind.as_str())
    }

    /// GSI3 key for a latest row
    pub fn tradition(kind: EntityKind, tradition_name: &str, sort_name: &str) -> IndexKey {
        IndexKey::new(tradition_partition(kind, tradition_name), sort_name)
    }

    /// GSI4 partition: latest rows of a kind in one language
    pub fn language_partition(kind: EntityKind, language: &str) -> String {
        format!("{}{DELIMITER}LANGUAGE{DELIMITER}{language}", kind.as_str())
    }

    /// GSI4 key for a latest row
    pub fn language(kind: EntityKind, language_name: &str, sort_name: &str) -> IndexKey {
        IndexKey::new(language_partition(kind, language_name), sort_name)
    }

    /// GSI5 partition: compositions set in one raga
    pub fn raga_ref_partition(raga_id: &EntityId) -> String {
        format!("{}{DELIMITER}{raga_id}", EntityKind::Raga.tag())
    }

    /// GSI5 key for a composition latest row
    pub fn raga_ref(raga_id: &EntityId, sort_name: &str) -> IndexKey {
        IndexKey::new(raga_ref_partition(raga_id), sort_name)
    }

    /// GSI5 partition: attributions of one artist
    pub fn artist_ref_partition(artist_id: &EntityId) -> String {
        format!("{}{DELIMITER}{artist_id}", EntityKind::Artist.tag())
    }

    /// GSI5 key for an attribution row, sorted by composition id
    pub fn artist_ref(artist_id: &EntityId, composition_id: &EntityId) -> IndexKey {
        IndexKey::new(
            artist_ref_partition(artist_id),
            format!(
                "{}{DELIMITER}{composition_id}",
                EntityKind::Composition.tag()
            ),
        )
    }

    /// GSI6 partition: compositions set in one tala
    pub fn tala_ref_partition(tala_id: &EntityId) -> String {
        format!("{}{DELIMITER}{tala_id}", EntityKind::Tala.tag())
    }

    /// GSI6 key for a composition latest row
    pub fn tala_ref(tala_id: &EntityId, sort_name: &str) -> IndexKey {
        IndexKey::new(tala_ref_partition(tala_id), sort_name)
    }

    /// GSI6 partition: the sparse disputed-attribution scope
    pub fn disputed_partition() -> String {
        format!("ATTRTYPE{DELIMITER}disputed")
    }

    /// GSI6 key for a disputed attribution row, sorted by creation time
    pub fn disputed(created_at_micros: u64) -> IndexKey {
        IndexKey::new(disputed_partition(), format!("{created_at_micros:020}"))
    }
}
