//! Identity types for catalog records
//!
//! This module defines the foundational identity types:
//! - EntityKind: discriminator for the four versioned record kinds
//! - EntityId: identifier for a catalog entity
//! - UserId: opaque identifier for an already-authenticated caller

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Record kind discriminator
///
/// The catalog stores four versioned entity kinds in one table.
/// The kind selects the key shapes and the secondary-index slot
/// contract for a record; it is a static property of each record
/// type, never negotiated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A musical composition (kriti, varnam, bhajan, ...)
    Composition,
    /// A composer or performing artist
    Artist,
    /// A melodic framework
    Raga,
    /// A rhythmic cycle
    Tala,
}

impl EntityKind {
    /// All kinds, in a fixed order
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Composition,
        EntityKind::Artist,
        EntityKind::Raga,
        EntityKind::Tala,
    ];

    /// Lowercase name used in index partition values
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Composition => "composition",
            EntityKind::Artist => "artist",
            EntityKind::Raga => "raga",
            EntityKind::Tala => "tala",
        }
    }

    /// Uppercase tag used in primary-key partition values
    pub fn tag(&self) -> &'static str {
        match self {
            EntityKind::Composition => "COMPOSITION",
            EntityKind::Artist => "ARTIST",
            EntityKind::Raga => "RAGA",
            EntityKind::Tala => "TALA",
        }
    }

    /// Parse a kind from its primary-key tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "COMPOSITION" => Some(EntityKind::Composition),
            "ARTIST" => Some(EntityKind::Artist),
            "RAGA" => Some(EntityKind::Raga),
            "TALA" => Some(EntityKind::Tala),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier for a catalog entity
///
/// Ids are opaque strings. Generated ids are UUID v4; imported data may
/// carry externally assigned ids. The key codec rejects ids that are
/// empty or contain the key delimiter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create an id from an externally assigned string
    pub fn new(id: impl Into<String>) -> Self {
        EntityId(id.into())
    }

    /// Generate a fresh random id (UUID v4)
    pub fn generate() -> Self {
        EntityId(Uuid::new_v4().to_string())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the default (unassigned) id
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId(s)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier for an already-authenticated caller
///
/// The catalog never authenticates; it records whatever identity the
/// caller layer resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a resolved user identity
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    /// The identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
