//! Opaque identifiers and the generators that mint them.
//!
//! Identifiers are string newtypes declared with `#[derive(EntityId)]`. An empty
//! identifier means "none" and is never accepted as a storage key.

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use morning_call_macros::EntityId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a new random entity identifier (UUID v4, hyphenated).
pub fn generate_entity_id() -> String {
    Uuid::new_v4().to_string()
}

/// Common behaviour of identifier newtypes.
pub trait EntityId: Sized + Clone + Eq + Hash + fmt::Display {
    /// Entity name used in repository errors and log lines.
    const ENTITY: &'static str;

    fn from_raw(raw: String) -> Self;

    fn raw(&self) -> &str;

    fn is_empty(&self) -> bool {
        self.raw().is_empty()
    }

    fn generate() -> Self {
        Self::from_raw(generate_entity_id())
    }

    fn entity_name(&self) -> &'static str {
        Self::ENTITY
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EntityId)]
#[serde(transparent)]
pub struct UserId(String);

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EntityId)]
#[serde(transparent)]
pub struct RelationshipId(String);

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EntityId)]
#[serde(transparent)]
pub struct MorningCallId(String);

/// Source of fresh identifiers, injected into the use cases.
pub trait IdGenerator: Send + Sync {
    fn next_raw(&self) -> String;
}

impl dyn IdGenerator {
    /// Mints a typed identifier.
    pub fn next_id<I: EntityId>(&self) -> I {
        I::from_raw(self.next_raw())
    }
}

/// Random UUID v4 identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_raw(&self) -> String {
        generate_entity_id()
    }
}

/// Deterministic `prefix-000001` identifiers for demos and tests.
#[derive(Debug)]
pub struct SequenceGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequenceGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequenceGenerator {
    fn next_raw(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n:06}", self.prefix)
    }
}
