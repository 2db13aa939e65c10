//! Entity type and identifier generation.
//!
//! An [`Entity`] is an opaque UUID with no inherent data. Whether an entity
//! "exists" is decided by the pools: it exists in a pool when that pool stores
//! a component for it, and exists in the registry when any pool does.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique entity identifier.
///
/// Entities are pure identifiers. Uniqueness is probabilistic over the
/// 122 random bits of a version-4 UUID and is treated as global for the
/// lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub Uuid);

impl Entity {
    /// The nil entity sentinel. Never produced by a generator.
    pub const NIL: Entity = Entity(Uuid::nil());

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn uuid(self) -> Uuid {
        self.0
    }

    /// Returns `true` if this is the nil entity.
    #[must_use]
    pub fn is_nil(self) -> bool {
        self.0.is_nil()
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Source of fresh entity identifiers.
///
/// The registry owns exactly one generator. Threads that need to mint
/// identifiers on their own should each hold an independently seeded
/// instance rather than sharing one.
pub trait EntityGenerator {
    /// Returns a new identifier, distinct from every previous one.
    fn next_entity(&mut self) -> Entity;
}

/// Generates random (version 4) UUID entities.
///
/// By default the bytes come from the operating system via
/// [`Uuid::new_v4`]. A seeded generator draws them from a [`StdRng`]
/// instead, which makes identifier sequences reproducible.
#[derive(Debug, Default)]
pub struct UuidGenerator {
    rng: Option<StdRng>,
}

impl UuidGenerator {
    /// Creates a generator backed by OS randomness.
    #[must_use]
    pub fn new() -> Self {
        Self { rng: None }
    }

    /// Creates a deterministic generator from a 64-bit seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }
}

impl EntityGenerator for UuidGenerator {
    fn next_entity(&mut self) -> Entity {
        let uuid = match &mut self.rng {
            Some(rng) => {
                let mut bytes = [0u8; 16];
                rng.fill_bytes(&mut bytes);
                uuid::Builder::from_random_bytes(bytes).into_uuid()
            }
            None => Uuid::new_v4(),
        };
        Entity(uuid)
    }
}
