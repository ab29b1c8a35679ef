//! Synthetic identifiers for nodes stored without an explicit `@id`.
//!
//! The allocator is an explicit object owned by one encoder, so concurrent
//! encodes never share state. Identifiers are 128 random bits rendered as
//! hex, which keeps them unique across encoders within a process run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::value::Reference;

/// Allocates identifiers for anonymous nodes.
///
/// # Invariants
///
/// - Every allocated identifier is a valid `Reference` (32 hex digits).
#[derive(Debug)]
pub struct IdAllocator {
    rng: StdRng,
}

impl IdAllocator {
    /// Create an allocator seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create a deterministic allocator, for reproducible output.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Allocate a fresh identifier.
    pub fn next_id(&mut self) -> Reference {
        let bits: u128 = self.rng.random();
        Reference::from_word(format!("{bits:032x}"))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
