//! Versioned jitter derivation.
//!
//! The mapping from object identity to jitter slots is a compatibility
//! contract with operators: a given object must land on the same minute, hour
//! and day across controller upgrades. Changing the mapping means adding a new
//! [`JitterScheme`] variant, never editing an existing one.
//!
//! # Scheme `fnv64a-v1`
//!
//! ```text
//! seed = FNV-1a 64(utf8("<namespace>/<name>:backup")) as i64
//! src  = additive lagged Fibonacci source (607/273) seeded with `seed`
//!
//! minute       = src.below(60)
//! hour         = src.below(24)
//! day_of_week  = src.below(7)          (0 = Sunday)
//! day_of_month = 1 + src.below(28)     (exists in every month)
//! ```
//!
//! Draws are taken in that order whatever the macro, so the weekly and
//! monthly expansions share minute and hour with the daily one.

use std::hash::Hasher;

use fnv::FnvHasher;
use serde::{Deserialize, Serialize};

use super::source::AdditiveSource;
use super::ObjectIdentity;

/// Appended to the identity key before hashing. Existing objects were placed
/// with this key, so it is part of the scheme.
const SEED_SUFFIX: &str = ":backup";

/// Jittered schedule slots derived from one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JitterSlots {
    /// 0..=59
    pub minute: u8,
    /// 0..=23
    pub hour: u8,
    /// 0..=6, 0 is Sunday
    pub day_of_week: u8,
    /// 1..=28
    pub day_of_month: u8,
}

/// A fixed, documented identity-to-slots mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum JitterScheme {
    #[default]
    #[serde(rename = "fnv64a-v1")]
    V1,
}

impl JitterScheme {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "fnv64a-v1",
        }
    }

    pub fn derive(&self, identity: &ObjectIdentity) -> JitterSlots {
        match self {
            Self::V1 => {
                let mut source = AdditiveSource::new(self.seed(identity));
                JitterSlots {
                    minute: source.below(60),
                    hour: source.below(24),
                    day_of_week: source.below(7),
                    day_of_month: 1 + source.below(28),
                }
            }
        }
    }

    /// Seed the slots are drawn from.
    pub fn seed(&self, identity: &ObjectIdentity) -> i64 {
        match self {
            Self::V1 => {
                let mut hasher = FnvHasher::default();
                hasher.write(identity.as_str().as_bytes());
                hasher.write(SEED_SUFFIX.as_bytes());
                hasher.finish() as i64
            }
        }
    }

    /// Seed as big-endian hex, for diagnostics.
    pub fn seed_hex(&self, identity: &ObjectIdentity) -> String {
        hex::encode(self.seed(identity).to_be_bytes())
    }
}

impl std::fmt::Display for JitterScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
