//! Seed management for layer generation
//!
//! Every layer gets its own seed. Explicit seeds (numbers or text) are hashed
//! together with the layer name so that two layers configured with the same
//! seed still produce different maps; random seeds come from the wall clock.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A seed as written in the settings file: `seed = 42` or `seed = "caves"`.
///
/// Numbers are `i64`, the integer range TOML can hold, so negative seeds parse
/// and every seed written back out round-trips.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedSource {
    Number(i64),
    Text(String),
}

impl Default for SeedSource {
    fn default() -> Self {
        SeedSource::Number(0)
    }
}

impl std::fmt::Display for SeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedSource::Number(n) => write!(f, "{}", n),
            SeedSource::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Derive a sub-seed from a source value and a system name.
/// Uses hashing to ensure different systems get different but deterministic seeds.
pub fn derive_seed<H: Hash + ?Sized>(source: &H, system: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    system.hash(&mut hasher);
    hasher.finish()
}

/// Name used when deriving the seed of layer `index`.
pub fn layer_system(index: usize) -> String {
    format!("layer-{}", index)
}

/// Resolve the seed for one layer.
pub fn resolve_layer_seed(source: &SeedSource, random_seed: bool, index: usize) -> u64 {
    if random_seed {
        clock_seed(index)
    } else {
        derive_seed(source, &layer_system(index))
    }
}

/// Fresh seed from the current wall-clock time.
pub fn clock_seed(index: usize) -> u64 {
    let now = chrono::Utc::now();
    let nanos = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp_micros());
    derive_seed(&nanos, &layer_system(index))
}
