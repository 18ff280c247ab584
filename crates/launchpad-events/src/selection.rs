//! Probability rolls and rarity-weighted selection.
//!
//! Rolls are Bernoulli draws at the full precision of the rate. A rate at
//! or below `0` never fires and a rate at or above `1` always does, without
//! touching the generator.
//!
//! Weighted picking replicates each eligible event `weight` times into a
//! pool and draws uniformly from it. Catalogs are small, so the pool stays
//! in the low hundreds of entries.

use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use launchpad_types::Rarity;

use crate::catalog::Event;

/// Relative selection weight per rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityWeights {
    /// Weight of common events.
    pub common: u32,
    /// Weight of uncommon events.
    pub uncommon: u32,
    /// Weight of rare events.
    pub rare: u32,
    /// Weight of epic events.
    pub epic: u32,
}

impl Default for RarityWeights {
    fn default() -> Self {
        Self {
            common: 50,
            uncommon: 30,
            rare: 15,
            epic: 5,
        }
    }
}

impl RarityWeights {
    /// Weight for one rarity.
    pub const fn weight(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
        }
    }
}

/// Return `true` with the given probability.
pub fn roll_probability(probability: Decimal, rng: &mut impl Rng) -> bool {
    if probability <= Decimal::ZERO {
        return false;
    }
    if probability >= Decimal::ONE {
        return true;
    }
    probability.to_f64().is_some_and(|p| rng.random_bool(p))
}

/// Replicate each candidate `weight(rarity)` times.
pub fn build_pool<'a>(candidates: &[&'a Event], weights: &RarityWeights) -> Vec<&'a Event> {
    let mut pool = Vec::new();
    for &event in candidates {
        let copies = usize::try_from(weights.weight(event.rarity)).unwrap_or(0);
        pool.extend(std::iter::repeat_n(event, copies));
    }
    pool
}

/// Pick one event from `candidates` by drawing uniformly from the pool
/// built by [`build_pool`].
///
/// Returns `None` when there are no candidates or every weight is zero.
pub fn pick_weighted<'a>(
    candidates: &[&'a Event],
    weights: &RarityWeights,
    rng: &mut impl Rng,
) -> Option<&'a Event> {
    let pool = build_pool(candidates, weights);
    if pool.is_empty() {
        return None;
    }
    let idx = rng.random_range(0..pool.len());
    pool.get(idx).copied()
}
