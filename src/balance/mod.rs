//! Monte-Carlo loot balance harness.
//!
//! Rolls many monster deaths at a fixed level through the real drop pipeline
//! and summarises the outcome, so table or constant tweaks can be checked for
//! drop-rate and rarity drift before they ship. Batches run in parallel with
//! rayon; each batch seeds its own RNG from a SHA3 hash of the base seed, so
//! the report does not depend on thread scheduling.

use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

use crate::config::LootConfig;
use crate::loot::{self, LootTables, Rarity};
use crate::simulation::SimRng;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootBalanceConfig {
    pub base_seed: u64,
    pub kills: u64,
    pub batches: u64,
    pub monster_level: u32,
    pub loot: LootConfig,
}

impl Default for LootBalanceConfig {
    fn default() -> Self {
        Self {
            base_seed: 42,
            kills: 100_000,
            batches: 16,
            monster_level: 1,
            loot: LootConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LootBalanceReport {
    pub kills: u64,
    pub drops: u64,
    pub drop_rate: f64,
    /// Indexed by [`Rarity::index`]
    pub rarity_counts: [u64; 4],
    pub mean_affixes: f64,
}

impl LootBalanceReport {
    /// Fraction of drops with the given rarity
    pub fn rarity_share(&self, rarity: Rarity) -> f64 {
        if self.drops == 0 {
            return 0.0;
        }
        self.rarity_counts[rarity.index()] as f64 / self.drops as f64
    }
}

#[derive(Debug, Default)]
struct BatchTally {
    kills: u64,
    drops: u64,
    rarity_counts: [u64; 4],
    affixes: u64,
}

impl BatchTally {
    fn merge(mut self, other: Self) -> Self {
        self.kills += other.kills;
        self.drops += other.drops;
        self.affixes += other.affixes;
        for (mine, theirs) in self.rarity_counts.iter_mut().zip(other.rarity_counts) {
            *mine += theirs;
        }
        self
    }
}

/// Seed for batch `index`, derived from the base seed
pub fn batch_seed(base_seed: u64, index: u64) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(index.to_le_bytes());
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    u64::from_le_bytes(bytes)
}

pub fn run_loot_balance(config: &LootBalanceConfig, tables: &LootTables) -> LootBalanceReport {
    let batches = config.batches.max(1);
    let per_batch = config.kills / batches;
    let remainder = config.kills % batches;

    let tally = (0..batches)
        .into_par_iter()
        .map(|index| {
            let kills = per_batch + u64::from(index < remainder);
            let mut rng = SimRng::seed_from_u64(batch_seed(config.base_seed, index));
            let mut tally = BatchTally {
                kills,
                ..Default::default()
            };
            for _ in 0..kills {
                if let Some(item) = loot::roll_drop(&mut rng, tables, &config.loot, config.monster_level) {
                    tally.drops += 1;
                    tally.rarity_counts[item.rarity.index()] += 1;
                    tally.affixes += item.affixes.len() as u64;
                }
            }
            tally
        })
        .reduce(BatchTally::default, BatchTally::merge);

    LootBalanceReport {
        kills: tally.kills,
        drops: tally.drops,
        drop_rate: if tally.kills > 0 {
            tally.drops as f64 / tally.kills as f64
        } else {
            0.0
        },
        rarity_counts: tally.rarity_counts,
        mean_affixes: if tally.drops > 0 {
            tally.affixes as f64 / tally.drops as f64
        } else {
            0.0
        },
    }
}
