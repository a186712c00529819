//! Loot generation.
//!
//! Each drained monster death rolls for a drop. A drop picks a rarity from
//! level-scaled weights, a base item valid for the monster level, then a
//! rarity-dependent number of distinct affixes. The result is spawned as a
//! ground item entity carrying only a position and its `ItemData`.

use bevy::prelude::*;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::LootConfig;
use crate::constants::RARITY_LEVEL_FLOOR;
use crate::ecs::{DeathEvent, EntityId};
use crate::simulation::Simulation;

pub mod tables;

pub use tables::{AffixDef, AffixTier, BaseItem, LootTables};

/// Item rarity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Magic,
    Rare,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Magic, Rarity::Rare, Rarity::Legendary];

    /// Inclusive affix count range
    pub fn affix_range(self) -> (usize, usize) {
        match self {
            Self::Common => (0, 0),
            Self::Magic => (1, 2),
            Self::Rare => (3, 4),
            Self::Legendary => (4, 6),
        }
    }

    pub fn base_weight(self) -> f32 {
        match self {
            Self::Common => 100.0,
            Self::Magic => 30.0,
            Self::Rare => 8.0,
            Self::Legendary => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Magic => "Magic",
            Self::Rare => "Rare",
            Self::Legendary => "Legendary",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// One rolled affix on an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffixRoll {
    pub affix_id: String,
    pub value: i32,
}

/// A generated item. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    pub base_item_id: String,
    pub name: String,
    pub rarity: Rarity,
    pub level: u32,
    pub affixes: Vec<AffixRoll>,
}

/// A ground item spawned this tick
#[derive(Event, Debug, Clone, PartialEq)]
pub struct LootDropped {
    pub entity: EntityId,
    pub position: Vec3,
    pub item: ItemData,
}

/// Unclamped drop chance for a monster of `level`. Exceeds 1.0 from level 70
/// with the default config.
pub fn drop_chance(config: &LootConfig, level: u32) -> f32 {
    config.base_drop_chance + level as f32 * config.drop_chance_per_level
}

/// Roll against the drop chance, clamped to `[0, 1]` before comparing
pub fn rolls_drop<R: Rng + ?Sized>(rng: &mut R, config: &LootConfig, level: u32) -> bool {
    let chance = drop_chance(config, level).clamp(0.0, 1.0);
    rng.gen::<f32>() < chance
}

/// Weights indexed by [`Rarity::index`]. A negative modifier is treated as zero.
pub fn rarity_weights(level: u32, modifier: f32) -> [f32; 4] {
    let boost = 1.0 + modifier.max(0.0);
    let mut weights = Rarity::ALL.map(|r| match r {
        Rarity::Common => r.base_weight(),
        _ => r.base_weight() * boost,
    });
    if level > RARITY_LEVEL_FLOOR {
        let over = (level - RARITY_LEVEL_FLOOR) as f32;
        weights[Rarity::Magic.index()] += over;
        weights[Rarity::Rare.index()] += over * 0.5;
    }
    weights
}

pub fn roll_rarity<R: Rng + ?Sized>(rng: &mut R, level: u32, modifier: f32) -> Rarity {
    match WeightedIndex::new(rarity_weights(level, modifier)) {
        Ok(dist) => Rarity::ALL[dist.sample(rng)],
        Err(_) => Rarity::Common,
    }
}

/// Build an item of `rarity` for `level`. `None` when no base item drops at
/// that level.
pub fn generate_item<R: Rng + ?Sized>(
    rng: &mut R,
    tables: &LootTables,
    rarity: Rarity,
    level: u32,
) -> Option<ItemData> {
    let base = *tables.base_items_for(level).choose(rng)?;

    let (min_affixes, max_affixes) = rarity.affix_range();
    let wanted = rng.gen_range(min_affixes..=max_affixes);
    let pool = tables.affixes_for(level);
    let count = wanted.min(pool.len());

    let mut chosen = Vec::with_capacity(count);
    let mut affixes = Vec::with_capacity(count);
    for index in rand::seq::index::sample(rng, pool.len(), count).iter() {
        let def = pool[index];
        let Some(tier) = def.best_tier(level) else {
            continue;
        };
        let (low, high) = (tier.min.min(tier.max), tier.min.max(tier.max));
        affixes.push(AffixRoll {
            affix_id: def.id.clone(),
            value: rng.gen_range(low..=high),
        });
        chosen.push(def);
    }

    Some(ItemData {
        base_item_id: base.id.clone(),
        name: assemble_name(rarity, &base.name, &chosen),
        rarity,
        level,
        affixes,
    })
}

/// "[Rare|Legendary] [Prefix] Base [of Suffix]", using the first rolled
/// prefix and suffix
pub fn assemble_name(rarity: Rarity, base_name: &str, affixes: &[&AffixDef]) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(4);
    if matches!(rarity, Rarity::Rare | Rarity::Legendary) {
        parts.push(rarity.name());
    }
    if let Some(prefix) = affixes.iter().find(|a| a.is_prefix()) {
        parts.push(&prefix.name);
    }
    parts.push(base_name);
    if let Some(suffix) = affixes.iter().find(|a| a.is_suffix()) {
        parts.push(&suffix.name);
    }
    parts.join(" ")
}

/// Full drop roll for one monster death
pub fn roll_drop<R: Rng + ?Sized>(
    rng: &mut R,
    tables: &LootTables,
    config: &LootConfig,
    level: u32,
) -> Option<ItemData> {
    if !rolls_drop(rng, config, level) {
        return None;
    }
    let rarity = roll_rarity(rng, level, config.rarity_modifier);
    generate_item(rng, tables, rarity, level)
}

/// Drain the death queue, spawning ground items for monster deaths.
/// Returns the drained deaths and the items spawned from them.
pub fn run(sim: &mut Simulation) -> (Vec<DeathEvent>, Vec<LootDropped>) {
    let deaths = sim.deaths.drain();
    let mut dropped = Vec::new();

    for death in &deaths {
        if !death.was_monster {
            continue;
        }
        let Some(item) = roll_drop(&mut sim.rng, &sim.loot_tables, &sim.config.loot, death.level) else {
            continue;
        };

        let position = death.position + Vec3::Y * sim.config.loot.drop_height;
        let entity = match sim.store.spawn() {
            Ok(entity) => entity,
            Err(err) => {
                warn!(%err, item = %item.name, "no room for loot entity, drop lost");
                continue;
            }
        };
        sim.store.attach_position(entity, position);
        sim.store.attach_item(entity, item.clone());

        info!(
            entity = %entity,
            item = %item.name,
            rarity = item.rarity.name(),
            level = item.level,
            "loot dropped"
        );
        dropped.push(LootDropped { entity, position, item });
    }

    (deaths, dropped)
}
