//! XP and levelling for the player.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ProgressionConfig;
use crate::ecs::{EntityId, EntityStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            xp_to_next: 100,
        }
    }
}

/// XP needed to go from `level` to `level + 1`
pub fn xp_for_level(config: &ProgressionConfig, level: u32) -> u32 {
    config.xp_curve_per_level.max(1).saturating_mul(level.max(1))
}

/// XP awarded for killing a monster of `victim_level`
pub fn xp_for_kill(config: &ProgressionConfig, victim_level: u32) -> u32 {
    config.xp_per_monster_level.saturating_mul(victim_level.max(1))
}

/// Add XP to an entity with a Progression component, applying every level-up
/// it pays for. Returns the number of levels gained.
pub fn grant_xp(store: &mut EntityStore, config: &ProgressionConfig, entity: EntityId, amount: u32) -> u32 {
    let Some(progress) = store.progression_mut(entity) else {
        return 0;
    };

    progress.xp = progress.xp.saturating_add(amount);
    let mut gained = 0;
    while progress.xp >= progress.xp_to_next {
        progress.xp -= progress.xp_to_next;
        progress.level += 1;
        progress.xp_to_next = xp_for_level(config, progress.level);
        gained += 1;
    }
    let level = progress.level;

    if gained > 0 {
        if let Some(stats) = store.combat_stats_mut(entity) {
            stats.level = level;
            stats.max_hp += config.hp_per_level * gained as f32;
            stats.damage_min += config.damage_per_level * gained as f32;
            stats.damage_max += config.damage_per_level * gained as f32;
            stats.hp = stats.max_hp;
        }
        info!(entity = %entity, level, "leveled up");
    }
    gained
}
