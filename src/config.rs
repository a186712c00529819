use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::*;
use crate::error::SimResult;
use crate::logging::LogConfig;
use crate::map::pathfinder::Heuristic;

/// Top-level simulation configuration.
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub max_entities: usize,
    pub pickup_range: f32,
    pub combat: CombatConfig,
    pub movement: MovementConfig,
    pub loot: LootConfig,
    pub progression: ProgressionConfig,
    pub logging: LogConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_entities: DEFAULT_MAX_ENTITIES,
            pickup_range: PICKUP_RANGE,
            combat: CombatConfig::default(),
            movement: MovementConfig::default(),
            loot: LootConfig::default(),
            progression: ProgressionConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Load from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub aggro_range: f32,
    pub leash_range: f32,
    pub crit_chance: f32,
    pub crit_multiplier: f32,
    pub armor_constant: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            aggro_range: AGGRO_RANGE,
            leash_range: LEASH_RANGE,
            crit_chance: BASE_CRIT_CHANCE,
            crit_multiplier: CRIT_DAMAGE_MULT,
            armor_constant: ARMOR_CONSTANT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub entity_radius: f32,
    pub separation_strength: f32,
    pub waypoint_epsilon: f32,
    pub heuristic: Heuristic,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            entity_radius: ENTITY_RADIUS,
            separation_strength: SEPARATION_STRENGTH,
            waypoint_epsilon: WAYPOINT_EPSILON,
            heuristic: Heuristic::Octile,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootConfig {
    pub base_drop_chance: f32,
    pub drop_chance_per_level: f32,
    /// Magic-find style modifier; only ever raises magic/rare/legendary weight
    pub rarity_modifier: f32,
    pub drop_height: f32,
}

impl Default for LootConfig {
    fn default() -> Self {
        Self {
            base_drop_chance: BASE_DROP_CHANCE,
            drop_chance_per_level: DROP_CHANCE_PER_LEVEL,
            rarity_modifier: 0.0,
            drop_height: LOOT_DROP_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    pub xp_per_monster_level: u32,
    pub xp_curve_per_level: u32,
    pub hp_per_level: f32,
    pub damage_per_level: f32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            xp_per_monster_level: XP_PER_MONSTER_LEVEL,
            xp_curve_per_level: XP_CURVE_PER_LEVEL,
            hp_per_level: HP_PER_LEVEL,
            damage_per_level: DAMAGE_PER_LEVEL,
        }
    }
}
