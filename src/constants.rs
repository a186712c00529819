//! Centralized game constants for the dungeon combat core.
//!
//! These are the defaults behind [`crate::config::SimulationConfig`]. Systems
//! read the config, so a test or a dungeon can override any of them.

// =====================================================
// Entity store
// =====================================================

/// Default capacity of the pre-allocated component arrays
pub const DEFAULT_MAX_ENTITIES: usize = 1024;

/// Event queue length past which a growth warning is logged
pub const QUEUE_WARN_THRESHOLD: usize = 1024;

// =====================================================
// Enemy AI
// =====================================================

/// Distance at which an idle monster acquires the player
pub const AGGRO_RANGE: f32 = 8.0;

/// Distance beyond which an engaged monster gives up the chase
pub const LEASH_RANGE: f32 = 15.0;

// =====================================================
// Combat
// =====================================================

/// Armor mitigation constant: reduction = armor / (armor + ARMOR_CONSTANT)
pub const ARMOR_CONSTANT: f32 = 100.0;

/// Base critical hit chance (5%)
pub const BASE_CRIT_CHANCE: f32 = 0.05;

/// Critical damage multiplier (1.5x)
pub const CRIT_DAMAGE_MULT: f32 = 1.5;

/// Every landed hit deals at least this much
pub const MIN_DAMAGE: f32 = 1.0;

/// Attack interval used when attack speed is zero or negative
pub const FALLBACK_ATTACK_INTERVAL: f32 = 1.0;

// =====================================================
// Movement
// =====================================================

/// Collision radius of solid entities (player + monsters)
pub const ENTITY_RADIUS: f32 = 0.8;

/// Separation push strength, scaled by overlap and delta time
pub const SEPARATION_STRENGTH: f32 = 10.0;

/// Distance at which a waypoint counts as reached
pub const WAYPOINT_EPSILON: f32 = 0.15;

/// Default world size of one grid cell
pub const DEFAULT_CELL_SIZE: f32 = 1.0;

// =====================================================
// Progression
// =====================================================

/// XP granted per level of a slain monster
pub const XP_PER_MONSTER_LEVEL: u32 = 10;

/// XP needed for the next level = XP_CURVE_PER_LEVEL * current level
pub const XP_CURVE_PER_LEVEL: u32 = 100;

/// Max HP gained per level (also the monster HP scaling factor)
pub const HP_PER_LEVEL: f32 = 10.0;

/// Damage gained by the player per level
pub const DAMAGE_PER_LEVEL: f32 = 1.0;

// =====================================================
// Loot
// =====================================================

/// Flat drop chance before the level bonus
pub const BASE_DROP_CHANCE: f32 = 0.3;

/// Drop chance added per monster level
pub const DROP_CHANCE_PER_LEVEL: f32 = 0.01;

/// Monster level past which magic/rare weights start to climb
pub const RARITY_LEVEL_FLOOR: u32 = 10;

/// Height above the death position at which loot is placed
pub const LOOT_DROP_HEIGHT: f32 = 0.5;

/// Maximum player-to-item distance for a pickup
pub const PICKUP_RANGE: f32 = 1.5;

/// Default inventory size
pub const BASE_INVENTORY_SIZE: usize = 20;
