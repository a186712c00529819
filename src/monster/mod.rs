//! Monster templates and spawning.
//!
//! A template holds level-independent numbers; `monster_stats` scales them
//! to a concrete level when the monster is created.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ProgressionConfig;
use crate::ecs::{CombatState, CombatStats, ComponentMask, Cooldowns, EntityId, EntityStore, MoveTarget};
use crate::error::SimResult;

pub mod ai;

/// Level-independent monster definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterTemplate {
    pub name: String,
    pub base_hp: f32,
    pub base_damage_min: f32,
    pub base_damage_max: f32,
    pub damage_per_level: f32,
    pub armor_per_level: f32,
    pub attack_speed: f32,
    pub attack_range: f32,
    pub move_speed: f32,
}

impl MonsterTemplate {
    pub fn skeleton() -> Self {
        Self {
            name: "Skeleton".into(),
            base_hp: 30.0,
            base_damage_min: 3.0,
            base_damage_max: 6.0,
            damage_per_level: 1.0,
            armor_per_level: 2.0,
            attack_speed: 1.0,
            attack_range: 1.5,
            move_speed: 3.0,
        }
    }

    pub fn zombie() -> Self {
        Self {
            name: "Zombie".into(),
            base_hp: 50.0,
            base_damage_min: 5.0,
            base_damage_max: 9.0,
            damage_per_level: 1.5,
            armor_per_level: 1.0,
            attack_speed: 0.6,
            attack_range: 1.4,
            move_speed: 1.8,
        }
    }

    pub fn fallen_imp() -> Self {
        Self {
            name: "Fallen Imp".into(),
            base_hp: 18.0,
            base_damage_min: 2.0,
            base_damage_max: 4.0,
            damage_per_level: 0.8,
            armor_per_level: 0.5,
            attack_speed: 1.6,
            attack_range: 1.2,
            move_speed: 4.2,
        }
    }
}

/// Stats for a monster of `level`: hp = base + level * 10, damage = base +
/// level * scale, armor = level * scale
pub fn monster_stats(template: &MonsterTemplate, level: u32, progression: &ProgressionConfig) -> CombatStats {
    let level = level.max(1);
    let lvl = level as f32;
    let hp = template.base_hp + lvl * progression.hp_per_level;
    let damage_min = template.base_damage_min + lvl * template.damage_per_level;
    let damage_max = (template.base_damage_max + lvl * template.damage_per_level).max(damage_min);
    CombatStats {
        hp,
        max_hp: hp,
        mp: 0.0,
        max_mp: 0.0,
        attack_speed: template.attack_speed,
        attack_range: template.attack_range,
        damage_min,
        damage_max,
        armor: lvl * template.armor_per_level,
        level,
        health_regen: 0.0,
    }
}

/// Attach the monster component set to a new entity
pub fn spawn_monster(
    store: &mut EntityStore,
    template: &MonsterTemplate,
    level: u32,
    position: Vec3,
    progression: &ProgressionConfig,
) -> SimResult<EntityId> {
    let entity = store.spawn()?;
    store.attach_position(entity, position);
    store.attach_velocity(entity, Vec3::ZERO);
    store.attach_combat_stats(entity, monster_stats(template, level, progression));
    store.attach_target(entity);
    store.attach_combat_state(entity, CombatState::Idle);
    store.attach_cooldowns(entity, Cooldowns::default());
    store.attach_move_target(entity, MoveTarget::default());
    store.attach_speed(entity, template.move_speed);
    store.tag(entity, ComponentMask::MONSTER | ComponentMask::SOLID);
    debug!(entity = %entity, monster = %template.name, level, "monster spawned");
    Ok(entity)
}
