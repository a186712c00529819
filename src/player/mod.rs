//! Player entity factory.
//!
//! The world layer decides where and when the player appears; this module
//! only knows which components make up a player.

use bevy::prelude::*;

use crate::ecs::{CombatState, CombatStats, ComponentMask, Cooldowns, EntityId, EntityStore, MoveTarget};
use crate::error::SimResult;

pub mod inventory;
pub mod progression;

pub use inventory::Inventory;
pub use progression::Progression;

pub const PLAYER_MOVE_SPEED: f32 = 5.0;

/// Starting stats for a fresh level-1 character
pub fn starting_stats() -> CombatStats {
    CombatStats {
        hp: 100.0,
        max_hp: 100.0,
        mp: 50.0,
        max_mp: 50.0,
        attack_speed: 1.5,
        attack_range: 1.8,
        damage_min: 8.0,
        damage_max: 14.0,
        armor: 10.0,
        level: 1,
        health_regen: 1.0,
    }
}

/// Attach the full player component set to a new entity
pub fn spawn_player(store: &mut EntityStore, stats: CombatStats, position: Vec3) -> SimResult<EntityId> {
    let entity = store.spawn()?;
    store.attach_position(entity, position);
    store.attach_velocity(entity, Vec3::ZERO);
    store.attach_combat_stats(entity, stats);
    store.attach_target(entity);
    store.attach_combat_state(entity, CombatState::Idle);
    store.attach_cooldowns(entity, Cooldowns::default());
    store.attach_move_target(entity, MoveTarget::default());
    store.attach_speed(entity, PLAYER_MOVE_SPEED);
    store.attach_progression(
        entity,
        Progression {
            level: stats.level.max(1),
            ..Default::default()
        },
    );
    store.tag(entity, ComponentMask::PLAYER | ComponentMask::SOLID);
    debug!(entity = %entity, "player spawned");
    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_player_components() {
        let mut store = EntityStore::with_capacity(4);
        let player = spawn_player(&mut store, starting_stats(), Vec3::new(1.0, 0.0, 1.0)).unwrap();

        assert!(store.has(player, ComponentMask::COMBATANT));
        assert!(store.has(player, ComponentMask::MOVER));
        assert!(store.has(player, ComponentMask::PLAYER | ComponentMask::SOLID));
        assert!(!store.has(player, ComponentMask::MONSTER));
        assert_eq!(store.target(player), None);
        assert_eq!(store.combat_state(player), Some(CombatState::Idle));
        assert_eq!(store.progression(player).unwrap().level, 1);
        assert_eq!(store.first_with(ComponentMask::PLAYER), Some(player));
    }

    #[test]
    fn test_starting_stats_are_sane() {
        let stats = starting_stats();
        assert!(stats.damage_min <= stats.damage_max);
        assert!(stats.hp <= stats.max_hp);
        assert!(stats.attack_speed > 0.0);
    }
}
