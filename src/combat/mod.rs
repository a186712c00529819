//! Combat resolution.
//!
//! Each tick every entity with stats, a target and a combat state either
//! chases its target, swings at it, or waits out its cooldown. Range and
//! cooldown are evaluated fresh every tick, so a target stepping in and out
//! of range flips the attacker between chase and attack immediately.
//! Swings become [`AttackEvent`]s resolved by [`damage`].

use bevy::prelude::*;
use rand::Rng;

use crate::ecs::{AttackEvent, CombatState, ComponentMask, EntityId, EntityStore};
use crate::simulation::Simulation;

pub mod damage;

/// Decrement every positive attack timer by `dt`
pub fn run_cooldowns(store: &mut EntityStore, dt: f32) {
    for entity in store.entities_with(ComponentMask::COOLDOWNS) {
        if let Some(cooldowns) = store.cooldowns_mut(entity) {
            if cooldowns.attack_timer > 0.0 {
                cooldowns.attack_timer -= dt;
            }
        }
    }
}

/// What one combatant did this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatAction {
    Skipped,
    DroppedStaleTarget,
    Chasing,
    Attacked,
    Waiting,
}

pub fn run(sim: &mut Simulation) {
    for entity in sim.store.entities_with(ComponentMask::COMBATANT) {
        resolve(sim, entity);
    }
}

/// Run the combat decision for one entity
pub fn resolve(sim: &mut Simulation, entity: EntityId) -> CombatAction {
    let store = &mut sim.store;
    let Some(target) = store.target(entity) else {
        return CombatAction::Skipped;
    };
    if store.is_dead(entity) {
        return CombatAction::Skipped;
    }

    let target_alive = store.combat_stats(target).is_some_and(|s| s.is_alive());
    let target_position = store.position(target);
    let (Some(target_position), true) = (target_position, target_alive) else {
        trace!(entity = %entity, target = %target, "dropping stale target");
        store.set_target(entity, None);
        store.set_combat_state(entity, CombatState::Idle);
        return CombatAction::DroppedStaleTarget;
    };

    let (Some(position), Some(stats)) = (store.position(entity), store.combat_stats(entity)) else {
        return CombatAction::Skipped;
    };

    if position.distance(target_position) > stats.attack_range {
        store.set_combat_state(entity, CombatState::MovingToTarget);
        if let Some(move_target) = store.move_target_mut(entity) {
            move_target.set(target_position);
        }
        return CombatAction::Chasing;
    }

    if let Some(move_target) = store.move_target_mut(entity) {
        move_target.clear();
    }

    // no cooldown component means nothing gates the swing
    let ready = store.cooldowns(entity).map_or(true, |c| c.ready());
    if !ready {
        store.set_combat_state(entity, CombatState::Idle);
        return CombatAction::Waiting;
    }

    store.set_combat_state(entity, CombatState::Attacking);
    let damage = roll_damage(&mut sim.rng, stats.damage_min, stats.damage_max);
    if let Some(cooldowns) = sim.store.cooldowns_mut(entity) {
        cooldowns.attack_timer = stats.attack_interval();
    }
    sim.attacks.push(AttackEvent {
        attacker: entity,
        target,
        damage,
    });
    CombatAction::Attacked
}

/// Uniform roll in `[min, max)`; a collapsed or inverted range yields `min`
pub fn roll_damage<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}
