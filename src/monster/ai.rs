//! Monster aggro/leash state machine.
//!
//! The state lives in `(Target, CombatState)`: a monster is either untargeted
//! or engaged on the player. It engages within the aggro range and only lets
//! go beyond the larger leash range, so nothing flickers in between.

use bevy::prelude::*;

use crate::ecs::{CombatState, ComponentMask, EntityId};
use crate::simulation::Simulation;

/// Outcome of one monster's evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiTransition {
    None,
    Aggro,
    Leash,
}

pub fn run(sim: &mut Simulation) {
    let Some(player) = sim.store.first_with(ComponentMask::PLAYER) else {
        return;
    };
    let player_alive = sim.store.combat_stats(player).is_some_and(|s| s.is_alive());
    if !player_alive || sim.store.is_dead(player) {
        return;
    }

    for monster in sim.store.entities_with(ComponentMask::MONSTER | ComponentMask::COMBATANT) {
        evaluate(sim, monster, player);
    }
}

/// Evaluate one monster against the player
pub fn evaluate(sim: &mut Simulation, monster: EntityId, player: EntityId) -> AiTransition {
    let store = &mut sim.store;
    if store.is_dead(monster) {
        return AiTransition::None;
    }
    let Some(distance) = store.distance(monster, player) else {
        return AiTransition::None;
    };
    let combat = &sim.config.combat;

    match store.target(monster) {
        None if distance <= combat.aggro_range => {
            store.set_target(monster, Some(player));
            store.set_combat_state(monster, CombatState::MovingToTarget);
            debug!(monster = %monster, distance, "aggro");
            AiTransition::Aggro
        }
        Some(target) if target == player && distance > combat.leash_range => {
            store.set_target(monster, None);
            store.set_combat_state(monster, CombatState::Idle);
            if let Some(move_target) = store.move_target_mut(monster) {
                move_target.clear();
            }
            debug!(monster = %monster, distance, "leashed");
            AiTransition::Leash
        }
        _ => AiTransition::None,
    }
}
