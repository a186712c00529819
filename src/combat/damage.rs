//! Damage resolution, death marking and health regeneration.

use bevy::prelude::*;
use rand::Rng;

use crate::config::CombatConfig;
use crate::constants::MIN_DAMAGE;
use crate::ecs::{AttackEvent, ComponentMask, DamageEvent, DeathEvent, EntityStore};
use crate::player::progression;
use crate::simulation::Simulation;

/// Fraction of damage absorbed by `armor`. Approaches but never reaches 1.
pub fn armor_reduction(armor: f32, armor_constant: f32) -> f32 {
    let armor = armor.max(0.0);
    armor / (armor + armor_constant)
}

/// Final damage of one hit, floored at [`MIN_DAMAGE`]
pub fn resolve_damage(raw: f32, armor: f32, crit: bool, config: &CombatConfig) -> f32 {
    let crit_mult = if crit { config.crit_multiplier } else { 1.0 };
    let mitigated = raw * (1.0 - armor_reduction(armor, config.armor_constant)) * crit_mult;
    mitigated.max(MIN_DAMAGE)
}

pub fn roll_crit<R: Rng + ?Sized>(rng: &mut R, chance: f32) -> bool {
    rng.gen::<f32>() < chance
}

/// Drain the attack queue and apply every hit
pub fn run(sim: &mut Simulation) {
    for attack in sim.attacks.drain() {
        apply_attack(sim, attack);
    }
}

/// Apply one attack. Returns the resolved damage, or `None` when the target
/// was already dead or gone.
pub fn apply_attack(sim: &mut Simulation, attack: AttackEvent) -> Option<f32> {
    let target = attack.target;
    let stats = sim.store.combat_stats(target)?;
    if !stats.is_alive() || sim.store.is_dead(target) {
        trace!(target = %target, "attack on dead target discarded");
        return None;
    }

    let crit = roll_crit(&mut sim.rng, sim.config.combat.crit_chance);
    let amount = resolve_damage(attack.damage, stats.armor, crit, &sim.config.combat);
    let position = sim.store.position(target).unwrap_or_default();

    let stats = sim.store.combat_stats_mut(target)?;
    stats.hp -= amount;
    let killed = stats.hp <= 0.0;
    if killed {
        stats.hp = 0.0;
    }
    let level = stats.level;

    sim.damage.push(DamageEvent {
        attacker: attack.attacker,
        target,
        amount,
        crit,
        position,
    });

    if killed {
        sim.store.mark_dead(target);
        let was_monster = sim.store.has(target, ComponentMask::MONSTER);
        debug!(entity = %target, killer = %attack.attacker, "entity died");
        sim.deaths.push(DeathEvent {
            entity: target,
            killer: attack.attacker,
            position,
            level,
            was_monster,
        });

        if was_monster && sim.store.has(attack.attacker, ComponentMask::PLAYER) {
            let xp = progression::xp_for_kill(&sim.config.progression, level);
            progression::grant_xp(&mut sim.store, &sim.config.progression, attack.attacker, xp);
        }
    }

    Some(amount)
}

/// `hp = min(max_hp, hp + regen * dt)` for living entities
pub fn run_regen(store: &mut EntityStore, dt: f32) {
    for entity in store.entities_with(ComponentMask::COMBAT_STATS) {
        if store.is_dead(entity) {
            continue;
        }
        let Some(stats) = store.combat_stats_mut(entity) else {
            continue;
        };
        if !stats.is_alive() || stats.health_regen <= 0.0 {
            continue;
        }
        stats.hp = (stats.hp + stats.health_regen * dt).min(stats.max_hp);
    }
}
