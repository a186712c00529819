//! Death cleanup.
//!
//! Runs after movement each tick and destroys every entity whose combat state
//! is `Dead`. Destruction clears back-references, notifies external owners of
//! visual and physics resources, drops the cached path and releases the id.
//! Destroying an id twice is a no-op the second time.

use bevy::prelude::*;
use std::fmt;

use crate::ecs::{CombatState, ComponentMask, EntityId, HitboxHandle};
use crate::simulation::Simulation;

pub type DestroyHook = Box<dyn FnMut(EntityId) + Send + Sync>;
pub type HitboxHook = Box<dyn FnMut(EntityId, HitboxHandle) + Send + Sync>;

/// External callbacks run on destruction
#[derive(Default)]
pub struct LifecycleHooks {
    pub destroyed: Vec<DestroyHook>,
    pub hitbox_released: Vec<HitboxHook>,
}

impl fmt::Debug for LifecycleHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("destroyed", &self.destroyed.len())
            .field("hitbox_released", &self.hitbox_released.len())
            .finish()
    }
}

/// Destroy one entity. Returns `false` when the id is not allocated.
pub fn destroy(sim: &mut Simulation, entity: EntityId) -> bool {
    if !sim.store.contains(entity) {
        return false;
    }

    for referrer in sim.store.targeting(entity) {
        sim.store.set_target(referrer, None);
        sim.store.set_combat_state(referrer, CombatState::Idle);
        if let Some(move_target) = sim.store.move_target_mut(referrer) {
            move_target.clear();
        }
        sim.paths.remove(referrer);
    }

    if let Some(handle) = sim.store.hitbox(entity) {
        for hook in sim.hooks.hitbox_released.iter_mut() {
            hook(entity, handle);
        }
    }
    for hook in sim.hooks.destroyed.iter_mut() {
        hook(entity);
    }

    sim.paths.remove(entity);
    sim.store.despawn(entity);
    debug!(entity = %entity, "entity destroyed");
    true
}

/// Destroy everything marked dead this tick. Returns the destroyed ids.
pub fn run(sim: &mut Simulation) -> Vec<EntityId> {
    let dead: Vec<EntityId> = sim
        .store
        .entities_with(ComponentMask::COMBAT_STATE)
        .into_iter()
        .filter(|&e| sim.store.is_dead(e))
        .collect();

    dead.into_iter().filter(|&e| destroy(sim, e)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::CombatStats;
    use crate::map::CachedPath;
    use crate::map::Cell;
    use crate::monster::MonsterTemplate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_cleanup_clears_back_references() {
        let mut sim = Simulation::default();
        let player = sim.spawn_player(CombatStats::default(), Vec3::ZERO).unwrap();
        let monster = sim.spawn_monster(&MonsterTemplate::skeleton(), 1, Vec3::X).unwrap();
        sim.store.set_target(player, Some(monster));
        sim.store.set_combat_state(player, CombatState::Attacking);
        sim.store.move_target_mut(player).unwrap().set(Vec3::X);
        sim.paths.insert(player, CachedPath::new(Cell::new(0, 0), vec![Vec3::X]));

        sim.store.mark_dead(monster);
        assert_eq!(run(&mut sim), vec![monster]);

        assert!(!sim.store.contains(monster));
        assert_eq!(sim.store.target(player), None);
        assert_eq!(sim.store.combat_state(player), Some(CombatState::Idle));
        assert!(!sim.store.move_target(player).unwrap().active);
        assert!(sim.paths.get(player).is_none());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut sim = Simulation::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        sim.on_entity_destroyed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let monster = sim.spawn_monster(&MonsterTemplate::zombie(), 1, Vec3::ZERO).unwrap();
        assert!(destroy(&mut sim, monster));
        assert!(!destroy(&mut sim, monster));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sim.store.is_empty());
    }

    #[test]
    fn test_destroy_after_slot_reuse_spares_loot() {
        let mut config = crate::SimulationConfig::default();
        config.loot.base_drop_chance = 1.0;
        let mut sim = Simulation::new(config);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        sim.on_entity_destroyed(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let hero = sim
            .spawn_player(
                CombatStats {
                    damage_min: 1000.0,
                    damage_max: 1001.0,
                    ..crate::player::starting_stats()
                },
                Vec3::ZERO,
            )
            .unwrap();
        let monster = sim.spawn_monster(&MonsterTemplate::skeleton(), 1, Vec3::X).unwrap();
        sim.store.set_target(hero, Some(monster));

        let report = sim.tick(1.0 / 30.0);
        assert_eq!(report.destroyed, vec![monster]);
        let item = report.loot_spawned[0].entity;
        assert_eq!(item.index(), monster.index());
        assert_ne!(item, monster);

        assert!(!destroy(&mut sim, monster));
        assert!(sim.store.contains(item));
        assert!(sim.store.item(item).is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hitbox_hook_only_for_hitbox_owners() {
        let mut sim = Simulation::default();
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        sim.on_hitbox_released(move |_, handle| {
            assert_eq!(handle, HitboxHandle(77));
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let with_box = sim.spawn_monster(&MonsterTemplate::zombie(), 1, Vec3::ZERO).unwrap();
        sim.store.attach_hitbox(with_box, HitboxHandle(77));
        let without_box = sim.spawn_monster(&MonsterTemplate::zombie(), 1, Vec3::X).unwrap();

        sim.store.mark_dead(with_box);
        sim.store.mark_dead(without_box);
        assert_eq!(run(&mut sim).len(), 2);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_living_entities_survive() {
        let mut sim = Simulation::default();
        let monster = sim.spawn_monster(&MonsterTemplate::skeleton(), 1, Vec3::ZERO).unwrap();
        assert!(run(&mut sim).is_empty());
        assert!(sim.store.contains(monster));
    }
}
