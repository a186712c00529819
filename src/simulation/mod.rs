//! Simulation context.
//!
//! Owns every piece of mutable state the systems touch: the entity store,
//! the grid, the path cache, the event mailboxes and the seeded RNG. Systems
//! are plain functions taking `&mut Simulation`, run in a fixed order by
//! [`Simulation::tick`]:
//!
//! cooldowns → AI → combat → damage → damage drain → regen → movement →
//! separation → death cleanup → loot

use bevy::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use sha3::{Digest, Sha3_256};
use std::fmt;

use crate::combat::{self, damage};
use crate::config::SimulationConfig;
use crate::death::{self, LifecycleHooks};
use crate::ecs::{
    AttackEvent, CombatStats, ComponentMask, DamageEvent, DeathEvent, EntityId, EntityStore, EventQueue,
    HitboxHandle,
};
use crate::error::{SimError, SimResult};
use crate::loot::{self, LootDropped, LootTables};
use crate::map::{GridMap, PathStore};
use crate::monster::{self, ai, MonsterTemplate};
use crate::movement::{self, separation};
use crate::player::{self, inventory, Inventory};

pub mod plugin;

pub use plugin::SimulationPlugin;

/// Deterministic RNG behind every random roll
pub type SimRng = Xoshiro256PlusPlus;

/// Everything that happened during one tick, for presentation layers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub damage: Vec<DamageEvent>,
    pub deaths: Vec<DeathEvent>,
    pub loot_spawned: Vec<LootDropped>,
    pub destroyed: Vec<EntityId>,
}

#[derive(Resource)]
pub struct Simulation {
    pub config: SimulationConfig,
    pub store: EntityStore,
    pub grid: Option<GridMap>,
    pub paths: PathStore,
    pub attacks: EventQueue<AttackEvent>,
    pub damage: EventQueue<DamageEvent>,
    pub deaths: EventQueue<DeathEvent>,
    pub loot_tables: LootTables,
    pub rng: SimRng,
    pub hooks: LifecycleHooks,
    tick: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.tick)
            .field("entities", &self.store.len())
            .field("grid", &self.grid.as_ref().map(|g| (g.width(), g.height())))
            .field("paths", &self.paths.len())
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        let store = EntityStore::with_capacity(config.max_entities);
        let rng = SimRng::seed_from_u64(config.seed);
        Self {
            config,
            store,
            grid: None,
            paths: PathStore::default(),
            attacks: EventQueue::new("attack"),
            damage: EventQueue::new("damage"),
            deaths: EventQueue::new("death"),
            loot_tables: LootTables::default(),
            rng,
            hooks: LifecycleHooks::default(),
            tick: 0,
        }
    }

    pub fn with_loot_tables(mut self, tables: LootTables) -> Self {
        self.loot_tables = tables;
        self
    }

    pub fn with_grid(mut self, grid: GridMap) -> Self {
        self.set_grid(grid);
        self
    }

    /// Install the dungeon map. Cached paths were planned on the old map and
    /// are dropped.
    pub fn set_grid(&mut self, grid: GridMap) {
        info!(width = grid.width(), height = grid.height(), "grid installed");
        self.grid = Some(grid);
        self.paths.clear();
    }

    pub fn grid(&self) -> Option<&GridMap> {
        self.grid.as_ref()
    }

    /// World-position wall query. Fails when no map has been installed.
    pub fn is_wall(&self, world_x: f32, world_z: f32) -> SimResult<bool> {
        let grid = self.grid.as_ref().ok_or(SimError::GridNotInitialized)?;
        Ok(grid.is_wall(world_x, world_z))
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn spawn_player(&mut self, stats: CombatStats, position: Vec3) -> SimResult<EntityId> {
        player::spawn_player(&mut self.store, stats, position)
    }

    pub fn spawn_monster(&mut self, template: &MonsterTemplate, level: u32, position: Vec3) -> SimResult<EntityId> {
        monster::spawn_monster(&mut self.store, template, level, position, &self.config.progression)
    }

    pub fn player(&self) -> Option<EntityId> {
        self.store.first_with(ComponentMask::PLAYER)
    }

    /// Point an entity at a destination (click-to-move)
    pub fn issue_move(&mut self, entity: EntityId, destination: Vec3) -> SimResult<()> {
        let move_target = self
            .store
            .move_target_mut(entity)
            .ok_or(SimError::UnknownEntity(entity))?;
        move_target.set(destination);
        Ok(())
    }

    /// Set or clear an entity's combat target
    pub fn set_target(&mut self, entity: EntityId, target: Option<EntityId>) -> SimResult<()> {
        if self.store.set_target(entity, target) {
            Ok(())
        } else {
            Err(SimError::UnknownEntity(entity))
        }
    }

    /// Register a callback run once for every destroyed entity
    pub fn on_entity_destroyed(&mut self, hook: impl FnMut(EntityId) + Send + Sync + 'static) {
        self.hooks.destroyed.push(Box::new(hook));
    }

    /// Register a callback run when a destroyed entity owned a hitbox
    pub fn on_hitbox_released(&mut self, hook: impl FnMut(EntityId, HitboxHandle) + Send + Sync + 'static) {
        self.hooks.hitbox_released.push(Box::new(hook));
    }

    /// Destroy an entity outside the tick. Returns `false` if it was already gone.
    pub fn destroy_entity(&mut self, entity: EntityId) -> bool {
        death::destroy(self, entity)
    }

    /// Move a ground item into `bag`. `false` leaves everything untouched.
    pub fn pickup_item(&mut self, picker: EntityId, item: EntityId, bag: &mut Inventory) -> bool {
        if bag.is_full() || !inventory::can_pickup(&self.store, picker, item, self.config.pickup_range) {
            return false;
        }
        let Some(data) = self.store.take_item(item) else {
            return false;
        };
        debug!(picker = %picker, item = %data.name, "item picked up");
        bag.add(data);
        death::destroy(self, item);
        true
    }

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> TickReport {
        let dt = dt.max(0.0);
        self.tick += 1;
        let _span = trace_span!("tick", tick = self.tick).entered();

        combat::run_cooldowns(&mut self.store, dt);
        ai::run(self);
        combat::run(self);
        damage::run(self);
        let damage = self.damage.drain();
        damage::run_regen(&mut self.store, dt);
        movement::run(self, dt);
        separation::run(self, dt);
        let destroyed = death::run(self);
        let (deaths, loot_spawned) = loot::run(self);

        trace!(
            damage = damage.len(),
            deaths = deaths.len(),
            loot = loot_spawned.len(),
            "tick complete"
        );

        TickReport {
            tick: self.tick,
            damage,
            deaths,
            loot_spawned,
            destroyed,
        }
    }

    /// SHA3-256 over the observable state of every allocated entity
    pub fn state_digest(&self) -> [u8; 32] {
        let mut hasher = Sha3_256::new();
        hasher.update(self.tick.to_le_bytes());
        for entity in self.store.entities_with(ComponentMask::empty()) {
            hasher.update((entity.index() as u32).to_le_bytes());
            hasher.update(entity.generation().to_le_bytes());
            hasher.update(self.store.mask(entity).bits().to_le_bytes());
            if let Some(position) = self.store.position(entity) {
                for axis in position.to_array() {
                    hasher.update(axis.to_le_bytes());
                }
            }
            if let Some(stats) = self.store.combat_stats(entity) {
                hasher.update(stats.hp.to_le_bytes());
            }
            if let Some(state) = self.store.combat_state(entity) {
                hasher.update([state.id()]);
            }
        }
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::CombatState;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_is_wall_requires_grid() {
        let mut sim = Simulation::default();
        assert!(matches!(sim.is_wall(0.0, 0.0), Err(SimError::GridNotInitialized)));

        sim.set_grid(GridMap::from_ascii(&["###", "#.#", "###"], 1.0).unwrap());
        assert!(!sim.is_wall(0.0, 0.0).unwrap());
        assert!(sim.is_wall(1.0, 0.0).unwrap());
    }

    #[test]
    fn test_tick_counter_and_empty_report() {
        let mut sim = Simulation::default();
        let report = sim.tick(0.016);
        assert_eq!(report.tick, 1);
        assert!(report.damage.is_empty() && report.deaths.is_empty());
        assert_eq!(sim.tick(0.016).tick, 2);
        assert_eq!(sim.current_tick(), 2);
    }

    #[test]
    fn test_issue_move_unknown_entity() {
        let mut sim = Simulation::default();
        let ghost = EntityId::new(5, 0);
        let err = sim.issue_move(ghost, Vec3::ONE).unwrap_err();
        assert!(matches!(err, SimError::UnknownEntity(id) if id == ghost));
    }

    #[test]
    fn test_destroy_hooks_fire_once() {
        let mut sim = Simulation::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        sim.on_entity_destroyed(move |e| sink.lock().unwrap().push(e));

        let monster = sim.spawn_monster(&MonsterTemplate::skeleton(), 1, Vec3::ZERO).unwrap();
        assert!(sim.destroy_entity(monster));
        assert!(!sim.destroy_entity(monster));
        assert_eq!(*seen.lock().unwrap(), vec![monster]);
    }

    #[test]
    fn test_pickup_item() {
        let mut sim = Simulation::default();
        let player = sim.spawn_player(player::starting_stats(), Vec3::ZERO).unwrap();
        let item = sim.store.spawn().unwrap();
        sim.store.attach_position(item, Vec3::new(1.0, 0.5, 0.0));
        sim.store.attach_item(
            item,
            loot::ItemData {
                base_item_id: "buckler".into(),
                name: "Buckler".into(),
                rarity: loot::Rarity::Common,
                level: 1,
                affixes: Vec::new(),
            },
        );

        let mut full = Inventory::with_capacity(0);
        assert!(!sim.pickup_item(player, item, &mut full));
        assert!(sim.store.contains(item));

        let mut bag = Inventory::default();
        assert!(sim.pickup_item(player, item, &mut bag));
        assert_eq!(bag.used_slots(), 1);
        assert!(!sim.store.contains(item));
        assert!(!sim.pickup_item(player, item, &mut bag));
    }

    #[test]
    fn test_pickup_out_of_range() {
        let mut sim = Simulation::default();
        let player = sim.spawn_player(player::starting_stats(), Vec3::ZERO).unwrap();
        let item = sim.store.spawn().unwrap();
        sim.store.attach_position(item, Vec3::new(5.0, 0.5, 0.0));
        sim.store.attach_item(
            item,
            loot::ItemData {
                base_item_id: "buckler".into(),
                name: "Buckler".into(),
                rarity: loot::Rarity::Magic,
                level: 1,
                affixes: Vec::new(),
            },
        );
        let mut bag = Inventory::default();
        assert!(!sim.pickup_item(player, item, &mut bag));
        assert!(sim.store.item(item).is_some());
    }

    #[test]
    fn test_digest_is_deterministic() {
        let run = |seed: u64| {
            let mut sim = Simulation::new(SimulationConfig::default().with_seed(seed));
            sim.spawn_player(player::starting_stats(), Vec3::ZERO).unwrap();
            sim.spawn_monster(&MonsterTemplate::skeleton(), 2, Vec3::new(1.0, 0.0, 0.0))
                .unwrap();
            for _ in 0..120 {
                sim.tick(1.0 / 30.0);
            }
            sim.state_digest()
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn test_player_kills_monster_end_to_end() {
        let mut sim = Simulation::default();
        let player = sim
            .spawn_player(
                CombatStats {
                    damage_min: 500.0,
                    damage_max: 500.0,
                    ..player::starting_stats()
                },
                Vec3::ZERO,
            )
            .unwrap();
        let monster = sim
            .spawn_monster(&MonsterTemplate::skeleton(), 1, Vec3::new(1.0, 0.0, 0.0))
            .unwrap();
        sim.set_target(player, Some(monster)).unwrap();

        let report = sim.tick(0.016);
        // the monster aggroed and swung back in the same tick
        assert_eq!(report.damage.iter().filter(|d| d.target == monster).count(), 1);
        assert_eq!(report.deaths.len(), 1);
        assert_eq!(report.deaths[0].entity, monster);
        assert!(report.deaths[0].was_monster);
        assert_eq!(report.destroyed, vec![monster]);
        assert_eq!(sim.store.target(player), None);
        assert_eq!(sim.store.combat_state(player), Some(CombatState::Idle));
        assert_eq!(sim.store.progression(player).unwrap().xp, 10);
    }
}
