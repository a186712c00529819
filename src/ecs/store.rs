use bevy::prelude::*;
use std::collections::HashMap;

use super::components::{CombatState, CombatStats, Cooldowns, HitboxHandle, MoveTarget};
use super::{ComponentMask, EntityId};
use crate::error::{SimError, SimResult};
use crate::loot::ItemData;
use crate::player::progression::Progression;

/// Generates the check-before-read accessors for one component array
macro_rules! component_access {
    ($field:ident: $ty:ty, $flag:ident, $get:ident, $get_mut:ident, $attach:ident) => {
        pub fn $get(&self, entity: EntityId) -> Option<$ty> {
            self.has(entity, ComponentMask::$flag)
                .then(|| self.$field[entity.index()])
        }

        pub fn $get_mut(&mut self, entity: EntityId) -> Option<&mut $ty> {
            if self.has(entity, ComponentMask::$flag) {
                Some(&mut self.$field[entity.index()])
            } else {
                None
            }
        }

        pub fn $attach(&mut self, entity: EntityId, value: $ty) -> bool {
            if !self.contains(entity) {
                return false;
            }
            self.$field[entity.index()] = value;
            self.masks[entity.index()].insert(ComponentMask::$flag);
            true
        }
    };
}

/// Flat, pre-allocated component storage
#[derive(Debug)]
pub struct EntityStore {
    capacity: usize,
    allocated: Vec<bool>,
    generations: Vec<u32>,
    masks: Vec<ComponentMask>,
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    combat_stats: Vec<CombatStats>,
    targets: Vec<Option<EntityId>>,
    combat_states: Vec<CombatState>,
    cooldowns: Vec<Cooldowns>,
    move_targets: Vec<MoveTarget>,
    speeds: Vec<f32>,
    progression: Vec<Progression>,
    hitboxes: Vec<HitboxHandle>,
    items: HashMap<EntityId, ItemData>,
    free: Vec<u32>,
}

impl EntityStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            allocated: vec![false; capacity],
            generations: vec![0; capacity],
            masks: vec![ComponentMask::empty(); capacity],
            positions: vec![Vec3::ZERO; capacity],
            velocities: vec![Vec3::ZERO; capacity],
            combat_stats: vec![CombatStats::default(); capacity],
            targets: vec![None; capacity],
            combat_states: vec![CombatState::Idle; capacity],
            cooldowns: vec![Cooldowns::default(); capacity],
            move_targets: vec![MoveTarget::default(); capacity],
            speeds: vec![0.0; capacity],
            progression: vec![Progression::default(); capacity],
            hitboxes: vec![HitboxHandle::default(); capacity],
            items: HashMap::new(),
            // reversed so the lowest id is handed out first
            free: (0..capacity as u32).rev().collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.capacity - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocate a bare entity with no components
    pub fn spawn(&mut self) -> SimResult<EntityId> {
        let index = self.free.pop().ok_or(SimError::CapacityExhausted {
            capacity: self.capacity,
        })?;
        let slot = index as usize;
        self.allocated[slot] = true;
        self.masks[slot] = ComponentMask::empty();
        self.targets[slot] = None;
        self.combat_states[slot] = CombatState::Idle;
        self.velocities[slot] = Vec3::ZERO;
        self.move_targets[slot] = MoveTarget::default();
        self.cooldowns[slot] = Cooldowns::default();
        Ok(EntityId::new(index, self.generations[slot]))
    }

    /// Clear every component flag and release the slot under a new
    /// generation. Returns `false` if the id is stale or was never allocated.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        if !self.contains(entity) {
            return false;
        }
        let slot = entity.index();
        self.allocated[slot] = false;
        self.masks[slot] = ComponentMask::empty();
        self.targets[slot] = None;
        self.items.remove(&entity);
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free.push(slot as u32);
        true
    }

    /// Live entity check: the slot is allocated and still on the handle's generation
    pub fn contains(&self, entity: EntityId) -> bool {
        let slot = entity.index();
        self.allocated.get(slot).copied().unwrap_or(false) && self.generations[slot] == entity.generation()
    }

    fn id_at(&self, slot: usize) -> EntityId {
        EntityId::new(slot as u32, self.generations[slot])
    }

    pub fn mask(&self, entity: EntityId) -> ComponentMask {
        if self.contains(entity) {
            self.masks[entity.index()]
        } else {
            ComponentMask::empty()
        }
    }

    pub fn has(&self, entity: EntityId, flags: ComponentMask) -> bool {
        self.mask(entity).contains(flags)
    }

    pub fn tag(&mut self, entity: EntityId, flags: ComponentMask) -> bool {
        if !self.contains(entity) {
            return false;
        }
        self.masks[entity.index()].insert(flags);
        true
    }

    pub fn detach(&mut self, entity: EntityId, flags: ComponentMask) {
        if self.contains(entity) {
            self.masks[entity.index()].remove(flags);
        }
    }

    /// Allocated entities carrying all of `flags`, in ascending id order
    pub fn entities_with(&self, flags: ComponentMask) -> Vec<EntityId> {
        (0..self.capacity)
            .filter(|&slot| self.allocated[slot] && self.masks[slot].contains(flags))
            .map(|slot| self.id_at(slot))
            .collect()
    }

    pub fn first_with(&self, flags: ComponentMask) -> Option<EntityId> {
        (0..self.capacity)
            .find(|&slot| self.allocated[slot] && self.masks[slot].contains(flags))
            .map(|slot| self.id_at(slot))
    }

    component_access!(positions: Vec3, POSITION, position, position_mut, attach_position);
    component_access!(velocities: Vec3, VELOCITY, velocity, velocity_mut, attach_velocity);
    component_access!(combat_stats: CombatStats, COMBAT_STATS, combat_stats, combat_stats_mut, attach_combat_stats);
    component_access!(cooldowns: Cooldowns, COOLDOWNS, cooldowns, cooldowns_mut, attach_cooldowns);
    component_access!(move_targets: MoveTarget, MOVE_TARGET, move_target, move_target_mut, attach_move_target);
    component_access!(speeds: f32, SPEED, speed, speed_mut, attach_speed);
    component_access!(progression: Progression, PROGRESSION, progression, progression_mut, attach_progression);
    component_access!(hitboxes: HitboxHandle, HITBOX, hitbox, hitbox_mut, attach_hitbox);

    // =====================================================
    // Target
    // =====================================================

    pub fn attach_target(&mut self, entity: EntityId) -> bool {
        if !self.contains(entity) {
            return false;
        }
        self.targets[entity.index()] = None;
        self.masks[entity.index()].insert(ComponentMask::TARGET);
        true
    }

    /// Current target, `None` when untargeted or the component is missing
    pub fn target(&self, entity: EntityId) -> Option<EntityId> {
        if self.has(entity, ComponentMask::TARGET) {
            self.targets[entity.index()]
        } else {
            None
        }
    }

    pub fn set_target(&mut self, entity: EntityId, target: Option<EntityId>) -> bool {
        if !self.has(entity, ComponentMask::TARGET) {
            return false;
        }
        self.targets[entity.index()] = target;
        true
    }

    /// Entities whose target is `victim`
    pub fn targeting(&self, victim: EntityId) -> Vec<EntityId> {
        self.entities_with(ComponentMask::TARGET)
            .into_iter()
            .filter(|&e| self.targets[e.index()] == Some(victim))
            .collect()
    }

    // =====================================================
    // Combat state
    // =====================================================

    pub fn attach_combat_state(&mut self, entity: EntityId, state: CombatState) -> bool {
        if !self.contains(entity) {
            return false;
        }
        self.combat_states[entity.index()] = state;
        self.masks[entity.index()].insert(ComponentMask::COMBAT_STATE);
        true
    }

    pub fn combat_state(&self, entity: EntityId) -> Option<CombatState> {
        self.has(entity, ComponentMask::COMBAT_STATE)
            .then(|| self.combat_states[entity.index()])
    }

    /// Transition to `state`. Never leaves `Dead`; use [`Self::mark_dead`] to enter it.
    pub fn set_combat_state(&mut self, entity: EntityId, state: CombatState) -> bool {
        if !self.has(entity, ComponentMask::COMBAT_STATE) {
            return false;
        }
        let slot = entity.index();
        if self.combat_states[slot] == CombatState::Dead || state == CombatState::Dead {
            return false;
        }
        self.combat_states[slot] = state;
        true
    }

    pub fn mark_dead(&mut self, entity: EntityId) -> bool {
        if !self.has(entity, ComponentMask::COMBAT_STATE) {
            return false;
        }
        self.combat_states[entity.index()] = CombatState::Dead;
        true
    }

    pub fn is_dead(&self, entity: EntityId) -> bool {
        self.combat_state(entity) == Some(CombatState::Dead)
    }

    // =====================================================
    // Item data (side map)
    // =====================================================

    pub fn attach_item(&mut self, entity: EntityId, item: ItemData) -> bool {
        if !self.contains(entity) {
            return false;
        }
        self.items.insert(entity, item);
        self.masks[entity.index()].insert(ComponentMask::ITEM);
        true
    }

    pub fn item(&self, entity: EntityId) -> Option<&ItemData> {
        if self.has(entity, ComponentMask::ITEM) {
            self.items.get(&entity)
        } else {
            None
        }
    }

    pub fn take_item(&mut self, entity: EntityId) -> Option<ItemData> {
        if !self.has(entity, ComponentMask::ITEM) {
            return None;
        }
        self.masks[entity.index()].remove(ComponentMask::ITEM);
        self.items.remove(&entity)
    }

    // =====================================================
    // Distance helpers
    // =====================================================

    /// 3D distance between two positioned entities
    pub fn distance(&self, a: EntityId, b: EntityId) -> Option<f32> {
        Some(self.position(a)?.distance(self.position(b)?))
    }
}
