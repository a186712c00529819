//! Entity/component store.
//!
//! Structure-of-arrays layout: every component kind is a pre-allocated `Vec`
//! indexed by a dense entity id, gated by a per-entity presence mask.
//! Readers always check the mask before reading a slot.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod components;
pub mod events;
pub mod store;

pub use components::{CombatState, CombatStats, Cooldowns, HitboxHandle, MoveTarget};
pub use events::{AttackEvent, DamageEvent, DeathEvent, EventQueue};
pub use store::EntityStore;

/// Opaque handle into the component arrays.
///
/// A slot's generation is bumped every time it is freed, so a handle kept
/// past its entity's destruction never resolves to the slot's next occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "#{}", self.index)
        } else {
            write!(f, "#{}v{}", self.index, self.generation)
        }
    }
}

bitflags! {
    /// Which components an entity currently carries
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ComponentMask: u32 {
        const POSITION     = 1 << 0;
        const VELOCITY     = 1 << 1;
        const COMBAT_STATS = 1 << 2;
        const TARGET       = 1 << 3;
        const COMBAT_STATE = 1 << 4;
        const COOLDOWNS    = 1 << 5;
        const MOVE_TARGET  = 1 << 6;
        const SPEED        = 1 << 7;
        const PROGRESSION  = 1 << 8;
        const HITBOX       = 1 << 9;
        // tags
        const PLAYER       = 1 << 16;
        const MONSTER      = 1 << 17;
        const ITEM         = 1 << 18;
        const SOLID        = 1 << 19;
    }
}

impl ComponentMask {
    /// Everything the combat resolution system reads
    pub const COMBATANT: Self = Self::COMBAT_STATS
        .union(Self::TARGET)
        .union(Self::COMBAT_STATE)
        .union(Self::POSITION);

    /// Everything the path-follow system needs
    pub const MOVER: Self = Self::POSITION
        .union(Self::MOVE_TARGET)
        .union(Self::SPEED);
}
