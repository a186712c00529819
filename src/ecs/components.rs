use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::FALLBACK_ATTACK_INTERVAL;

/// Combat attributes of a fighter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub hp: f32,
    pub max_hp: f32,
    pub mp: f32,
    pub max_mp: f32,
    pub attack_speed: f32, // attacks per second
    pub attack_range: f32,
    pub damage_min: f32,
    pub damage_max: f32,
    pub armor: f32,
    pub level: u32,
    pub health_regen: f32, // hp per second
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            hp: 100.0,
            max_hp: 100.0,
            mp: 50.0,
            max_mp: 50.0,
            attack_speed: 1.0,
            attack_range: 1.5,
            damage_min: 5.0,
            damage_max: 10.0,
            armor: 0.0,
            level: 1,
            health_regen: 0.0,
        }
    }
}

impl CombatStats {
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Seconds between attacks; a non-positive rate falls back to one per second
    pub fn attack_interval(&self) -> f32 {
        if self.attack_speed > 0.0 {
            1.0 / self.attack_speed
        } else {
            FALLBACK_ATTACK_INTERVAL
        }
    }

    /// Pull hp back into `[0, max_hp]`
    pub fn clamp_hp(&mut self) {
        self.hp = self.hp.clamp(0.0, self.max_hp.max(0.0));
    }
}

/// Combat state machine. `Dead` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatState {
    #[default]
    Idle,
    MovingToTarget,
    Attacking,
    Dead,
}

impl CombatState {
    pub fn id(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::MovingToTarget => 1,
            Self::Attacking => 2,
            Self::Dead => 3,
        }
    }
}

/// Countdown to the next allowed attack; attacking is allowed at `<= 0`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cooldowns {
    pub attack_timer: f32,
}

impl Cooldowns {
    pub fn ready(&self) -> bool {
        self.attack_timer <= 0.0
    }
}

/// Desired destination (not a path)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveTarget {
    pub position: Vec3,
    pub active: bool,
}

impl MoveTarget {
    pub fn set(&mut self, position: Vec3) {
        self.position = position;
        self.active = true;
    }

    pub fn clear(&mut self) {
        self.active = false;
    }
}

/// Handle to a physics-engine collider owned by the physics collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitboxHandle(pub u64);
