//! Dungeon Combat Core
//!
//! Deterministic combat and navigation for a real-time dungeon ARPG:
//! - Entity/component store (structure-of-arrays, presence masks)
//! - Grid map and A* pathfinding with per-entity path caching
//! - Path-following movement and overlap separation
//! - Monster aggro/leash AI
//! - Combat resolution, armor mitigation, crits, death cleanup
//! - Loot and affix generation
//! - Simulation context driving the fixed per-tick system order, plus a bevy plugin

pub mod balance;
pub mod combat;
pub mod config;
pub mod constants;
pub mod death;
pub mod ecs;
pub mod error;
pub mod logging;
pub mod loot;
pub mod map;
pub mod monster;
pub mod movement;
pub mod player;
pub mod simulation;

pub use config::SimulationConfig;
pub use ecs::{EntityId, EntityStore};
pub use error::{SimError, SimResult};
pub use map::GridMap;
pub use simulation::{Simulation, SimulationPlugin, TickReport};
