use bevy::prelude::*;

use super::Simulation;
use crate::config::SimulationConfig;
use crate::ecs::{DamageEvent, DeathEvent};
use crate::loot::LootDropped;

/// Runs the simulation from bevy's `Update` schedule and republishes each
/// tick's report as bevy events
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: SimulationConfig,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Simulation::new(self.config.clone()))
            .add_event::<DamageEvent>()
            .add_event::<DeathEvent>()
            .add_event::<LootDropped>()
            .add_systems(Update, simulation_tick_system);
    }
}

fn simulation_tick_system(
    time: Res<Time>,
    mut sim: ResMut<Simulation>,
    mut damage: EventWriter<DamageEvent>,
    mut deaths: EventWriter<DeathEvent>,
    mut loot: EventWriter<LootDropped>,
) {
    let report = sim.tick(time.delta_secs());
    damage.send_batch(report.damage);
    deaths.send_batch(report.deaths);
    loot.send_batch(report.loot_spawned);
}
