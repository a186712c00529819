//! Headless demo: a player clears a small dungeon of monsters.
//!
//! Usage: `dungeon-sim [config.json]`

use anyhow::Context;
use bevy::prelude::*;

use dungeon_core::ecs::ComponentMask;
use dungeon_core::logging::{init_tracing, RunTimer};
use dungeon_core::monster::MonsterTemplate;
use dungeon_core::player::{self, Inventory};
use dungeon_core::{EntityId, GridMap, Simulation, SimulationConfig};

const DUNGEON: [&str; 11] = [
    "###############",
    "#.....#.......#",
    "#.....#.......#",
    "#.....+.......#",
    "#.....#...#...#",
    "###+###...#...#",
    "#.........#...#",
    "#.....#####...#",
    "#.............#",
    "#.............#",
    "###############",
];

const TICK_RATE: f32 = 30.0;
const MAX_TICKS: u32 = 30 * 120;

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::load(&path).with_context(|| format!("loading config from {path}"))?,
        None => SimulationConfig::default(),
    };
    init_tracing(&config.logging);
    let grid = GridMap::from_ascii(&DUNGEON, 1.0).context("building demo dungeon")?;
    let mut sim = Simulation::new(config).with_grid(grid);

    sim.spawn_player(player::starting_stats(), Vec3::new(-5.5, 0.0, -3.5))?;
    let spawns = [
        (MonsterTemplate::fallen_imp(), 1, Vec3::new(-3.5, 0.0, 3.5)),
        (MonsterTemplate::skeleton(), 2, Vec3::new(2.5, 0.0, -3.5)),
        (MonsterTemplate::zombie(), 3, Vec3::new(4.5, 0.0, 2.5)),
        (MonsterTemplate::skeleton(), 3, Vec3::new(-1.5, 0.0, 3.5)),
    ];
    for (template, level, position) in &spawns {
        sim.spawn_monster(template, *level, *position)?;
    }

    let mut bag = Inventory::default();
    let mut kills = 0;
    let mut timer = RunTimer::start("demo");

    for _ in 0..MAX_TICKS {
        let Some(hero) = sim.player() else {
            warn!("hero fell");
            break;
        };

        // walk to the nearest living monster when idle
        if sim.store.target(hero).is_none() {
            if let Some(monster) = nearest_monster(&sim, hero) {
                sim.set_target(hero, Some(monster))?;
            }
        }

        let report = sim.tick(1.0 / TICK_RATE);
        timer.record_tick();
        kills += report.deaths.iter().filter(|d| d.was_monster).count();
        for dropped in &report.loot_spawned {
            info!(item = %dropped.item.name, "loot on the floor");
        }
        // greedy pickup of anything in reach
        for item in sim.store.entities_with(ComponentMask::ITEM) {
            sim.pickup_item(hero, item, &mut bag);
        }

        if kills == spawns.len() {
            break;
        }
    }
    drop(timer);

    let digest: String = sim.state_digest().iter().map(|b| format!("{b:02x}")).collect();
    info!(
        ticks = sim.current_tick(),
        kills,
        items = bag.used_slots(),
        level = ?sim.player().and_then(|p| sim.store.progression(p)).map(|p| p.level),
        %digest,
        "demo finished"
    );
    for item in &bag.items {
        println!("{:<40} {:?} lvl {}", item.name, item.rarity, item.level);
    }
    Ok(())
}

fn nearest_monster(sim: &Simulation, hero: EntityId) -> Option<EntityId> {
    sim.store
        .entities_with(ComponentMask::MONSTER)
        .into_iter()
        .filter(|&m| !sim.store.is_dead(m))
        .filter_map(|m| sim.store.distance(hero, m).map(|d| (m, d)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(m, _)| m)
}
