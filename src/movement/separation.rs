//! Pairwise overlap resolution for solid entities.
//!
//! O(n²) over living solids, fine for a few dozen. Pairs are visited in
//! ascending id order and see each other's already-pushed positions, which
//! keeps the result deterministic.

use bevy::prelude::*;

use crate::ecs::ComponentMask;
use crate::map::GridMap;
use crate::simulation::Simulation;

/// Below this XZ distance two entities count as coincident
const COINCIDENT_EPSILON: f32 = 1e-5;

pub fn run(sim: &mut Simulation, dt: f32) {
    let solids: Vec<_> = sim
        .store
        .entities_with(ComponentMask::SOLID | ComponentMask::POSITION)
        .into_iter()
        .filter(|&e| !sim.store.is_dead(e))
        .collect();
    let min_distance = 2.0 * sim.config.movement.entity_radius;
    let strength = sim.config.movement.separation_strength;

    for (i, &a) in solids.iter().enumerate() {
        for &b in &solids[i + 1..] {
            let (Some(pa), Some(pb)) = (sim.store.position(a), sim.store.position(b)) else {
                continue;
            };
            let Some((push_a, push_b)) = separation_push(pa, pb, min_distance, strength, dt) else {
                continue;
            };
            let grid = sim.grid.as_ref();
            if let Some(p) = sim.store.position_mut(a) {
                *p = push_unless_blocked(grid, *p, push_a);
            }
            if let Some(p) = sim.store.position_mut(b) {
                *p = push_unless_blocked(grid, *p, push_b);
            }
        }
    }
}

/// Offsets to apply to `a` and `b` when they overlap in XZ, `None` otherwise.
/// Each side moves `overlap * strength * dt / 2`, never more than half the
/// overlap.
pub fn separation_push(a: Vec3, b: Vec3, min_distance: f32, strength: f32, dt: f32) -> Option<(Vec3, Vec3)> {
    let delta = Vec2::new(a.x - b.x, a.z - b.z);
    let distance = delta.length();
    if distance >= min_distance {
        return None;
    }
    let overlap = min_distance - distance;
    let direction = if distance > COINCIDENT_EPSILON {
        delta / distance
    } else {
        Vec2::X
    };
    let magnitude = (overlap * strength * dt * 0.5).min(overlap * 0.5);
    let push = Vec3::new(direction.x, 0.0, direction.y) * magnitude;
    Some((push, -push))
}

fn push_unless_blocked(grid: Option<&GridMap>, position: Vec3, push: Vec3) -> Vec3 {
    let moved = position + push;
    match grid {
        Some(grid) if grid.is_wall(moved.x, moved.z) => position,
        _ => moved,
    }
}
