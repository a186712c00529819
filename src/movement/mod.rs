//! Path-following movement.
//!
//! Entities with an active MoveTarget walk toward it at their speed. With a
//! grid installed they follow A* waypoints cached in the [`PathStore`];
//! without one they step straight at the destination. A failed path search
//! abandons the move request until a new destination is issued.

use bevy::prelude::*;

use crate::ecs::{ComponentMask, EntityId, EntityStore};
use crate::map::{find_path, CachedPath, PathStore};
use crate::simulation::Simulation;

pub mod separation;

/// Result of one entity's movement step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Idle,
    Moving,
    Arrived,
    Abandoned,
}

pub fn run(sim: &mut Simulation, dt: f32) {
    for entity in sim.store.entities_with(ComponentMask::MOVER) {
        step_entity(sim, entity, dt);
    }
}

/// Advance one entity toward its MoveTarget
pub fn step_entity(sim: &mut Simulation, entity: EntityId, dt: f32) -> MoveOutcome {
    let Some(move_target) = sim.store.move_target(entity) else {
        return MoveOutcome::Idle;
    };
    if !move_target.active || sim.store.is_dead(entity) {
        halt(&mut sim.store, &mut sim.paths, entity);
        return MoveOutcome::Idle;
    }
    let (Some(position), Some(speed)) = (sim.store.position(entity), sim.store.speed(entity)) else {
        return MoveOutcome::Idle;
    };
    let epsilon = sim.config.movement.waypoint_epsilon;
    let max_step = speed.max(0.0) * dt;

    let Some(grid) = sim.grid.as_ref() else {
        let (next, direction, reached) = step_toward(position, move_target.position, max_step, epsilon);
        place(&mut sim.store, entity, next, direction * speed);
        if reached {
            halt(&mut sim.store, &mut sim.paths, entity);
            return MoveOutcome::Arrived;
        }
        return MoveOutcome::Moving;
    };

    let goal_cell = grid.world_to_cell(move_target.position.x, move_target.position.z);
    let needs_plan = sim.paths.get(entity).map_or(true, |p| p.goal_cell != goal_cell);
    if needs_plan {
        let waypoints = find_path(grid, position, move_target.position, sim.config.movement.heuristic);
        if waypoints.is_empty() {
            debug!(entity = %entity, goal = ?goal_cell, "no path, abandoning move");
            halt(&mut sim.store, &mut sim.paths, entity);
            return MoveOutcome::Abandoned;
        }
        trace!(entity = %entity, waypoints = waypoints.len(), "path planned");
        sim.paths.insert(entity, CachedPath::new(goal_cell, waypoints));
    }

    // distance left over after reaching a waypoint carries on to the next one
    let mut position = position;
    let mut budget = max_step;
    let mut heading = Vec3::ZERO;
    loop {
        let Some(waypoint) = sim.paths.get(entity).and_then(CachedPath::current) else {
            place(&mut sim.store, entity, position, Vec3::ZERO);
            halt(&mut sim.store, &mut sim.paths, entity);
            return MoveOutcome::Arrived;
        };

        let (next, direction, reached) = step_toward(position, waypoint, budget, epsilon);
        budget = (budget - position.distance(next)).max(0.0);
        position = next;
        if direction != Vec3::ZERO {
            heading = direction;
        }
        if !reached {
            break;
        }

        let complete = sim.paths.get_mut(entity).is_some_and(|path| {
            path.advance();
            path.is_complete()
        });
        if complete {
            place(&mut sim.store, entity, position, Vec3::ZERO);
            halt(&mut sim.store, &mut sim.paths, entity);
            return MoveOutcome::Arrived;
        }
        if budget <= 0.0 {
            break;
        }
    }

    place(&mut sim.store, entity, position, heading * speed);
    MoveOutcome::Moving
}

/// Step from `from` toward `to` by at most `max_step`. Returns the new
/// position, the unit direction travelled and whether `to` is now within
/// `epsilon`.
pub fn step_toward(from: Vec3, to: Vec3, max_step: f32, epsilon: f32) -> (Vec3, Vec3, bool) {
    let delta = to - from;
    let distance = delta.length();
    if distance <= epsilon {
        return (from, Vec3::ZERO, true);
    }
    let direction = delta / distance;
    let step = max_step.min(distance);
    (from + direction * step, direction, distance - step <= epsilon)
}

fn place(store: &mut EntityStore, entity: EntityId, position: Vec3, velocity: Vec3) {
    if let Some(p) = store.position_mut(entity) {
        *p = position;
    }
    if let Some(v) = store.velocity_mut(entity) {
        *v = velocity;
    }
}

/// Clear the move intent, zero velocity and forget the cached path
fn halt(store: &mut EntityStore, paths: &mut PathStore, entity: EntityId) {
    if let Some(move_target) = store.move_target_mut(entity) {
        move_target.clear();
    }
    if let Some(v) = store.velocity_mut(entity) {
        *v = Vec3::ZERO;
    }
    paths.remove(entity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{CombatState, Cooldowns, MoveTarget};
    use crate::map::GridMap;

    fn walker(sim: &mut Simulation, position: Vec3, speed: f32) -> EntityId {
        let e = sim.store.spawn().unwrap();
        sim.store.attach_position(e, position);
        sim.store.attach_velocity(e, Vec3::ZERO);
        sim.store.attach_move_target(e, MoveTarget::default());
        sim.store.attach_speed(e, speed);
        e
    }

    fn corridor() -> GridMap {
        GridMap::from_ascii(
            &[
                "#######", //
                "#.....#", //
                "#.###.#", //
                "#.#.#.#", //
                "#######",
            ],
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn test_step_toward_caps_at_target() {
        let (next, dir, reached) = step_toward(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 5.0, 0.15);
        assert_eq!(next, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(dir, Vec3::X);
        assert!(reached);

        let (next, _, reached) = step_toward(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), 1.0, 0.15);
        assert_eq!(next, Vec3::new(1.0, 0.0, 0.0));
        assert!(!reached);
    }

    #[test]
    fn test_direct_mode_arrives_without_overshoot() {
        let mut sim = Simulation::default();
        let e = walker(&mut sim, Vec3::ZERO, 5.0);
        sim.issue_move(e, Vec3::new(2.0, 0.0, 0.0)).unwrap();

        let mut outcomes = Vec::new();
        for _ in 0..4 {
            outcomes.push(step_entity(&mut sim, e, 0.1));
            assert!(sim.store.position(e).unwrap().x <= 2.0 + 1e-5);
        }
        assert_eq!(outcomes.last(), Some(&MoveOutcome::Arrived));
        assert!((sim.store.position(e).unwrap().x - 2.0).abs() < 0.15);
        assert!(!sim.store.move_target(e).unwrap().active);
        assert_eq!(sim.store.velocity(e), Some(Vec3::ZERO));
    }

    #[test]
    fn test_path_mode_routes_through_walkable_cells() {
        let grid = corridor();
        let mut sim = Simulation::default().with_grid(grid.clone());
        // bottom-left pocket (1,3) to bottom-right pocket (5,3)
        let start = grid.cell_center(crate::map::Cell::new(1, 3), 0.0);
        let goal = grid.cell_center(crate::map::Cell::new(5, 3), 0.0);
        let e = walker(&mut sim, start, 4.0);
        sim.issue_move(e, goal).unwrap();

        let mut arrived = false;
        for _ in 0..200 {
            let outcome = step_entity(&mut sim, e, 0.05);
            let p = sim.store.position(e).unwrap();
            assert!(!grid.is_wall(p.x, p.z), "walked into a wall at {p}");
            if outcome == MoveOutcome::Arrived {
                arrived = true;
                break;
            }
        }
        assert!(arrived);
        assert!(sim.store.position(e).unwrap().distance(goal) <= 0.15);
        assert!(sim.paths.get(e).is_none());
    }

    #[test]
    fn test_step_budget_carries_past_waypoints() {
        let grid = corridor();
        let mut sim = Simulation::default().with_grid(grid.clone());
        let start = grid.cell_center(crate::map::Cell::new(1, 1), 0.0);
        let e = walker(&mut sim, start, 2.5);
        sim.issue_move(e, grid.cell_center(crate::map::Cell::new(5, 1), 0.0))
            .unwrap();

        // one second at 2.5 u/s passes two one-unit waypoints mid-tick
        assert_eq!(step_entity(&mut sim, e, 1.0), MoveOutcome::Moving);
        let p = sim.store.position(e).unwrap();
        assert!((p.distance(start) - 2.5).abs() < 1e-4, "moved to {p}");
        assert_eq!(sim.store.velocity(e), Some(Vec3::X * 2.5));
        assert_eq!(
            sim.paths.get(e).and_then(CachedPath::current),
            Some(grid.cell_center(crate::map::Cell::new(4, 1), 0.0))
        );

        assert_eq!(step_entity(&mut sim, e, 1.0), MoveOutcome::Arrived);
        assert_eq!(sim.store.velocity(e), Some(Vec3::ZERO));
    }

    #[test]
    fn test_unreachable_goal_abandons() {
        let grid = corridor();
        let mut sim = Simulation::default().with_grid(grid.clone());
        let start = grid.cell_center(crate::map::Cell::new(1, 1), 0.0);
        let e = walker(&mut sim, start, 4.0);
        // (3,3) is floor but sealed off
        sim.issue_move(e, grid.cell_center(crate::map::Cell::new(3, 3), 0.0))
            .unwrap();

        assert_eq!(step_entity(&mut sim, e, 0.1), MoveOutcome::Abandoned);
        assert_eq!(sim.store.position(e), Some(start));
        assert!(!sim.store.move_target(e).unwrap().active);
        assert_eq!(sim.store.velocity(e), Some(Vec3::ZERO));

        // not retried on later ticks
        assert_eq!(step_entity(&mut sim, e, 0.1), MoveOutcome::Idle);
        assert_eq!(sim.store.position(e), Some(start));
    }

    #[test]
    fn test_wall_goal_abandons() {
        let grid = corridor();
        let mut sim = Simulation::default().with_grid(grid.clone());
        let e = walker(&mut sim, grid.cell_center(crate::map::Cell::new(1, 1), 0.0), 4.0);
        sim.issue_move(e, grid.cell_center(crate::map::Cell::new(3, 2), 0.0))
            .unwrap();
        assert_eq!(step_entity(&mut sim, e, 0.1), MoveOutcome::Abandoned);
    }

    #[test]
    fn test_goal_cell_change_replans() {
        let grid = corridor();
        let mut sim = Simulation::default().with_grid(grid.clone());
        let e = walker(&mut sim, grid.cell_center(crate::map::Cell::new(1, 1), 0.0), 1.0);
        sim.issue_move(e, grid.cell_center(crate::map::Cell::new(5, 1), 0.0))
            .unwrap();
        step_entity(&mut sim, e, 0.1);
        assert_eq!(sim.paths.get(e).unwrap().goal_cell, crate::map::Cell::new(5, 1));

        // same cell, different point: path kept
        sim.issue_move(e, grid.cell_center(crate::map::Cell::new(5, 1), 0.0) + Vec3::new(0.2, 0.0, 0.0))
            .unwrap();
        step_entity(&mut sim, e, 0.1);
        assert_eq!(sim.paths.get(e).unwrap().goal_cell, crate::map::Cell::new(5, 1));

        sim.issue_move(e, grid.cell_center(crate::map::Cell::new(1, 3), 0.0))
            .unwrap();
        step_entity(&mut sim, e, 0.1);
        assert_eq!(sim.paths.get(e).unwrap().goal_cell, crate::map::Cell::new(1, 3));
    }

    #[test]
    fn test_inactive_target_drops_path() {
        let grid = corridor();
        let mut sim = Simulation::default().with_grid(grid.clone());
        let e = walker(&mut sim, grid.cell_center(crate::map::Cell::new(1, 1), 0.0), 1.0);
        sim.issue_move(e, grid.cell_center(crate::map::Cell::new(5, 1), 0.0))
            .unwrap();
        step_entity(&mut sim, e, 0.1);
        assert!(sim.paths.get(e).is_some());

        sim.store.move_target_mut(e).unwrap().clear();
        assert_eq!(step_entity(&mut sim, e, 0.1), MoveOutcome::Idle);
        assert!(sim.paths.get(e).is_none());
    }

    #[test]
    fn test_dead_entities_do_not_move() {
        let mut sim = Simulation::default();
        let e = walker(&mut sim, Vec3::ZERO, 5.0);
        sim.store.attach_combat_state(e, CombatState::Idle);
        sim.store.attach_cooldowns(e, Cooldowns::default());
        sim.issue_move(e, Vec3::new(3.0, 0.0, 0.0)).unwrap();
        sim.store.mark_dead(e);

        assert_eq!(step_entity(&mut sim, e, 0.1), MoveOutcome::Idle);
        assert_eq!(sim.store.position(e), Some(Vec3::ZERO));
    }
}
