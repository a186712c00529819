use bevy::prelude::*;
use std::collections::{HashMap, VecDeque};

use super::Cell;
use crate::ecs::EntityId;

/// Waypoints still to visit, plus the goal cell they were planned for
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPath {
    pub goal_cell: Cell,
    pub waypoints: VecDeque<Vec3>,
}

impl CachedPath {
    pub fn new(goal_cell: Cell, waypoints: Vec<Vec3>) -> Self {
        Self {
            goal_cell,
            waypoints: waypoints.into(),
        }
    }

    pub fn current(&self) -> Option<Vec3> {
        self.waypoints.front().copied()
    }

    pub fn advance(&mut self) -> Option<Vec3> {
        self.waypoints.pop_front()
    }

    pub fn is_complete(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// Per-entity path cache. A missing entry means "plan before moving".
#[derive(Debug, Default)]
pub struct PathStore {
    paths: HashMap<EntityId, CachedPath>,
}

impl PathStore {
    pub fn get(&self, entity: EntityId) -> Option<&CachedPath> {
        self.paths.get(&entity)
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut CachedPath> {
        self.paths.get_mut(&entity)
    }

    pub fn insert(&mut self, entity: EntityId, path: CachedPath) {
        self.paths.insert(entity, path);
    }

    pub fn remove(&mut self, entity: EntityId) -> Option<CachedPath> {
        self.paths.remove(&entity)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }
}
