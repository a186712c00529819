//! Event mailboxes owned by the simulation context.
//!
//! Each queue has one consumer that drains it to empty. There is no cap: a
//! consumer skipped for a tick leaves its events queued for the next drain.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::constants::QUEUE_WARN_THRESHOLD;

/// Attack intent produced by the combat system
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackEvent {
    pub attacker: EntityId,
    pub target: EntityId,
    pub damage: f32, // pre-mitigation roll
}

/// Resolved hit, for presentation collaborators
#[derive(Event, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    pub attacker: EntityId,
    pub target: EntityId,
    pub amount: f32,
    pub crit: bool,
    pub position: Vec3, // target position at resolution time
}

/// Death notification, consumed by loot generation
#[derive(Event, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeathEvent {
    pub entity: EntityId,
    pub killer: EntityId,
    pub position: Vec3,
    pub level: u32,
    pub was_monster: bool,
}

/// Single-consumer FIFO mailbox
#[derive(Debug)]
pub struct EventQueue<T> {
    name: &'static str,
    events: Vec<T>,
    warned: bool,
}

impl<T> EventQueue<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            events: Vec::new(),
            warned: false,
        }
    }

    pub fn push(&mut self, event: T) {
        self.events.push(event);
        if !self.warned && self.events.len() > QUEUE_WARN_THRESHOLD {
            self.warned = true;
            warn!(
                queue = self.name,
                len = self.events.len(),
                "event queue is growing without being drained"
            );
        }
    }

    /// Take every queued event, leaving the queue empty
    pub fn drain(&mut self) -> Vec<T> {
        self.warned = false;
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attack(damage: f32) -> AttackEvent {
        AttackEvent {
            attacker: EntityId::new(0, 0),
            target: EntityId::new(1, 0),
            damage,
        }
    }

    #[test]
    fn test_drain_empties_queue() {
        let mut queue = EventQueue::new("attack");
        queue.push(attack(1.0));
        queue.push(attack(2.0));
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].damage, 1.0);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_queue_keeps_growing_without_consumer() {
        let mut queue = EventQueue::new("attack");
        for i in 0..(QUEUE_WARN_THRESHOLD + 10) {
            queue.push(attack(i as f32));
        }
        assert_eq!(queue.len(), QUEUE_WARN_THRESHOLD + 10);
        assert_eq!(queue.drain().len(), QUEUE_WARN_THRESHOLD + 10);
    }

    #[test]
    fn test_iter_does_not_consume() {
        let mut queue = EventQueue::new("attack");
        queue.push(attack(3.0));
        assert_eq!(queue.iter().count(), 1);
        assert_eq!(queue.len(), 1);
    }
}
