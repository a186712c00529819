//! Player bag and the pickup range check.
//!
//! The bag has a fixed number of slots. Equipping and trading happen
//! elsewhere; this only receives items picked up from the ground.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::BASE_INVENTORY_SIZE;
use crate::ecs::{ComponentMask, EntityId, EntityStore};
use crate::loot::ItemData;

const MAX_INVENTORY_SIZE: usize = 60;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub capacity: usize,
    pub items: Vec<ItemData>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::with_capacity(BASE_INVENTORY_SIZE)
    }
}

impl Inventory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn used_slots(&self) -> usize {
        self.items.len()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Store an item. Returns `false` (and leaves the bag unchanged) when full.
    pub fn add(&mut self, item: ItemData) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<ItemData> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Grow the bag, up to the hard cap
    pub fn expand(&mut self, additional: usize) {
        self.capacity = (self.capacity + additional).min(MAX_INVENTORY_SIZE);
    }
}

/// Whether `picker` stands close enough to the ground item `item`
pub fn can_pickup(store: &EntityStore, picker: EntityId, item: EntityId, range: f32) -> bool {
    if !store.has(item, ComponentMask::ITEM) {
        return false;
    }
    store.distance(picker, item).is_some_and(|d| d <= range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loot::Rarity;

    fn item(name: &str) -> ItemData {
        ItemData {
            base_item_id: "short_sword".into(),
            name: name.into(),
            rarity: Rarity::Common,
            level: 1,
            affixes: Vec::new(),
        }
    }

    #[test]
    fn test_add_until_full() {
        let mut bag = Inventory::with_capacity(2);
        assert!(bag.add(item("a")));
        assert!(bag.add(item("b")));
        assert!(bag.is_full());
        assert!(!bag.add(item("c")));
        assert_eq!(bag.used_slots(), 2);
        assert_eq!(bag.items[1].name, "b");
    }

    #[test]
    fn test_remove_frees_slot() {
        let mut bag = Inventory::with_capacity(1);
        bag.add(item("a"));
        assert_eq!(bag.remove(0).map(|i| i.name), Some("a".to_string()));
        assert!(bag.remove(0).is_none());
        assert!(!bag.is_full());
    }

    #[test]
    fn test_expand_is_capped() {
        let mut bag = Inventory::default();
        assert_eq!(bag.capacity, BASE_INVENTORY_SIZE);
        bag.expand(1000);
        assert_eq!(bag.capacity, MAX_INVENTORY_SIZE);
    }

    #[test]
    fn test_can_pickup_range() {
        let mut store = EntityStore::with_capacity(4);
        let player = store.spawn().unwrap();
        store.attach_position(player, Vec3::ZERO);
        let near = store.spawn().unwrap();
        store.attach_position(near, Vec3::new(1.0, 0.5, 0.0));
        store.attach_item(near, item("near"));
        let far = store.spawn().unwrap();
        store.attach_position(far, Vec3::new(3.0, 0.5, 0.0));
        store.attach_item(far, item("far"));

        assert!(can_pickup(&store, player, near, 1.5));
        assert!(!can_pickup(&store, player, far, 1.5));
        // a positioned non-item is never pickable
        assert!(!can_pickup(&store, near, player, 1.5));
    }
}
