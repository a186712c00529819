//! Loot table data.
//!
//! Tables are plain data so designers can ship them as RON next to the map
//! files. The built-in set covers levels 1..=100.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SimResult;

/// A droppable item kind with the monster levels it can drop from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseItem {
    pub id: String,
    pub name: String,
    pub min_level: u32,
    pub max_level: u32,
}

impl BaseItem {
    pub fn drops_at(&self, level: u32) -> bool {
        (self.min_level..=self.max_level).contains(&level)
    }
}

/// One value band of an affix, unlocked from `min_level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffixTier {
    pub min_level: u32,
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffixDef {
    pub id: String,
    /// Display text. Prefixes are capitalised words ("Sharp"), suffixes
    /// start with "of" ("of the Bear").
    pub name: String,
    pub stat: String,
    pub tiers: Vec<AffixTier>,
}

impl AffixDef {
    pub fn is_suffix(&self) -> bool {
        self.name.starts_with("of ")
    }

    pub fn is_prefix(&self) -> bool {
        !self.is_suffix() && self.name.chars().next().is_some_and(char::is_uppercase)
    }

    pub fn available_at(&self, level: u32) -> bool {
        self.tiers.iter().any(|t| t.min_level <= level)
    }

    /// Highest tier unlocked at `level`
    pub fn best_tier(&self, level: u32) -> Option<AffixTier> {
        self.tiers
            .iter()
            .filter(|t| t.min_level <= level)
            .max_by_key(|t| t.min_level)
            .copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootTables {
    pub base_items: Vec<BaseItem>,
    pub prefixes: Vec<AffixDef>,
    pub suffixes: Vec<AffixDef>,
}

impl LootTables {
    pub fn from_ron(source: &str) -> SimResult<Self> {
        Ok(ron::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_ron(&content)
    }

    pub fn base_items_for(&self, level: u32) -> Vec<&BaseItem> {
        self.base_items.iter().filter(|b| b.drops_at(level)).collect()
    }

    /// Prefixes then suffixes, keeping only those with a tier at `level`
    pub fn affixes_for(&self, level: u32) -> Vec<&AffixDef> {
        self.prefixes
            .iter()
            .chain(self.suffixes.iter())
            .filter(|a| a.available_at(level))
            .collect()
    }
}

fn base(id: &str, name: &str, min_level: u32, max_level: u32) -> BaseItem {
    BaseItem {
        id: id.into(),
        name: name.into(),
        min_level,
        max_level,
    }
}

fn affix(id: &str, name: &str, stat: &str, tiers: &[(u32, i32, i32)]) -> AffixDef {
    AffixDef {
        id: id.into(),
        name: name.into(),
        stat: stat.into(),
        tiers: tiers
            .iter()
            .map(|&(min_level, min, max)| AffixTier { min_level, min, max })
            .collect(),
    }
}

impl Default for LootTables {
    fn default() -> Self {
        Self {
            base_items: vec![
                base("short_sword", "Short Sword", 1, 20),
                base("leather_cap", "Leather Cap", 1, 15),
                base("buckler", "Buckler", 1, 25),
                base("hand_axe", "Hand Axe", 5, 35),
                base("chain_mail", "Chain Mail", 10, 50),
                base("war_hammer", "War Hammer", 20, 70),
                base("great_sword", "Great Sword", 30, 100),
                base("plate_armor", "Plate Armor", 40, 100),
                base("runed_circlet", "Runed Circlet", 60, 100),
            ],
            prefixes: vec![
                affix("sharp", "Sharp", "damage", &[(1, 1, 3), (10, 4, 7), (25, 8, 12), (50, 13, 20)]),
                affix("sturdy", "Sturdy", "armor", &[(1, 2, 5), (12, 6, 12), (30, 13, 25)]),
                affix("vital", "Vital", "max_hp", &[(1, 5, 10), (15, 11, 25), (40, 26, 50)]),
                affix("swift", "Swift", "attack_speed_pct", &[(5, 3, 6), (30, 7, 12)]),
                affix("vampiric", "Vampiric", "life_leech_pct", &[(20, 1, 3), (50, 4, 6)]),
            ],
            suffixes: vec![
                affix("of_the_bear", "of the Bear", "max_hp", &[(1, 4, 8), (20, 9, 20), (45, 21, 40)]),
                affix("of_mending", "of Mending", "health_regen", &[(1, 1, 2), (18, 3, 5)]),
                affix("of_the_fox", "of the Fox", "crit_chance_pct", &[(1, 1, 2), (25, 3, 5)]),
                affix("of_warding", "of Warding", "armor", &[(8, 3, 8), (35, 9, 18)]),
                affix("of_slaying", "of Slaying", "damage", &[(30, 5, 10), (60, 11, 18)]),
            ],
        }
    }
}
