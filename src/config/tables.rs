//! # Data Tables
//!
//! Typed monster, item and level tables built from parsed data files.

use super::parser::{ConfigFile, ConfigSection};
use super::MAX_DUNGEON_LEVEL;
use crate::ecs::Color;
use crate::{CavernsError, CavernsResult};
use rand::Rng;
use std::path::Path;

const BUILTIN_MONSTERS: &str = include_str!("../../data/monsters.cfg");
const BUILTIN_ITEMS: &str = include_str!("../../data/items.cfg");
const BUILTIN_LEVELS: &str = include_str!("../../data/levels.cfg");

/// A per-level integer table, indexed by 1-based dungeon depth.
///
/// Built from `"lvl,value,lvl,value,..."`: each value covers the levels after
/// the previous bound up to and including its own level. Levels past the last
/// bound hold 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTable {
    values: Vec<i32>,
}

impl LevelTable {
    /// Parses a `lvl,value` pair list.
    ///
    /// # Examples
    ///
    /// ```
    /// use caverns::LevelTable;
    ///
    /// let table = LevelTable::parse("3,60,6,25").unwrap();
    /// assert_eq!(table.at(1), 60);
    /// assert_eq!(table.at(3), 60);
    /// assert_eq!(table.at(4), 25);
    /// assert_eq!(table.at(7), 0);
    /// ```
    pub fn parse(raw: &str) -> CavernsResult<Self> {
        let tokens: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.len() % 2 != 0 {
            return Err(CavernsError::Config(format!(
                "level table '{}' has an odd number of entries",
                raw
            )));
        }

        let mut values = vec![0; MAX_DUNGEON_LEVEL as usize];
        let mut last_level = 0usize;
        for pair in tokens.chunks(2) {
            let level: usize = pair[0].parse().map_err(|_| {
                CavernsError::Config(format!("bad level '{}' in '{}'", pair[0], raw))
            })?;
            let value: i32 = pair[1].parse().map_err(|_| {
                CavernsError::Config(format!("bad value '{}' in '{}'", pair[1], raw))
            })?;

            let upper = level.min(values.len());
            for slot in values.iter_mut().take(upper).skip(last_level) {
                *slot = value;
            }
            last_level = last_level.max(level);
        }

        Ok(Self { values })
    }

    /// Value at a 1-based level. Level 0 and levels past the table are 0.
    pub fn at(&self, level: u32) -> i32 {
        if level == 0 {
            return 0;
        }
        self.values.get(level as usize - 1).copied().unwrap_or(0)
    }
}

/// Stats for one kind of monster.
#[derive(Debug, Clone, PartialEq)]
pub struct MonsterTemplate {
    pub id: u32,
    pub name: String,
    pub glyph: char,
    pub color: Color,
    pub speed: i32,
    pub frequency: i32,
    pub max_hp: i32,
    pub recovery_rate: i32,
    pub to_hit: i32,
    pub attack: i32,
    pub defense: i32,
    pub appearance: LevelTable,
}

impl MonsterTemplate {
    fn from_section(section: &ConfigSection) -> CavernsResult<Self> {
        Ok(Self {
            id: section.get("id")?,
            name: section.get("name")?,
            glyph: parse_glyph(section)?,
            color: parse_color(section)?,
            speed: section.get("mv_speed")?,
            frequency: section.get("mv_frequency")?,
            max_hp: section.get("h_maxHP")?,
            recovery_rate: section.get("h_recRate")?,
            to_hit: section.get("com_toHit")?,
            attack: section.get("com_attack")?,
            defense: section.get("com_defense")?,
            appearance: LevelTable::parse(&section.get::<String>("appearance_prob")?)?,
        })
    }
}

/// Stats for one kind of carryable item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTemplate {
    pub id: u32,
    pub name: String,
    pub glyph: char,
    pub color: Color,
    pub to_hit_modifier: i32,
    pub attack_modifier: i32,
    pub defense_modifier: i32,
    pub quantity: i32,
    pub slot: String,
    pub weight: i32,
    pub appearance: LevelTable,
}

impl ItemTemplate {
    fn from_section(section: &ConfigSection) -> CavernsResult<Self> {
        Ok(Self {
            id: section.get("id")?,
            name: section.get("name")?,
            glyph: parse_glyph(section)?,
            color: parse_color(section)?,
            to_hit_modifier: section.get("com_toHitModifier")?,
            attack_modifier: section.get("com_attackModifier")?,
            defense_modifier: section.get("com_defenseModifier")?,
            quantity: section.get("eq_quantity")?,
            slot: section.get("eq_slot")?,
            weight: section.get("eq_weight")?,
            appearance: LevelTable::parse(&section.get::<String>("appearance_prob")?)?,
        })
    }
}

fn parse_glyph(section: &ConfigSection) -> CavernsResult<char> {
    let raw = section.get::<String>("vis_glyph")?;
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(glyph), None) => Ok(glyph),
        _ => Err(CavernsError::Config(format!(
            "[{}] vis_glyph must be a single character, got '{}'",
            section.name, raw
        ))),
    }
}

fn parse_color(section: &ConfigSection) -> CavernsResult<Color> {
    let raw = section.get::<String>("vis_color")?;
    u32::from_str_radix(raw.trim_start_matches("0x"), 16)
        .map(Color)
        .map_err(|_| {
            CavernsError::Config(format!(
                "[{}] vis_color '{}' is not an rrggbbaa hex value",
                section.name, raw
            ))
        })
}

/// Everything level population reads from data files.
#[derive(Debug, Clone, PartialEq)]
pub struct GameData {
    /// Sorted by id; weighted picks accumulate in this order.
    pub monsters: Vec<MonsterTemplate>,
    /// Sorted by id.
    pub items: Vec<ItemTemplate>,
    pub max_monsters: LevelTable,
    pub max_items: LevelTable,
}

impl GameData {
    /// Tables compiled into the crate from `data/*.cfg`.
    pub fn builtin() -> CavernsResult<Self> {
        Self::from_configs(
            &ConfigFile::parse(BUILTIN_MONSTERS)?,
            &ConfigFile::parse(BUILTIN_ITEMS)?,
            &ConfigFile::parse(BUILTIN_LEVELS)?,
        )
    }

    /// Loads `monsters.cfg`, `items.cfg` and `levels.cfg` from a directory.
    pub fn load_dir(dir: impl AsRef<Path>) -> CavernsResult<Self> {
        let dir = dir.as_ref();
        log::info!("Loading game data from {}", dir.display());
        Self::from_configs(
            &ConfigFile::load(dir.join("monsters.cfg"))?,
            &ConfigFile::load(dir.join("items.cfg"))?,
            &ConfigFile::load(dir.join("levels.cfg"))?,
        )
    }

    /// Builds typed tables from parsed files.
    pub fn from_configs(
        monsters: &ConfigFile,
        items: &ConfigFile,
        levels: &ConfigFile,
    ) -> CavernsResult<Self> {
        let mut monsters = monsters
            .sections()
            .iter()
            .filter(|s| s.name == "Monster")
            .map(MonsterTemplate::from_section)
            .collect::<CavernsResult<Vec<_>>>()?;
        monsters.sort_by_key(|m| m.id);

        let mut items = items
            .sections()
            .iter()
            .filter(|s| s.name == "Item")
            .map(ItemTemplate::from_section)
            .collect::<CavernsResult<Vec<_>>>()?;
        items.sort_by_key(|i| i.id);

        if monsters.is_empty() {
            return Err(CavernsError::Config("no [Monster] sections".to_string()));
        }
        if items.is_empty() {
            return Err(CavernsError::Config("no [Item] sections".to_string()));
        }

        let level_section = levels
            .section("Levels")
            .ok_or_else(|| CavernsError::Config("missing [Levels] section".to_string()))?;
        let max_monsters = LevelTable::parse(&level_section.get::<String>("max_monsters")?)?;
        let max_items = LevelTable::parse(&level_section.get::<String>("max_items")?)?;

        log::debug!(
            "Game data: {} monster kinds, {} item kinds",
            monsters.len(),
            items.len()
        );

        Ok(Self {
            monsters,
            items,
            max_monsters,
            max_items,
        })
    }

    /// Picks a monster kind for a level by weighted appearance probability.
    ///
    /// Rolls `0..100` and returns the first kind whose running probability
    /// total reaches the roll, falling back to the first kind.
    pub fn monster_for_level<R: Rng>(&self, level: u32, rng: &mut R) -> &MonsterTemplate {
        let roll = rng.gen_range(0..100);
        let index = weighted_pick(self.monsters.iter().map(|m| m.appearance.at(level)), roll);
        &self.monsters[index]
    }

    /// Picks an item kind for a level by weighted appearance probability.
    pub fn item_for_level<R: Rng>(&self, level: u32, rng: &mut R) -> &ItemTemplate {
        let roll = rng.gen_range(0..100);
        let index = weighted_pick(self.items.iter().map(|i| i.appearance.at(level)), roll);
        &self.items[index]
    }
}

fn weighted_pick(weights: impl Iterator<Item = i32>, roll: i32) -> usize {
    let mut accum = 0;
    for (index, weight) in weights.enumerate() {
        accum += weight;
        if accum >= roll {
            return index;
        }
    }
    0
}
