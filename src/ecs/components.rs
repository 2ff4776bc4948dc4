//! Component types. Each is a plain value owned by its table in the store.

use crate::game::Point;
use serde::{Deserialize, Serialize};

/// RGBA colour packed as `0xRRGGBBAA`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const WHITE: Color = Color(0xffff_ffff);

    /// Packs four channels.
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn blue(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn alpha(self) -> u8 {
        self.0 as u8
    }

    /// Same colour with a different alpha channel.
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Color((self.0 & 0xffff_ff00) | alpha as u32)
    }
}

/// Draw order within a cell. Later layers cover earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    Ground,
    Mid,
    Air,
    Top,
}

/// Where an entity sits on the map. Only changed through the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub layer: Layer,
}

impl Position {
    pub fn new(x: i32, y: i32, layer: Layer) -> Self {
        Self { x, y, layer }
    }

    pub fn at(point: Point, layer: Layer) -> Self {
        Self::new(point.x, point.y, layer)
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// How an entity is drawn and named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visibility {
    pub glyph: char,
    pub fg_color: Color,
    pub bg_color: Color,
    /// Set once the cell has been inside the player's FOV. Never cleared.
    pub has_been_seen: bool,
    /// Remembered cells keep drawing this entity outside the FOV.
    pub visible_outside_fov: bool,
    pub name: String,
}

impl Visibility {
    pub fn new(glyph: char, fg_color: Color, name: impl Into<String>) -> Self {
        Self {
            glyph,
            fg_color,
            bg_color: Color::TRANSPARENT,
            has_been_seen: false,
            visible_outside_fov: false,
            name: name.into(),
        }
    }

    /// Marks this entity as map furniture that stays drawn once seen.
    pub fn remembered(mut self) -> Self {
        self.visible_outside_fov = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Physical {
    pub blocks_movement: bool,
    pub blocks_sight: bool,
}

impl Physical {
    pub const OPEN: Physical = Physical {
        blocks_movement: false,
        blocks_sight: false,
    };
    pub const SOLID: Physical = Physical {
        blocks_movement: true,
        blocks_sight: true,
    };
    pub const OBSTACLE: Physical = Physical {
        blocks_movement: true,
        blocks_sight: false,
    };
}

/// Autonomous movement. Entities without it never move on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Actions per move opportunity
    pub speed: i32,
    /// Turns between move opportunities
    pub frequency: i32,
    pub ticks_until_next_move: i32,
    pub chasing_player: bool,
    pub turns_since_player_seen: i32,
}

impl Movement {
    pub fn new(speed: i32, frequency: i32) -> Self {
        Self {
            speed,
            frequency,
            ticks_until_next_move: frequency,
            chasing_player: false,
            turns_since_player_seen: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current_hp: i32,
    pub max_hp: i32,
    pub recovery_rate: i32,
    /// Countdown to removal once dead
    pub ticks_until_removal: i32,
}

impl Health {
    pub fn new(max_hp: i32, recovery_rate: i32) -> Self {
        Self {
            current_hp: max_hp,
            max_hp,
            recovery_rate,
            ticks_until_removal: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.current_hp <= 0
    }
}

/// Combat stats. Items carry only the modifier fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Combat {
    pub to_hit: i32,
    pub to_hit_modifier: i32,
    pub attack: i32,
    pub attack_modifier: i32,
    pub defense: i32,
    pub defense_modifier: i32,
}

impl Combat {
    pub fn new(to_hit: i32, attack: i32, defense: i32) -> Self {
        Self {
            to_hit,
            attack,
            defense,
            ..Self::default()
        }
    }

    pub fn modifiers(to_hit_modifier: i32, attack_modifier: i32, defense_modifier: i32) -> Self {
        Self {
            to_hit_modifier,
            attack_modifier,
            defense_modifier,
            ..Self::default()
        }
    }

    pub fn total_attack(&self) -> i32 {
        self.attack + self.attack_modifier
    }

    pub fn total_defense(&self) -> i32 {
        self.defense + self.defense_modifier
    }

    pub fn hit_window(&self) -> i32 {
        self.to_hit + self.to_hit_modifier
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub quantity: i32,
    pub weight: i32,
    /// Turns left while carried
    pub lifetime: i32,
    pub slot: String,
    pub is_equipped: bool,
}

impl Equipment {
    pub fn new(quantity: i32, weight: i32, lifetime: i32, slot: impl Into<String>) -> Self {
        Self {
            quantity,
            weight,
            lifetime,
            slot: slot.into(),
            is_equipped: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treasure {
    pub value: i32,
}

/// Direction a two-way colour cycle is heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationPhase {
    Brightening,
    Fading,
}

/// What an animation does on each keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationKind {
    /// Cycles the foreground between `base` and white.
    GemShimmer { base: Color },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    pub keyframe_interval: i32,
    pub ticks_until_keyframe: i32,
    pub finished: bool,
    pub kind: AnimationKind,
    pub phase: AnimationPhase,
}

impl Animation {
    pub fn new(kind: AnimationKind, keyframe_interval: i32) -> Self {
        Self {
            keyframe_interval,
            ticks_until_keyframe: keyframe_interval,
            finished: false,
            kind,
            phase: AnimationPhase::Brightening,
        }
    }
}

/// Marks a staircase down, or the exit portal on the last level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stairs;

/// Runtime tag for each component table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Position,
    Visibility,
    Physical,
    Movement,
    Health,
    Combat,
    Equipment,
    Treasure,
    Animation,
    Stairs,
}
