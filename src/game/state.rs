//! # Game State Module
//!
//! The [`World`] context that every turn system works on.
//!
//! A `World` owns the entity store, the random source, the data tables and
//! the per-level derived maps (walls, FOV, target map). Player commands come
//! in through [`World::apply`]; each one that uses a turn is followed by the
//! fixed system order in [`World::update`].

use super::{calculate_fov, mark_seen, EntitySight, MessageLog, Point};
use crate::config::{GameData, DEFAULT_MAX_WEIGHT, FOV_DISTANCE, MAX_DUNGEON_LEVEL};
use crate::ecs::{
    Color, Combat, EntityId, EntityStore, Health, Layer, Physical, Position, Stairs, Visibility,
};
use crate::generation::utils::create_rng;
use crate::generation::{
    open_point, populate_gems, populate_items, populate_monsters, spawn_player, spawn_stairs,
    spawn_terrain, spawn_wall, GenerationConfig, Generator, RoomCorridorGenerator,
};
use crate::input::{PlayerCommand, TurnOutcome};
use crate::systems;
use crate::utils::{generate_target_map, Grid, UNREACHABLE};
use crate::{CavernsError, CavernsResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Alpha applied to remembered cells drawn outside the FOV.
pub const REMEMBERED_ALPHA: u8 = 0x77;

const DIVIDER_COLOR: Color = Color(0x5555_55ff);
const DESCEND_COLOR: Color = Color(0x9900_00ff);

/// Game completion state for handling endings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameCompletionState {
    /// Game is still in progress
    Playing,
    /// Player died
    PlayerDied,
    /// Player went through the portal on the last level
    Won,
}

/// Game statistics tracking player progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Player actions that used a turn
    pub turns_taken: u64,
    /// Successful player steps
    pub steps_taken: u64,
    pub monsters_killed: u32,
    pub damage_dealt: u64,
    pub damage_taken: u64,
    /// Gems collected across all levels
    pub gems_collected: u32,
    pub items_picked_up: u32,
    /// Deepest level reached
    pub max_depth_reached: u32,
}

/// What a cell looks like to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Glyph {
    pub glyph: char,
    pub fg_color: Color,
    pub bg_color: Color,
}

/// End-of-run report, serialised by the driver binary.
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub seed: u64,
    pub completion_state: GameCompletionState,
    pub depth: u32,
    pub player_hp: i32,
    pub player_max_hp: i32,
    pub gems_found_this_level: u32,
    pub carried_items: Vec<String>,
    pub statistics: GameStatistics,
    pub recent_messages: Vec<String>,
}

/// The complete simulation state.
#[derive(Debug, Clone)]
pub struct World {
    pub store: EntityStore,
    pub rng: StdRng,
    pub data: GameData,
    pub config: GenerationConfig,
    pub player: EntityId,
    /// Current dungeon level, starting at 1
    pub depth: u32,
    /// Wall layout of the current level (`true` = wall)
    pub walls: Grid<bool>,
    /// Items the player carries, newest first. They have no position.
    pub carried: Vec<EntityId>,
    pub max_weight: i32,
    pub gems_found_this_level: u32,
    pub player_took_turn: bool,
    pub recalculate_fov: bool,
    pub completion_state: GameCompletionState,
    pub statistics: GameStatistics,
    fov: Grid<bool>,
    target_map: Grid<i32>,
    messages: MessageLog,
}

impl World {
    /// Starts a new game on a full-size first level with the built-in data.
    ///
    /// # Examples
    ///
    /// ```
    /// use caverns::{GameCompletionState, World};
    ///
    /// let world = World::new(7).unwrap();
    /// assert_eq!(world.depth, 1);
    /// assert_eq!(world.completion_state, GameCompletionState::Playing);
    /// assert!(world.player_position().is_some());
    /// ```
    pub fn new(seed: u64) -> CavernsResult<Self> {
        Self::with_config(GenerationConfig::new(seed), GameData::builtin()?)
    }

    /// Starts a new game with explicit generation settings and data tables.
    pub fn with_config(config: GenerationConfig, data: GameData) -> CavernsResult<Self> {
        let mut world = Self::empty(config, data)?;
        world.generate_level()?;
        log::info!(
            "New game (seed {}) on a {}x{} map",
            world.config.seed,
            world.config.width,
            world.config.height
        );
        Ok(world)
    }

    /// A world with the player created but no level: no walls, no other
    /// entities and the player off the map. Used to build scenarios by hand.
    pub fn empty(config: GenerationConfig, data: GameData) -> CavernsResult<Self> {
        let mut store = EntityStore::new();
        let player = spawn_player(&mut store)?;
        let (width, height) = (config.width, config.height);

        Ok(Self {
            store,
            rng: create_rng(&config),
            data,
            config,
            player,
            depth: 1,
            walls: Grid::new(width, height, false),
            carried: Vec::new(),
            max_weight: DEFAULT_MAX_WEIGHT,
            gems_found_this_level: 0,
            player_took_turn: false,
            recalculate_fov: false,
            completion_state: GameCompletionState::Playing,
            statistics: GameStatistics {
                max_depth_reached: 1,
                ..GameStatistics::default()
            },
            fov: Grid::new(width, height, false),
            target_map: Grid::new(width, height, UNREACHABLE),
            messages: MessageLog::new(),
        })
    }

    /// Replaces the current level with a freshly generated one at `depth`.
    ///
    /// Everything except the player and the carried items is destroyed
    /// first. The FOV and target map are recomputed for the new player
    /// position.
    pub fn generate_level(&mut self) -> CavernsResult<()> {
        self.clear_level();

        let layout = RoomCorridorGenerator::new().generate(&self.config, &mut self.rng)?;
        log::debug!(
            "Level {}: {} rooms, {} corridors",
            self.depth,
            layout.rooms.len(),
            layout.corridors.len()
        );
        self.walls = layout.walls;

        spawn_terrain(&mut self.store, &self.walls)?;
        populate_monsters(&mut self.store, &self.data, self.depth, &self.walls, &mut self.rng)?;
        populate_items(&mut self.store, &self.data, self.depth, &self.walls, &mut self.rng)?;
        populate_gems(&mut self.store, &self.walls, &mut self.rng)?;

        let stairs = open_point(&self.store, &self.walls, &mut self.rng)?;
        spawn_stairs(&mut self.store, stairs, self.depth >= MAX_DUNGEON_LEVEL)?;

        let start = open_point(&self.store, &self.walls, &mut self.rng)?;
        self.store
            .set_position(self.player, Some(Position::at(start, Layer::Top)));

        self.gems_found_this_level = 0;
        self.statistics.max_depth_reached = self.statistics.max_depth_reached.max(self.depth);
        self.refresh_fov()?;
        self.refresh_target_map()?;
        log::debug!(
            "Level {} populated with {} entities",
            self.depth,
            self.store.len()
        );
        Ok(())
    }

    fn clear_level(&mut self) {
        let doomed: Vec<EntityId> = self
            .store
            .entities()
            .filter(|id| *id != self.player && !self.carried.contains(id))
            .collect();
        for id in doomed {
            self.store.destroy(id);
        }
    }

    /// Puts the player on a cell and refreshes the derived maps.
    pub fn place_player(&mut self, point: Point) -> CavernsResult<()> {
        self.store
            .set_position(self.player, Some(Position::at(point, Layer::Top)));
        self.refresh_fov()?;
        self.refresh_target_map()
    }

    /// Adds a wall to both the wall grid and the entity store.
    pub fn add_wall(&mut self, point: Point) -> CavernsResult<EntityId> {
        if !self.walls.set(point, true) {
            return Err(CavernsError::InvalidAction(format!(
                "wall at ({}, {}) is off the map",
                point.x, point.y
            )));
        }
        spawn_wall(&mut self.store, point)
    }

    pub fn player_position(&self) -> Option<Point> {
        self.store.position(self.player).map(|pos| pos.point())
    }

    /// The player's cell, or `InvalidState` when the player is off the map.
    pub fn player_point(&self) -> CavernsResult<Point> {
        self.player_position()
            .ok_or_else(|| CavernsError::InvalidState("player has no position".to_string()))
    }

    pub fn player_health(&self) -> Option<&Health> {
        self.store.get::<Health>(self.player)
    }

    /// Whether a cell is on the map and free of movement blockers.
    pub fn can_move(&self, point: Point) -> bool {
        if !self.walls.in_bounds(point) {
            return false;
        }
        !self.store.entities_at(point).iter().any(|&id| {
            self.store
                .get::<Physical>(id)
                .map(|physical| physical.blocks_movement)
                .unwrap_or(false)
        })
    }

    pub fn fov(&self) -> &Grid<bool> {
        &self.fov
    }

    pub fn in_fov(&self, point: Point) -> bool {
        self.fov.get(point).copied().unwrap_or(false)
    }

    pub fn target_map(&self) -> &Grid<i32> {
        &self.target_map
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn add_message(&mut self, text: impl Into<String>, color: Color) {
        self.messages.add_message(text, color);
    }

    pub fn is_over(&self) -> bool {
        self.completion_state != GameCompletionState::Playing
    }

    /// Recomputes the FOV from the player and marks what it reveals as seen.
    pub fn refresh_fov(&mut self) -> CavernsResult<()> {
        let origin = self.player_point()?;
        let sight = EntitySight {
            store: &self.store,
            width: self.walls.width(),
            height: self.walls.height(),
        };
        self.fov = calculate_fov(origin, FOV_DISTANCE, &sight);
        mark_seen(&mut self.store, &self.fov);
        self.recalculate_fov = false;
        Ok(())
    }

    /// Rebuilds the distance field toward the player.
    pub fn refresh_target_map(&mut self) -> CavernsResult<()> {
        let target = self.player_point()?;
        self.target_map = generate_target_map(target, &self.walls);
        Ok(())
    }

    /// Applies one player command, then advances the world.
    ///
    /// Commands are rejected with `InvalidAction` once the game has ended.
    pub fn apply(&mut self, command: PlayerCommand) -> CavernsResult<TurnOutcome> {
        if self.is_over() {
            return Err(CavernsError::InvalidAction(format!(
                "cannot {} after the game has ended",
                command.name()
            )));
        }

        self.player_took_turn = false;
        let outcome = match command {
            PlayerCommand::Move(direction) => systems::move_player(self, direction)?,
            PlayerCommand::Rest => {
                systems::recover_player(self);
                TurnOutcome::TurnTaken
            }
            PlayerCommand::PickUp => systems::pick_up(self)?,
            PlayerCommand::Drop(index) => systems::drop_item(self, index)?,
            PlayerCommand::ToggleEquip(index) => systems::toggle_equip_at(self, index)?,
            PlayerCommand::Descend => self.descend()?,
        };

        if outcome.took_turn() {
            self.player_took_turn = true;
            self.statistics.turns_taken += 1;
        }
        log::trace!("{:?} -> {:?}", command, outcome);

        self.update()?;
        Ok(outcome)
    }

    /// Runs the turn systems in their fixed order.
    ///
    /// Monster movement, item lifetime, environment notes and corpse
    /// removal only run when the player used a turn. The FOV is recomputed
    /// only when flagged. Animations always advance.
    pub fn update(&mut self) -> CavernsResult<()> {
        if self.player_took_turn {
            self.refresh_target_map()?;
            systems::movement_update(self);
            systems::item_lifetime_update(self);
            systems::environment_update(self);
            systems::removal_update(self);
            self.player_took_turn = false;
        }

        if self.recalculate_fov {
            self.refresh_fov()?;
        }

        systems::animation_update(self);
        Ok(())
    }

    /// Takes the stairs on the player's cell.
    ///
    /// The player's base attack and defense grow with every descent.
    /// Descending from the last level wins the game instead of generating a
    /// new one.
    pub fn descend(&mut self) -> CavernsResult<TurnOutcome> {
        let here = self.player_point()?;
        if self.store.find_at::<Stairs>(here).is_none() {
            self.add_message("There are no stairs here, you silly person.", DIVIDER_COLOR);
            return Ok(TurnOutcome::Free);
        }

        self.depth += 1;
        if let Some(combat) = self.store.get_mut::<Combat>(self.player) {
            combat.attack += 2;
            combat.defense += 1;
        }

        if self.depth > MAX_DUNGEON_LEVEL {
            self.completion_state = GameCompletionState::Won;
            log::info!(
                "Player escaped the dungeon carrying {} gems",
                self.statistics.gems_collected
            );
            return Ok(TurnOutcome::Free);
        }

        self.generate_level()?;
        self.add_message("-".repeat(51), DIVIDER_COLOR);
        self.add_message(
            format!("You descend further, and are now on level {}.", self.depth),
            DESCEND_COLOR,
        );
        log::info!("Descended to level {}", self.depth);
        Ok(TurnOutcome::Free)
    }

    /// What to draw at a cell.
    ///
    /// Inside the FOV this is the visible entity on the highest layer.
    /// Outside it only remembered furniture (`visible_outside_fov` and
    /// already seen) is drawn, dimmed to [`REMEMBERED_ALPHA`].
    pub fn glyph_at(&self, point: Point) -> Option<Glyph> {
        let in_fov = self.in_fov(point);
        self.store
            .entities_at(point)
            .iter()
            .filter_map(|&id| Some((self.store.position(id)?, self.store.get::<Visibility>(id)?)))
            .filter(|(_, vis)| in_fov || (vis.has_been_seen && vis.visible_outside_fov))
            .max_by_key(|(pos, _)| pos.layer)
            .map(|(_, vis)| Glyph {
                glyph: vis.glyph,
                fg_color: if in_fov {
                    vis.fg_color
                } else {
                    vis.fg_color.with_alpha(REMEMBERED_ALPHA)
                },
                bg_color: vis.bg_color,
            })
    }

    /// The map as text, one line per row, blank where nothing is drawn.
    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity(((self.walls.width() + 1) * self.walls.height()) as usize);
        for y in 0..self.walls.height() {
            for x in 0..self.walls.width() {
                out.push(
                    self.glyph_at(Point::new(x, y))
                        .map(|g| g.glyph)
                        .unwrap_or(' '),
                );
            }
            out.push('\n');
        }
        out
    }

    pub fn summary(&self) -> GameSummary {
        let (player_hp, player_max_hp) = self
            .player_health()
            .map(|h| (h.current_hp, h.max_hp))
            .unwrap_or((0, 0));
        GameSummary {
            seed: self.config.seed,
            completion_state: self.completion_state,
            depth: self.depth,
            player_hp,
            player_max_hp,
            gems_found_this_level: self.gems_found_this_level,
            carried_items: self
                .carried
                .iter()
                .filter_map(|&id| self.store.get::<Visibility>(id))
                .map(|vis| vis.name.clone())
                .collect(),
            statistics: self.statistics.clone(),
            recent_messages: self.messages.iter().map(|m| m.text.clone()).collect(),
        }
    }
}
