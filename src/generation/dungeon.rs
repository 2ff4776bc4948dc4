//! # Dungeon Generation
//!
//! Room-and-corridor layout generation.
//!
//! Rooms are dropped at random until enough of the map is open. Consecutive
//! rooms are then joined by L-shaped walks that are split into segments each
//! time they enter another room. A segment is kept only when it joins two
//! rooms that are not already connected, so the corridor graph is a spanning
//! tree over the rooms.

use super::{utils, GenerationConfig, Generator, Room};
use crate::game::Point;
use crate::utils::Grid;
use crate::{CavernsError, CavernsResult};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One corridor piece between two rooms.
///
/// `mid` is the turn point when the piece bends outside any room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub mid: Option<Point>,
    pub end: Point,
    pub room_from: Option<usize>,
    pub room_to: Option<usize>,
}

impl Segment {
    /// Whether this segment joins the same unordered room pair as another.
    pub fn joins_same_rooms(&self, other: &Segment) -> bool {
        (self.room_from == other.room_from && self.room_to == other.room_to)
            || (self.room_from == other.room_to && self.room_to == other.room_from)
    }
}

/// A generated wall grid with the rooms and corridors carved into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    /// `true` marks a wall
    pub walls: Grid<bool>,
    pub rooms: Vec<Room>,
    pub corridors: Vec<Segment>,
}

impl DungeonLayout {
    /// Index of the room containing a point.
    pub fn room_at(&self, point: Point) -> Option<usize> {
        room_containing_point(&self.rooms, point)
    }
}

/// Primary dungeon generator using the room-and-corridor algorithm.
#[derive(Debug, Clone, Default)]
pub struct RoomCorridorGenerator;

impl RoomCorridorGenerator {
    /// Creates a new dungeon generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use caverns::{GenerationConfig, Generator, RoomCorridorGenerator};
    /// use caverns::generation::utils::create_rng;
    ///
    /// let config = GenerationConfig::for_testing(3);
    /// let mut rng = create_rng(&config);
    /// let layout = RoomCorridorGenerator::new().generate(&config, &mut rng).unwrap();
    /// assert_eq!(layout.corridors.len(), layout.rooms.len() - 1);
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Places rooms until the carved fraction exceeds the target fill.
    fn place_rooms(
        &self,
        walls: &mut Grid<bool>,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> CavernsResult<Vec<Room>> {
        let total = (config.width * config.height) as f64;
        let mut rooms: Vec<Room> = Vec::new();
        let mut cells_used = 0;
        let mut attempts = 0;

        while cells_used as f64 / total <= config.target_fill {
            attempts += 1;
            if attempts > config.max_placement_attempts {
                return Err(CavernsError::GenerationFailed(format!(
                    "placed {} rooms covering {} cells before hitting {} attempts",
                    rooms.len(),
                    cells_used,
                    config.max_placement_attempts
                )));
            }

            let width = rng.gen_range(config.min_room_size..=config.max_room_size);
            let height = rng.gen_range(config.min_room_size..=config.max_room_size);
            let x = rng.gen_range(0..config.width - width - 1).max(1);
            let y = rng.gen_range(0..config.height - height - 1).max(1);
            let room = Room::new(rooms.len(), x, y, width, height);

            if self.try_carve_room(walls, &room) {
                cells_used += room.area();
                rooms.push(room);
            }
        }

        log::debug!(
            "Placed {} rooms ({} cells) in {} attempts",
            rooms.len(),
            cells_used,
            attempts
        );
        Ok(rooms)
    }

    /// Carves a room if it and its one-cell border are still solid wall.
    fn try_carve_room(&self, walls: &mut Grid<bool>, room: &Room) -> bool {
        for x in room.x - 1..=room.x + room.width {
            for y in room.y - 1..=room.y + room.height {
                if !walls.get(Point::new(x, y)).copied().unwrap_or(false) {
                    return false;
                }
            }
        }

        for point in room.floor_positions() {
            walls.set(point, false);
        }
        true
    }

    /// Joins consecutive rooms, keeping only segments that link rooms not
    /// yet connected.
    fn connect_rooms(&self, rooms: &[Room], rng: &mut StdRng) -> Vec<Segment> {
        let mut components = RoomSets::new(rooms.len());
        let mut corridors: Vec<Segment> = Vec::new();

        for pair in rooms.windows(2) {
            let from = pair[0].random_point(rng);
            let to = pair[1].random_point(rng);
            let horizontal_first = rng.gen_bool(0.5);

            for segment in split_into_segments(from, to, horizontal_first, rooms) {
                if corridors.iter().any(|kept| kept.joins_same_rooms(&segment)) {
                    continue;
                }
                if components.union(segment.room_from, segment.room_to) {
                    corridors.push(segment);
                }
            }
        }

        corridors
    }

    /// Carves every corridor segment, including any turn.
    fn carve_segments(&self, walls: &mut Grid<bool>, corridors: &[Segment]) {
        for segment in corridors {
            match segment.mid {
                Some(mid) => {
                    carve_line(walls, segment.start, mid);
                    carve_line(walls, mid, segment.end);
                }
                None => carve_line(walls, segment.start, segment.end),
            }
        }
    }
}

impl Generator<DungeonLayout> for RoomCorridorGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> CavernsResult<DungeonLayout> {
        config.validate()?;

        let mut walls = Grid::new(config.width, config.height, true);
        let rooms = self.place_rooms(&mut walls, config, rng)?;
        let corridors = self.connect_rooms(&rooms, rng);
        self.carve_segments(&mut walls, &corridors);

        let layout = DungeonLayout {
            walls,
            rooms,
            corridors,
        };
        self.validate(&layout, config)?;
        Ok(layout)
    }

    fn validate(&self, layout: &DungeonLayout, config: &GenerationConfig) -> CavernsResult<()> {
        if layout.walls.width() != config.width || layout.walls.height() != config.height {
            return Err(CavernsError::GenerationFailed(format!(
                "layout is {}x{}, expected {}x{}",
                layout.walls.width(),
                layout.walls.height(),
                config.width,
                config.height
            )));
        }
        utils::validate_walls(&layout.walls)
    }

    fn generator_type(&self) -> &'static str {
        "RoomCorridorGenerator"
    }
}

/// Generates a `width` x `height` wall grid (`true` = wall). Room sizes
/// follow [`GenerationConfig::for_size`], so maps down to 4x4 work.
pub fn generate_map(width: i32, height: i32, rng: &mut StdRng) -> CavernsResult<Grid<bool>> {
    let config = GenerationConfig::for_size(0, width, height);
    RoomCorridorGenerator::new()
        .generate(&config, rng)
        .map(|layout| layout.walls)
}

/// Index of the room containing a point. Rooms never overlap, so there is at
/// most one.
pub fn room_containing_point(rooms: &[Room], point: Point) -> Option<usize> {
    rooms.iter().position(|room| room.contains(point))
}

/// Walks the L-shaped path from `from` to `to` and records a segment each
/// time the walk enters a different room.
///
/// A run that turns outside every room becomes one segment with the turn as
/// its `mid` point.
pub fn split_into_segments(
    from: Point,
    to: Point,
    horizontal_first: bool,
    rooms: &[Room],
) -> Vec<Segment> {
    let waypoint = if from.x != to.x && from.y != to.y {
        Some(if horizontal_first {
            Point::new(to.x, from.y)
        } else {
            Point::new(from.x, to.y)
        })
    } else {
        None
    };

    let mut segments = Vec::new();
    let mut current_room = room_containing_point(rooms, from);
    let mut last_point = from;
    let mut turn: Option<Point> = None;

    let path = walk_path(from, waypoint, to);
    for &cell in path.iter().skip(1) {
        let room = room_containing_point(rooms, cell);

        if Some(cell) == waypoint {
            match room {
                Some(_) if room != current_room => {
                    segments.push(Segment {
                        start: last_point,
                        mid: None,
                        end: cell,
                        room_from: current_room,
                        room_to: room,
                    });
                    current_room = room;
                    last_point = cell;
                }
                Some(_) => last_point = cell,
                None => turn = Some(cell),
            }
        } else if cell == to {
            if room != current_room {
                segments.push(Segment {
                    start: last_point,
                    mid: turn.take(),
                    end: cell,
                    room_from: current_room,
                    room_to: room,
                });
            }
        } else if room.is_some() && room != current_room {
            segments.push(Segment {
                start: last_point,
                mid: turn.take(),
                end: cell,
                room_from: current_room,
                room_to: room,
            });
            current_room = room;
            last_point = cell;
        }
    }

    segments
}

/// Cells from `from` to `to`, through `waypoint` when given, both ends included.
fn walk_path(from: Point, waypoint: Option<Point>, to: Point) -> Vec<Point> {
    let mut path = vec![from];
    let mut current = from;
    for target in waypoint.into_iter().chain(std::iter::once(to)) {
        while current != target {
            current = Point::new(
                current.x + (target.x - current.x).signum(),
                current.y + (target.y - current.y).signum(),
            );
            path.push(current);
        }
    }
    path
}

/// Opens every cell on the axis-aligned line between two points.
fn carve_line(walls: &mut Grid<bool>, a: Point, b: Point) {
    for x in a.x.min(b.x)..=a.x.max(b.x) {
        for y in a.y.min(b.y)..=a.y.max(b.y) {
            walls.set(Point::new(x, y), false);
        }
    }
}

/// Disjoint sets over room indices, with one extra node for "no room".
struct RoomSets {
    parent: Vec<usize>,
}

impl RoomSets {
    fn new(room_count: usize) -> Self {
        Self {
            parent: (0..=room_count).collect(),
        }
    }

    fn node(&self, room: Option<usize>) -> usize {
        room.unwrap_or(self.parent.len() - 1)
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    /// Joins two rooms. Returns false if they were already connected.
    fn union(&mut self, a: Option<usize>, b: Option<usize>) -> bool {
        let (a, b) = (self.node(a), self.node(b));
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return false;
        }
        self.parent[root_a] = root_b;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn layout_for(seed: u64) -> DungeonLayout {
        let config = GenerationConfig::for_testing(seed);
        let mut rng = utils::create_rng(&config);
        RoomCorridorGenerator::new()
            .generate(&config, &mut rng)
            .expect("test layout should generate")
    }

    fn rooms_connected_without(layout: &DungeonLayout, skip: Option<usize>) -> bool {
        let mut sets = RoomSets::new(layout.rooms.len());
        for (i, segment) in layout.corridors.iter().enumerate() {
            if Some(i) != skip {
                sets.union(segment.room_from, segment.room_to);
            }
        }
        let root = sets.find(0);
        (0..layout.rooms.len()).all(|room| sets.find(room) == root)
    }

    #[test]
    fn test_generation_is_connected() {
        for seed in 0..10 {
            let layout = layout_for(seed);
            assert!(layout.rooms.len() >= 2, "seed {} placed too few rooms", seed);
            assert!(utils::validate_walls(&layout.walls).is_ok());
            assert!(rooms_connected_without(&layout, None));
        }
    }

    #[test]
    fn test_full_size_generation() {
        let mut rng = StdRng::seed_from_u64(2024);
        let walls = generate_map(80, 40, &mut rng).unwrap();
        assert_eq!(walls.width(), 80);
        assert_eq!(walls.height(), 40);

        let open = walls.iter().filter(|(_, &wall)| !wall).count();
        assert!(open as f64 / (80.0 * 40.0) > 0.45);
        assert!(utils::validate_walls(&walls).is_ok());
    }

    #[test]
    fn test_small_maps_generate() {
        let mut rng = StdRng::seed_from_u64(5);
        for side in 4..=22 {
            for (width, height) in [(side, side), (side * 2, side), (side, side + 3)] {
                let walls = generate_map(width, height, &mut rng)
                    .unwrap_or_else(|e| panic!("{}x{} failed: {}", width, height, e));
                assert_eq!((walls.width(), walls.height()), (width, height));
                assert!(utils::validate_walls(&walls).is_ok());
            }
        }
    }

    #[test]
    fn test_room_sizes_scale_below_default_size() {
        let config = GenerationConfig::for_size(3, 22, 22);
        assert_eq!((config.min_room_size, config.max_room_size), (5, 10));
        assert!(config.validate().is_ok());

        let tiny = GenerationConfig::for_size(3, 4, 4);
        assert_eq!((tiny.min_room_size, tiny.max_room_size), (2, 2));
        assert!(tiny.validate().is_ok());

        assert_eq!(
            GenerationConfig::for_size(3, 80, 40),
            GenerationConfig::new(3)
        );
    }

    #[test]
    fn test_map_border_stays_wall() {
        for seed in 0..5 {
            let layout = layout_for(seed);
            let walls = &layout.walls;
            for x in 0..walls.width() {
                assert!(walls[Point::new(x, 0)]);
                assert!(walls[Point::new(x, walls.height() - 1)]);
            }
            for y in 0..walls.height() {
                assert!(walls[Point::new(0, y)]);
                assert!(walls[Point::new(walls.width() - 1, y)]);
            }
        }
    }

    #[test]
    fn test_rooms_never_touch() {
        for seed in 0..10 {
            let layout = layout_for(seed);
            for (i, a) in layout.rooms.iter().enumerate() {
                for b in layout.rooms.iter().skip(i + 1) {
                    assert!(!a.touches(b), "seed {}: rooms {:?} and {:?} touch", seed, a, b);
                }
            }
        }
    }

    #[test]
    fn test_corridors_never_repeat_a_room_pair() {
        for seed in 0..10 {
            let layout = layout_for(seed);
            let mut pairs = HashSet::new();
            for segment in &layout.corridors {
                let a = segment.room_from;
                let b = segment.room_to;
                assert_ne!(a, b);
                assert!(pairs.insert((a.min(b), a.max(b))), "seed {}: duplicate pair", seed);
            }
        }
    }

    #[test]
    fn test_every_corridor_is_a_bridge() {
        for seed in 0..10 {
            let layout = layout_for(seed);
            assert_eq!(layout.corridors.len(), layout.rooms.len() - 1);
            for skip in 0..layout.corridors.len() {
                assert!(
                    !rooms_connected_without(&layout, Some(skip)),
                    "seed {}: corridor {} is redundant",
                    seed,
                    skip
                );
            }
        }
    }

    #[test]
    fn test_segments_end_in_their_rooms() {
        for seed in 0..10 {
            let layout = layout_for(seed);
            for segment in &layout.corridors {
                assert_eq!(layout.room_at(segment.start), segment.room_from);
                assert_eq!(layout.room_at(segment.end), segment.room_to);
                assert!(!layout.walls[segment.start]);
                assert!(!layout.walls[segment.end]);
                if let Some(mid) = segment.mid {
                    assert!(layout.room_at(mid).is_none());
                    assert!(!layout.walls[mid]);
                }
            }
        }
    }

    #[test]
    fn test_split_straight_walk_through_middle_room() {
        let rooms = vec![
            Room::new(0, 1, 1, 3, 3),
            Room::new(1, 6, 1, 3, 3),
            Room::new(2, 11, 1, 3, 3),
        ];
        let segments = split_into_segments(Point::new(2, 2), Point::new(12, 2), true, &rooms);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].room_from, Some(0));
        assert_eq!(segments[0].room_to, Some(1));
        assert_eq!(segments[0].end, Point::new(6, 2));
        assert_eq!(segments[1].room_from, Some(1));
        assert_eq!(segments[1].room_to, Some(2));
        assert_eq!(segments[1].start, Point::new(6, 2));
        assert_eq!(segments[1].end, Point::new(11, 2));
    }

    #[test]
    fn test_split_turn_outside_rooms() {
        let rooms = vec![Room::new(0, 1, 1, 3, 3), Room::new(1, 8, 8, 3, 3)];
        let segments = split_into_segments(Point::new(2, 2), Point::new(9, 9), true, &rooms);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, Point::new(2, 2));
        assert_eq!(segments[0].mid, Some(Point::new(9, 2)));
        assert_eq!(segments[0].end, Point::new(9, 8));
        assert_eq!(segments[0].room_to, Some(1));
    }

    #[test]
    fn test_split_turn_inside_start_room() {
        let rooms = vec![Room::new(0, 1, 1, 6, 3), Room::new(1, 4, 8, 3, 3)];
        let segments = split_into_segments(Point::new(2, 2), Point::new(5, 9), true, &rooms);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, Point::new(5, 2));
        assert_eq!(segments[0].mid, None);
        assert_eq!(segments[0].end, Point::new(5, 8));
    }

    #[test]
    fn test_split_turn_inside_other_room() {
        let rooms = vec![
            Room::new(0, 1, 1, 3, 3),
            Room::new(1, 9, 1, 3, 3),
            Room::new(2, 8, 8, 3, 3),
        ];
        let segments = split_into_segments(Point::new(2, 2), Point::new(9, 9), true, &rooms);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].room_to, Some(1));
        assert_eq!(segments[0].end, Point::new(9, 2));
        assert_eq!(segments[1].room_from, Some(1));
        assert_eq!(segments[1].start, Point::new(9, 2));
        assert_eq!(segments[1].end, Point::new(9, 8));
        assert_eq!(segments[1].mid, None);
    }

    #[test]
    fn test_placement_cap() {
        let mut config = GenerationConfig::for_testing(1);
        config.target_fill = 0.95;
        config.max_placement_attempts = 50;
        let mut rng = utils::create_rng(&config);
        assert!(matches!(
            RoomCorridorGenerator::new().generate(&config, &mut rng),
            Err(CavernsError::GenerationFailed(_))
        ));
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert_eq!(layout_for(77), layout_for(77));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_layouts_form_a_tree_of_separate_rooms(
            seed in any::<u64>(),
            width in 48..64i32,
            height in 24..32i32,
        ) {
            let config = GenerationConfig::for_testing(seed).with_size(width, height);
            let mut rng = utils::create_rng(&config);
            let layout = RoomCorridorGenerator::new().generate(&config, &mut rng).unwrap();

            prop_assert!(utils::validate_walls(&layout.walls).is_ok());
            prop_assert!(rooms_connected_without(&layout, None));
            prop_assert_eq!(layout.corridors.len(), layout.rooms.len() - 1);
            for (i, a) in layout.rooms.iter().enumerate() {
                for b in layout.rooms.iter().skip(i + 1) {
                    prop_assert!(!a.touches(b));
                }
            }
        }
    }
}
