//! # Level Furniture
//!
//! Terrain, loot, gems and stairs, plus the open-cell search every spawn
//! goes through.

use crate::config::{GameData, ItemTemplate, EQUIPMENT_LIFETIME, GEMS_PER_LEVEL};
use crate::ecs::{
    Animation, AnimationKind, Color, Combat, ComponentKind, EntityId, EntityStore, Equipment,
    Layer, Physical, Position, Stairs, Treasure, Visibility,
};
use crate::game::Point;
use crate::utils::Grid;
use crate::{CavernsError, CavernsResult};
use rand::Rng;

pub const FLOOR_COLOR: Color = Color(0x3e3c_3cff);
pub const WALL_COLOR: Color = Color(0x6756_44ff);
pub const GEM_COLOR: Color = Color(0x753a_abff);
pub const STAIRS_COLOR: Color = Color(0xffd7_00ff);
pub const PORTAL_COLOR: Color = Color(0x80ff_80ff);

pub const GEM_GLYPH: char = '♦';
pub const STAIRS_GLYPH: char = '>';
pub const PORTAL_GLYPH: char = '☼';

/// Turns between gem shimmer keyframes.
pub const GEM_SHIMMER_INTERVAL: i32 = 3;

/// Random cells tried by [`open_point`] before it gives up.
pub const OPEN_POINT_ATTEMPTS: u32 = 10_000;

/// Picks a random non-wall cell that holds no equipment, treasure or
/// creature.
pub fn open_point<R: Rng>(
    store: &EntityStore,
    walls: &Grid<bool>,
    rng: &mut R,
) -> CavernsResult<Point> {
    for _ in 0..OPEN_POINT_ATTEMPTS {
        let point = Point::new(
            rng.gen_range(0..walls.width()),
            rng.gen_range(0..walls.height()),
        );
        if walls[point] {
            continue;
        }
        let occupied = store.entities_at(point).iter().any(|&id| {
            store.has(id, ComponentKind::Equipment)
                || store.has(id, ComponentKind::Treasure)
                || store.has(id, ComponentKind::Health)
        });
        if !occupied {
            return Ok(point);
        }
    }

    Err(CavernsError::GenerationFailed(format!(
        "no open cell found in {} attempts",
        OPEN_POINT_ATTEMPTS
    )))
}

/// Creates a wall or floor entity for every cell of the grid.
pub fn spawn_terrain(store: &mut EntityStore, walls: &Grid<bool>) -> CavernsResult<()> {
    for (point, &wall) in walls.iter() {
        if wall {
            spawn_wall(store, point)?;
        } else {
            spawn_floor(store, point)?;
        }
    }
    Ok(())
}

pub fn spawn_wall(store: &mut EntityStore, point: Point) -> CavernsResult<EntityId> {
    let wall = store.create()?;
    store.set_position(wall, Some(Position::at(point, Layer::Ground)));
    store.insert(wall, Visibility::new('#', WALL_COLOR, "Wall").remembered());
    store.insert(wall, Physical::SOLID);
    Ok(wall)
}

pub fn spawn_floor(store: &mut EntityStore, point: Point) -> CavernsResult<EntityId> {
    let floor = store.create()?;
    store.set_position(floor, Some(Position::at(point, Layer::Ground)));
    store.insert(floor, Visibility::new('.', FLOOR_COLOR, "Floor").remembered());
    store.insert(floor, Physical::OPEN);
    Ok(floor)
}

/// Places one carryable item built from a template.
pub fn spawn_item(
    store: &mut EntityStore,
    template: &ItemTemplate,
    point: Point,
) -> CavernsResult<EntityId> {
    let item = store.create()?;
    store.set_position(item, Some(Position::at(point, Layer::Mid)));
    store.insert(
        item,
        Visibility::new(template.glyph, template.color, template.name.clone()),
    );
    store.insert(item, Physical::OPEN);
    store.insert(
        item,
        Combat::modifiers(
            template.to_hit_modifier,
            template.attack_modifier,
            template.defense_modifier,
        ),
    );
    store.insert(
        item,
        Equipment::new(
            template.quantity,
            template.weight,
            EQUIPMENT_LIFETIME,
            template.slot.clone(),
        ),
    );
    Ok(item)
}

/// Places a shimmering gem.
pub fn spawn_gem(store: &mut EntityStore, point: Point) -> CavernsResult<EntityId> {
    let gem = store.create()?;
    store.set_position(gem, Some(Position::at(point, Layer::Mid)));
    store.insert(gem, Visibility::new(GEM_GLYPH, GEM_COLOR, "Gem"));
    store.insert(gem, Physical::OPEN);
    store.insert(gem, Treasure { value: 1 });
    store.insert(
        gem,
        Animation::new(
            AnimationKind::GemShimmer { base: GEM_COLOR },
            GEM_SHIMMER_INTERVAL,
        ),
    );
    Ok(gem)
}

/// Places the way down. On the last level it is drawn as the exit portal.
pub fn spawn_stairs(store: &mut EntityStore, point: Point, portal: bool) -> CavernsResult<EntityId> {
    let stairs = store.create()?;
    store.set_position(stairs, Some(Position::at(point, Layer::Mid)));
    let vis = if portal {
        Visibility::new(PORTAL_GLYPH, PORTAL_COLOR, "Stairs")
    } else {
        Visibility::new(STAIRS_GLYPH, STAIRS_COLOR, "Stairs")
    };
    store.insert(stairs, vis.remembered());
    store.insert(stairs, Physical::OPEN);
    store.insert(stairs, Stairs);
    Ok(stairs)
}

/// Scatters the level's item allotment.
pub fn populate_items<R: Rng>(
    store: &mut EntityStore,
    data: &GameData,
    depth: u32,
    walls: &Grid<bool>,
    rng: &mut R,
) -> CavernsResult<Vec<EntityId>> {
    let count = data.max_items.at(depth).max(0);
    let mut spawned = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let template = data.item_for_level(depth, rng);
        let point = open_point(store, walls, rng)?;
        spawned.push(spawn_item(store, template, point)?);
    }
    log::debug!("Spawned {} items on level {}", spawned.len(), depth);
    Ok(spawned)
}

/// Scatters [`GEMS_PER_LEVEL`] gems.
pub fn populate_gems<R: Rng>(
    store: &mut EntityStore,
    walls: &Grid<bool>,
    rng: &mut R,
) -> CavernsResult<Vec<EntityId>> {
    (0..GEMS_PER_LEVEL)
        .map(|_| {
            let point = open_point(store, walls, rng)?;
            spawn_gem(store, point)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Health;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_terrain_covers_grid() {
        let mut walls = Grid::new(4, 3, true);
        walls[Point::new(1, 1)] = false;
        let mut store = EntityStore::new();
        spawn_terrain(&mut store, &walls).unwrap();

        assert_eq!(store.len(), 12);
        let floor = store.entities_at(Point::new(1, 1))[0];
        let vis = store.get::<Visibility>(floor).unwrap();
        assert_eq!(vis.name, "Floor");
        assert!(vis.visible_outside_fov);
        assert!(!store.get::<Physical>(floor).unwrap().blocks_movement);

        let wall = store.entities_at(Point::new(0, 0))[0];
        assert_eq!(*store.get::<Physical>(wall).unwrap(), Physical::SOLID);
        assert!(store.index_is_consistent());
    }

    #[test]
    fn test_open_point_avoids_walls_and_occupants() {
        let mut walls = Grid::new(3, 1, true);
        walls[Point::new(1, 0)] = false;
        walls[Point::new(2, 0)] = false;
        let mut store = EntityStore::new();
        let gem = spawn_gem(&mut store, Point::new(1, 0)).unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..20 {
            assert_eq!(open_point(&store, &walls, &mut rng).unwrap(), Point::new(2, 0));
        }

        store.destroy(gem);
        let creature = store.create().unwrap();
        store.set_position(creature, Some(Position::new(2, 0, Layer::Top)));
        store.insert(creature, Health::new(5, 0));
        assert_eq!(open_point(&store, &walls, &mut rng).unwrap(), Point::new(1, 0));
    }

    #[test]
    fn test_open_point_gives_up() {
        let walls = Grid::new(5, 5, true);
        let store = EntityStore::new();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            open_point(&store, &walls, &mut rng),
            Err(CavernsError::GenerationFailed(_))
        ));
    }

    #[test]
    fn test_item_from_template() {
        let data = GameData::builtin().unwrap();
        let template = &data.items[0];
        let mut store = EntityStore::new();
        let item = spawn_item(&mut store, template, Point::new(2, 2)).unwrap();

        assert_eq!(store.position(item).unwrap().layer, Layer::Mid);
        let eq = store.get::<Equipment>(item).unwrap();
        assert_eq!(eq.lifetime, EQUIPMENT_LIFETIME);
        assert_eq!(eq.weight, template.weight);
        assert!(!eq.is_equipped);
        assert_eq!(
            store.get::<Combat>(item).unwrap().attack_modifier,
            template.attack_modifier
        );
    }

    #[test]
    fn test_gems_and_stairs() {
        let mut walls = Grid::new(10, 10, true);
        for point in walls.points().collect::<Vec<_>>() {
            if point.x > 0 && point.y > 0 && point.x < 9 && point.y < 9 {
                walls[point] = false;
            }
        }
        let mut store = EntityStore::new();
        let mut rng = StdRng::seed_from_u64(2);
        let gems = populate_gems(&mut store, &walls, &mut rng).unwrap();
        assert_eq!(gems.len() as u32, GEMS_PER_LEVEL);
        for gem in &gems {
            assert_eq!(store.get::<Treasure>(*gem).unwrap().value, 1);
            assert!(store.get::<Animation>(*gem).is_some());
        }
        let mut cells: Vec<_> = gems
            .iter()
            .map(|g| store.position(*g).unwrap().point())
            .collect();
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), gems.len());

        let stairs = spawn_stairs(&mut store, Point::new(4, 4), false).unwrap();
        assert_eq!(store.get::<Visibility>(stairs).unwrap().glyph, STAIRS_GLYPH);
        assert_eq!(store.find_at::<Stairs>(Point::new(4, 4)), Some(stairs));

        let portal = spawn_stairs(&mut store, Point::new(5, 5), true).unwrap();
        assert_eq!(store.get::<Visibility>(portal).unwrap().fg_color, PORTAL_COLOR);
    }
}
