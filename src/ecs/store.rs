//! # Entity Store
//!
//! Owns every entity, its component tables and the position index.

use super::components::*;
use super::entity::{EntityAllocator, EntityId};
use crate::config::MAX_ENTITIES;
use crate::game::Point;
use crate::CavernsResult;
use std::collections::HashMap;

/// Sparse-set table for one component type.
///
/// Values live densely next to their owner's handle; `sparse` maps a slot
/// index to the dense position. Removal swaps the last value into the hole,
/// so iteration order changes as entries come and go.
#[derive(Debug, Clone)]
pub struct SparseSet<C> {
    dense: Vec<(EntityId, C)>,
    sparse: Vec<Option<usize>>,
}

impl<C> Default for SparseSet<C> {
    fn default() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
        }
    }
}

impl<C> SparseSet<C> {
    fn dense_index(&self, id: EntityId) -> Option<usize> {
        let index = (*self.sparse.get(id.index as usize)?)?;
        (self.dense[index].0 == id).then_some(index)
    }

    fn insert(&mut self, id: EntityId, value: C) -> Option<C> {
        if let Some(index) = self.dense_index(id) {
            return Some(std::mem::replace(&mut self.dense[index].1, value));
        }

        let slot = id.index as usize;
        if slot >= self.sparse.len() {
            self.sparse.resize(slot + 1, None);
        }
        self.sparse[slot] = Some(self.dense.len());
        self.dense.push((id, value));
        None
    }

    fn remove(&mut self, id: EntityId) -> Option<C> {
        let index = self.dense_index(id)?;
        self.sparse[id.index as usize] = None;
        let (_, value) = self.dense.swap_remove(index);
        if let Some((moved, _)) = self.dense.get(index) {
            self.sparse[moved.index as usize] = Some(index);
        }
        Some(value)
    }

    fn get(&self, id: EntityId) -> Option<&C> {
        self.dense_index(id).map(|index| &self.dense[index].1)
    }

    fn get_mut(&mut self, id: EntityId) -> Option<&mut C> {
        let index = self.dense_index(id)?;
        Some(&mut self.dense[index].1)
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &C)> {
        self.dense.iter().map(|(id, value)| (*id, value))
    }
}

/// A type stored in one of the store's tables.
pub trait Component: Sized + 'static {
    const KIND: ComponentKind;

    #[doc(hidden)]
    fn table(store: &EntityStore) -> &SparseSet<Self>;
}

/// A component that may be inserted, removed and edited in place.
///
/// `Position` is deliberately excluded: it only changes through
/// [`EntityStore::set_position`], which keeps the position index in step.
pub trait MutableComponent: Component {
    #[doc(hidden)]
    fn table_mut(store: &mut EntityStore) -> &mut SparseSet<Self>;
}

macro_rules! component_tables {
    ($($ty:ident => $field:ident),* $(,)?) => {
        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$ty;

                fn table(store: &EntityStore) -> &SparseSet<Self> {
                    &store.$field
                }
            }

            impl MutableComponent for $ty {
                fn table_mut(store: &mut EntityStore) -> &mut SparseSet<Self> {
                    &mut store.$field
                }
            }
        )*

        impl EntityStore {
            fn remove_all_components(&mut self, id: EntityId) {
                $( self.$field.remove(id); )*
            }

            /// Whether the entity has a component of the given kind.
            pub fn has(&self, id: EntityId, kind: ComponentKind) -> bool {
                match kind {
                    ComponentKind::Position => self.positions.get(id).is_some(),
                    $( ComponentKind::$ty => self.$field.get(id).is_some(), )*
                }
            }
        }
    };
}

impl Component for Position {
    const KIND: ComponentKind = ComponentKind::Position;

    fn table(store: &EntityStore) -> &SparseSet<Self> {
        &store.positions
    }
}

component_tables! {
    Visibility => visibility,
    Physical => physical,
    Movement => movement,
    Health => health,
    Combat => combat,
    Equipment => equipment,
    Treasure => treasure,
    Animation => animation,
    Stairs => stairs,
}

/// Entity pool, component tables and the cell-to-entities index.
#[derive(Debug, Clone)]
pub struct EntityStore {
    allocator: EntityAllocator,
    positions: SparseSet<Position>,
    visibility: SparseSet<Visibility>,
    physical: SparseSet<Physical>,
    movement: SparseSet<Movement>,
    health: SparseSet<Health>,
    combat: SparseSet<Combat>,
    equipment: SparseSet<Equipment>,
    treasure: SparseSet<Treasure>,
    animation: SparseSet<Animation>,
    stairs: SparseSet<Stairs>,
    position_index: HashMap<Point, Vec<EntityId>>,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Creates a store holding up to [`MAX_ENTITIES`] live entities.
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTITIES)
    }

    /// Creates a store holding up to `capacity` live entities.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            allocator: EntityAllocator::new(capacity),
            positions: SparseSet::default(),
            visibility: SparseSet::default(),
            physical: SparseSet::default(),
            movement: SparseSet::default(),
            health: SparseSet::default(),
            combat: SparseSet::default(),
            equipment: SparseSet::default(),
            treasure: SparseSet::default(),
            animation: SparseSet::default(),
            stairs: SparseSet::default(),
            position_index: HashMap::new(),
        }
    }

    /// Allocates a new entity with no components.
    ///
    /// Fails with [`CavernsError::EntityPoolExhausted`](crate::CavernsError::EntityPoolExhausted)
    /// when the store is full.
    pub fn create(&mut self) -> CavernsResult<EntityId> {
        self.allocator.allocate()
    }

    /// Removes every component and index entry, then frees the handle.
    /// Returns false for stale handles.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if !self.allocator.is_alive(id) {
            return false;
        }
        self.set_position(id, None);
        self.remove_all_components(id);
        self.allocator.deallocate(id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.allocator.is_alive(id)
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.allocator.alive_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.allocator.capacity()
    }

    /// Handles of all live entities, in slot order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.allocator.alive_ids()
    }

    /// Inserts or replaces a component. Ignored for stale handles.
    pub fn insert<C: MutableComponent>(&mut self, id: EntityId, component: C) -> Option<C> {
        if !self.is_alive(id) {
            log::warn!("Ignoring {:?} insert for dead entity {}", C::KIND, id);
            return None;
        }
        C::table_mut(self).insert(id, component)
    }

    pub fn remove<C: MutableComponent>(&mut self, id: EntityId) -> Option<C> {
        C::table_mut(self).remove(id)
    }

    pub fn get<C: Component>(&self, id: EntityId) -> Option<&C> {
        C::table(self).get(id)
    }

    pub fn get_mut<C: MutableComponent>(&mut self, id: EntityId) -> Option<&mut C> {
        C::table_mut(self).get_mut(id)
    }

    /// Read-only iteration over one component table.
    pub fn iter<C: Component>(&self) -> impl Iterator<Item = (EntityId, &C)> {
        C::table(self).iter()
    }

    /// Snapshot of the handles owning a component, for systems that mutate
    /// while walking a table.
    pub fn ids_with<C: Component>(&self) -> Vec<EntityId> {
        C::table(self).iter().map(|(id, _)| id).collect()
    }

    /// Inserts, moves or removes an entity's position and updates the index
    /// in the same call. Returns the previous position.
    pub fn set_position(&mut self, id: EntityId, position: Option<Position>) -> Option<Position> {
        if !self.is_alive(id) {
            return None;
        }

        let old = match position {
            Some(new) => self.positions.insert(id, new),
            None => self.positions.remove(id),
        };
        if let Some(old) = old {
            self.remove_entity_from_position_index(id, old.point());
        }
        if let Some(new) = position {
            self.add_entity_to_position_index(id, new.point());
        }
        old
    }

    /// Moves an entity to a new cell, keeping its layer.
    pub fn move_to(&mut self, id: EntityId, point: Point) -> bool {
        let Some(current) = self.positions.get(id).copied() else {
            return false;
        };
        self.set_position(id, Some(Position::at(point, current.layer)));
        true
    }

    /// Changes the draw layer of a placed entity.
    pub fn set_layer(&mut self, id: EntityId, layer: Layer) -> bool {
        let Some(mut position) = self.positions.get(id).copied() else {
            return false;
        };
        position.layer = layer;
        self.set_position(id, Some(position));
        true
    }

    pub fn position(&self, id: EntityId) -> Option<Position> {
        self.positions.get(id).copied()
    }

    /// Every entity in a cell.
    pub fn entities_at(&self, point: Point) -> &[EntityId] {
        self.position_index
            .get(&point)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First entity in a cell that has component `C`.
    pub fn find_at<C: Component>(&self, point: Point) -> Option<EntityId> {
        self.entities_at(point)
            .iter()
            .copied()
            .find(|&id| self.get::<C>(id).is_some())
    }

    fn add_entity_to_position_index(&mut self, id: EntityId, point: Point) {
        self.position_index.entry(point).or_default().push(id);
    }

    fn remove_entity_from_position_index(&mut self, id: EntityId, point: Point) {
        if let Some(entities) = self.position_index.get_mut(&point) {
            entities.retain(|&other| other != id);
            if entities.is_empty() {
                self.position_index.remove(&point);
            }
        }
    }

    /// Whether the position index exactly mirrors the position table.
    pub fn index_is_consistent(&self) -> bool {
        let indexed: usize = self.position_index.values().map(Vec::len).sum();
        indexed == self.positions.len()
            && self
                .positions
                .iter()
                .all(|(id, pos)| self.entities_at(pos.point()).contains(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CavernsError;

    fn wall(store: &mut EntityStore, x: i32, y: i32) -> EntityId {
        let id = store.create().unwrap();
        store.set_position(id, Some(Position::new(x, y, Layer::Ground)));
        store.insert(id, Physical::SOLID);
        id
    }

    #[test]
    fn test_insert_get_remove() {
        let mut store = EntityStore::new();
        let id = store.create().unwrap();

        assert!(store.get::<Health>(id).is_none());
        store.insert(id, Health::new(10, 1));
        assert_eq!(store.get::<Health>(id).unwrap().current_hp, 10);
        assert!(store.has(id, ComponentKind::Health));

        store.get_mut::<Health>(id).unwrap().current_hp = 4;
        assert_eq!(store.get::<Health>(id).unwrap().current_hp, 4);

        let old = store.insert(id, Health::new(20, 0));
        assert_eq!(old.map(|h| h.current_hp), Some(4));

        assert!(store.remove::<Health>(id).is_some());
        assert!(!store.has(id, ComponentKind::Health));
    }

    #[test]
    fn test_sparse_set_swap_remove_keeps_lookups() {
        let mut store = EntityStore::new();
        let ids: Vec<_> = (0..5).map(|_| store.create().unwrap()).collect();
        for (n, &id) in ids.iter().enumerate() {
            store.insert(id, Treasure { value: n as i32 });
        }

        store.remove::<Treasure>(ids[1]);
        for (n, &id) in ids.iter().enumerate() {
            if n == 1 {
                assert!(store.get::<Treasure>(id).is_none());
            } else {
                assert_eq!(store.get::<Treasure>(id).unwrap().value, n as i32);
            }
        }
        assert_eq!(store.iter::<Treasure>().count(), 4);
    }

    #[test]
    fn test_position_index_follows_moves() {
        let mut store = EntityStore::new();
        let player = store.create().unwrap();
        store.set_position(player, Some(Position::new(5, 5, Layer::Top)));
        assert_eq!(store.entities_at(Point::new(5, 5)), &[player]);

        assert!(store.move_to(player, Point::new(5, 6)));
        assert!(store.entities_at(Point::new(5, 5)).is_empty());
        assert_eq!(store.entities_at(Point::new(5, 6)), &[player]);
        assert_eq!(store.position(player).unwrap().layer, Layer::Top);

        store.set_position(player, None);
        assert!(store.entities_at(Point::new(5, 6)).is_empty());
        assert!(store.index_is_consistent());
    }

    #[test]
    fn test_destroy_clears_everything() {
        let mut store = EntityStore::new();
        let id = wall(&mut store, 2, 3);
        store.insert(id, Visibility::new('#', Color(0x675644ff), "Wall"));

        assert!(store.destroy(id));
        assert!(!store.is_alive(id));
        assert!(store.entities_at(Point::new(2, 3)).is_empty());
        assert!(store.get::<Physical>(id).is_none());
        assert!(store.get::<Visibility>(id).is_none());
        assert!(store.position(id).is_none());
        assert!(!store.destroy(id));
    }

    #[test]
    fn test_stale_handle_does_not_alias_reused_slot() {
        let mut store = EntityStore::with_capacity(1);
        let old = store.create().unwrap();
        store.insert(old, Treasure { value: 1 });
        store.destroy(old);

        let new = store.create().unwrap();
        store.insert(new, Treasure { value: 2 });
        assert_eq!(old.index(), new.index());
        assert!(store.get::<Treasure>(old).is_none());
        assert!(store.insert(old, Treasure { value: 9 }).is_none());
        assert_eq!(store.get::<Treasure>(new).unwrap().value, 2);
    }

    #[test]
    fn test_pool_exhaustion() {
        let capacity = 16;
        let mut store = EntityStore::with_capacity(capacity);
        for _ in 0..capacity - 1 {
            store.create().unwrap();
        }
        assert!(store.create().is_ok());
        assert!(matches!(
            store.create(),
            Err(CavernsError::EntityPoolExhausted { capacity: 16 })
        ));
        assert_eq!(store.len(), capacity);
    }

    #[test]
    fn test_find_at() {
        let mut store = EntityStore::new();
        let floor = store.create().unwrap();
        store.set_position(floor, Some(Position::new(1, 1, Layer::Ground)));
        let gem = store.create().unwrap();
        store.set_position(gem, Some(Position::new(1, 1, Layer::Mid)));
        store.insert(gem, Treasure { value: 1 });

        assert_eq!(store.find_at::<Treasure>(Point::new(1, 1)), Some(gem));
        assert_eq!(store.find_at::<Stairs>(Point::new(1, 1)), None);
        assert_eq!(store.entities_at(Point::new(1, 1)).len(), 2);
    }

    #[test]
    fn test_set_layer_keeps_cell() {
        let mut store = EntityStore::new();
        let id = store.create().unwrap();
        store.set_position(id, Some(Position::new(4, 4, Layer::Top)));
        assert!(store.set_layer(id, Layer::Ground));
        assert_eq!(store.position(id), Some(Position::new(4, 4, Layer::Ground)));
        assert_eq!(store.entities_at(Point::new(4, 4)), &[id]);
    }
}
