//! Generational entity handles and the bounded slot allocator behind them.

use crate::{CavernsError, CavernsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to an entity in an [`EntityStore`](super::EntityStore).
///
/// A handle stays valid until its entity is destroyed. The slot may then be
/// reused under a new generation, so stale handles never alias new entities.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl EntityId {
    /// Slot index. Only meaningful for diagnostics.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out entity handles from a pool of at most `capacity` live slots.
#[derive(Debug, Clone)]
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_list: Vec<u32>,
    capacity: usize,
}

impl EntityAllocator {
    pub fn new(capacity: usize) -> Self {
        Self {
            generations: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            capacity,
        }
    }

    pub fn allocate(&mut self) -> CavernsResult<EntityId> {
        if self.alive_count() >= self.capacity {
            return Err(CavernsError::EntityPoolExhausted {
                capacity: self.capacity,
            });
        }

        if let Some(index) = self.free_list.pop() {
            self.alive[index as usize] = true;
            return Ok(EntityId {
                index,
                generation: self.generations[index as usize],
            });
        }

        let index = self.generations.len() as u32;
        self.generations.push(0);
        self.alive.push(true);
        Ok(EntityId {
            index,
            generation: 0,
        })
    }

    /// Frees a live handle. Returns false for stale handles.
    pub fn deallocate(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        let slot = id.index as usize;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.alive[slot] = false;
        self.free_list.push(id.index);
        true
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        let slot = id.index as usize;
        slot < self.generations.len() && self.alive[slot] && self.generations[slot] == id.generation
    }

    pub fn alive_count(&self) -> usize {
        self.generations.len() - self.free_list.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn alive_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.generations
            .iter()
            .zip(self.alive.iter())
            .enumerate()
            .filter(|(_, (_, alive))| **alive)
            .map(|(index, (generation, _))| EntityId {
                index: index as u32,
                generation: *generation,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_sequential() {
        let mut alloc = EntityAllocator::new(8);
        let e0 = alloc.allocate().unwrap();
        let e1 = alloc.allocate().unwrap();
        assert_ne!(e0, e1);
        assert_eq!(e0.generation(), 0);
        assert_eq!(alloc.alive_count(), 2);
    }

    #[test]
    fn test_recycle_bumps_generation() {
        let mut alloc = EntityAllocator::new(8);
        let e0 = alloc.allocate().unwrap();
        assert!(alloc.deallocate(e0));
        let reused = alloc.allocate().unwrap();
        assert_eq!(reused.index(), e0.index());
        assert_eq!(reused.generation(), e0.generation() + 1);
        assert!(!alloc.is_alive(e0));
        assert!(alloc.is_alive(reused));
    }

    #[test]
    fn test_double_free_is_rejected() {
        let mut alloc = EntityAllocator::new(8);
        let e0 = alloc.allocate().unwrap();
        assert!(alloc.deallocate(e0));
        assert!(!alloc.deallocate(e0));
        assert_eq!(alloc.alive_count(), 0);
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut alloc = EntityAllocator::new(2);
        let first = alloc.allocate().unwrap();
        alloc.allocate().unwrap();
        assert!(matches!(
            alloc.allocate(),
            Err(CavernsError::EntityPoolExhausted { capacity: 2 })
        ));

        alloc.deallocate(first);
        assert!(alloc.allocate().is_ok());
    }

    #[test]
    fn test_alive_ids_skips_freed_slots() {
        let mut alloc = EntityAllocator::new(8);
        let a = alloc.allocate().unwrap();
        let b = alloc.allocate().unwrap();
        let c = alloc.allocate().unwrap();
        alloc.deallocate(b);

        let ids: Vec<_> = alloc.alive_ids().collect();
        assert_eq!(ids, vec![a, c]);
    }
}
