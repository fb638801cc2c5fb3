//! Fixed-capacity, order-preserving entity pools.

use heapless::Vec;

use crate::entities::Entity;
use crate::framebuffer::LCD_X;

/// At most `N` entities of one kind, in spawn order.
///
/// Entities are killed in place during a tick and only removed by
/// [`Pool::compact`], so indices stay valid until the tick's passes finish.
#[derive(Clone, Debug, Default)]
pub struct Pool<const N: usize> {
    items: Vec<Entity, N>,
}

impl<const N: usize> Pool<N> {
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Slots in use, including entities killed this tick but not yet compacted.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.is_full()
    }

    /// Append an entity. Returns `false` and drops it when the pool is full.
    pub fn spawn(&mut self, entity: Entity) -> bool {
        self.items.push(entity).is_ok()
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.items.iter_mut()
    }

    /// Live entities only.
    pub fn alive(&self) -> impl Iterator<Item = &Entity> {
        self.items.iter().filter(|e| e.alive)
    }

    pub fn kill(&mut self, index: usize) {
        if let Some(entity) = self.items.get_mut(index) {
            entity.alive = false;
        }
    }

    /// Drop dead entities and anything past the right edge, keeping survivors
    /// in their original order.
    pub fn compact(&mut self) {
        self.items.retain(|e| e.alive && e.x <= LCD_X as f64);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
