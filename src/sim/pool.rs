//! Fixed-capacity object pool
//!
//! Every item is created up front and then toggled between the active and
//! inactive sets. The pool never grows: asking for more items than it holds
//! returns [`PoolError::Exhausted`].
//!
//! Handles carry a generation so a handle kept after its item was pooled
//! cannot release the item's next user.

use crate::error::PoolError;

/// Per-use state reset hooks for pooled entities
pub trait Poolable {
    /// Item moves from inactive to active; clear per-use flags here
    fn on_spawn(&mut self);
    /// Item moves back to inactive; hide/disable it here
    fn on_pool(&mut self);
}

/// Handle to an active pool item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    index: u32,
    generation: u32,
}

impl PoolHandle {
    /// Slot index inside the owning pool
    #[inline]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    item: T,
    active: bool,
    generation: u32,
}

/// Fixed-capacity recycling container
#[derive(Debug, Clone)]
pub struct ObjectPool<T> {
    slots: Vec<Slot<T>>,
    /// Inactive slot indices (stack, O(1) acquire/release)
    free: Vec<u32>,
}

impl<T: Poolable> ObjectPool<T> {
    /// Create a pool of `capacity` items built by `make(slot_index)`.
    /// All items start inactive.
    pub fn new(capacity: usize, mut make: impl FnMut(usize) -> T) -> Self {
        let slots = (0..capacity)
            .map(|i| {
                let mut item = make(i);
                item.on_pool();
                Slot {
                    item,
                    active: false,
                    generation: 0,
                }
            })
            .collect();
        // Reverse so the lowest index is handed out first
        let free = (0..capacity as u32).rev().collect();
        Self { slots, free }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn inactive_count(&self) -> usize {
        self.free.len()
    }

    /// Move one inactive item into the active set
    pub fn get_item(&mut self) -> Result<PoolHandle, PoolError> {
        let index = self.free.pop().ok_or(PoolError::Exhausted {
            capacity: self.slots.len(),
        })?;
        let slot = &mut self.slots[index as usize];
        debug_assert!(!slot.active, "free list held an active slot");
        slot.active = true;
        slot.generation = slot.generation.wrapping_add(1);
        slot.item.on_spawn();
        Ok(PoolHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Move an active item back to the inactive set
    pub fn pool_item(&mut self, handle: PoolHandle) -> Result<(), PoolError> {
        let slot = self.live_slot_mut(handle)?;
        slot.active = false;
        slot.item.on_pool();
        self.free.push(handle.index);
        Ok(())
    }

    /// Move every active item back to the inactive set
    pub fn pool_all_items(&mut self) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            if slot.active {
                slot.active = false;
                slot.item.on_pool();
                self.free.push(i as u32);
            }
        }
    }

    /// True if `handle` still refers to the active use it was issued for
    pub fn is_active(&self, handle: PoolHandle) -> bool {
        self.slots
            .get(handle.index())
            .is_some_and(|s| s.active && s.generation == handle.generation)
    }

    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|s| s.active && s.generation == handle.generation)
            .map(|s| &s.item)
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.live_slot_mut(handle).ok().map(|s| &mut s.item)
    }

    /// Active items with their handles, in slot order
    pub fn active_items(&self) -> impl Iterator<Item = (PoolHandle, &T)> {
        self.slots.iter().enumerate().filter(|(_, s)| s.active).map(|(i, s)| {
            (
                PoolHandle {
                    index: i as u32,
                    generation: s.generation,
                },
                &s.item,
            )
        })
    }

    pub fn active_items_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots
            .iter_mut()
            .filter(|s| s.active)
            .map(|s| &mut s.item)
    }

    /// Every item, active or not
    pub fn all_items(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().map(|s| &s.item)
    }

    pub fn all_items_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().map(|s| &mut s.item)
    }

    fn live_slot_mut(&mut self, handle: PoolHandle) -> Result<&mut Slot<T>, PoolError> {
        match self.slots.get_mut(handle.index()) {
            Some(slot) if slot.active && slot.generation == handle.generation => Ok(slot),
            _ => Err(PoolError::StaleHandle {
                index: handle.index(),
            }),
        }
    }
}
