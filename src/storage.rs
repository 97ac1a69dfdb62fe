//! Generational slot arena shared by bodies and colliders.
//!
//! Slots are addressed by integer index and never move, so a handle survives
//! growth. Freed slots are kept in place (flagged unoccupied) and reclaimed by
//! a first-free scan; reclaiming bumps the slot's generation so that handles
//! issued before the reuse stop resolving.

use std::marker::PhantomData;

use log::debug;

/// Value stored in a [`SlotStorage`]. The occupancy flag lives on the value
/// itself (a body's `enabled`, a collider's `attached`).
pub trait Slot: Default {
    fn is_occupied(&self) -> bool;
    fn occupy(&mut self);
    fn vacate(&mut self);
}

/// Index + generation pair used to address a slot.
pub trait SlotHandle: Copy {
    fn from_parts(index: usize, generation: u32) -> Self;
    fn index(self) -> usize;
    fn generation(self) -> u32;
}

pub struct SlotStorage<T, H> {
    slots: Vec<T>,
    generations: Vec<u32>,
    _handle: PhantomData<H>,
}

impl<T: Slot, H: SlotHandle> Default for SlotStorage<T, H> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            _handle: PhantomData,
        }
    }
}

impl<T: Slot, H: SlotHandle> SlotStorage<T, H> {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut storage = Self::default();
        storage.slots.resize_with(capacity, T::default);
        storage.generations.resize(capacity, 0);
        storage
    }

    /// Number of slots, occupied or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.generations.clear();
    }

    /// Claim the first unoccupied slot, doubling the storage when none is free.
    pub fn claim(&mut self) -> (H, &mut T) {
        let index = match self.slots.iter().position(|s| !s.is_occupied()) {
            Some(index) => {
                self.generations[index] = self.generations[index].wrapping_add(1);
                index
            }
            None => {
                let previous = self.slots.len();
                let grown = (previous * 2).max(1);
                debug!("growing slot storage {} -> {}", previous, grown);
                self.slots.resize_with(grown, T::default);
                self.generations.resize(grown, 0);
                previous
            }
        };
        let handle = H::from_parts(index, self.generations[index]);
        let slot = &mut self.slots[index];
        *slot = T::default();
        slot.occupy();
        (handle, slot)
    }

    /// Flag the slot as free. The generation is bumped on the next claim.
    pub fn release(&mut self, handle: H) -> Option<()> {
        self.get_mut(handle)?.vacate();
        Some(())
    }

    fn is_current(&self, handle: H) -> bool {
        self.generations.get(handle.index()) == Some(&handle.generation())
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        if !self.is_current(handle) {
            return None;
        }
        self.slots.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: H) -> Option<&mut T> {
        if !self.is_current(handle) {
            return None;
        }
        self.slots.get_mut(handle.index())
    }

    /// Two distinct slots at once. `None` if either handle is stale or both
    /// address the same slot.
    pub fn get2_mut(&mut self, a: H, b: H) -> Option<(&mut T, &mut T)> {
        if !self.is_current(a) || !self.is_current(b) {
            return None;
        }
        let (ia, ib) = (a.index(), b.index());
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (head, tail) = self.slots.split_at_mut(ib);
            Some((&mut head[ia], &mut tail[0]))
        } else {
            let (head, tail) = self.slots.split_at_mut(ia);
            Some((&mut tail[0], &mut head[ib]))
        }
    }

    /// Handle addressing `index` at its current generation.
    pub fn handle_at(&self, index: usize) -> Option<H> {
        self.generations.get(index).map(|&g| H::from_parts(index, g))
    }

    /// Occupied slots with their current handles.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.slots
            .iter()
            .zip(&self.generations)
            .enumerate()
            .filter(|(_, (slot, _))| slot.is_occupied())
            .map(|(i, (slot, &g))| (H::from_parts(i, g), slot))
    }

    /// Every slot, occupied or not.
    pub fn slots_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.slots.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_occupied()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Item {
        live: bool,
        value: i32,
    }

    impl Slot for Item {
        fn is_occupied(&self) -> bool {
            self.live
        }
        fn occupy(&mut self) {
            self.live = true;
        }
        fn vacate(&mut self) {
            self.live = false;
        }
    }

    #[derive(Copy, Clone, Debug, PartialEq)]
    struct Key(usize, u32);

    impl SlotHandle for Key {
        fn from_parts(index: usize, generation: u32) -> Self {
            Key(index, generation)
        }
        fn index(self) -> usize {
            self.0
        }
        fn generation(self) -> u32 {
            self.1
        }
    }

    #[test]
    fn test_claim_doubles_when_full() {
        let mut s: SlotStorage<Item, Key> = SlotStorage::with_capacity(2);
        s.claim();
        s.claim();
        assert_eq!(s.capacity(), 2);
        let (k, _) = s.claim();
        assert_eq!(k.0, 2);
        assert_eq!(s.capacity(), 4);
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_zero_capacity_still_grows() {
        let mut s: SlotStorage<Item, Key> = SlotStorage::with_capacity(0);
        let (k, _) = s.claim();
        assert_eq!(k.0, 0);
        assert_eq!(s.capacity(), 1);
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut s: SlotStorage<Item, Key> = SlotStorage::with_capacity(1);
        let (old, item) = s.claim();
        item.value = 7;
        s.release(old).unwrap();
        // Released but not yet reused: still resolves.
        assert!(s.get(old).is_some());
        let (new, _) = s.claim();
        assert_eq!(new.0, old.0);
        assert_ne!(new.1, old.1);
        assert!(s.get(old).is_none());
        assert!(s.release(old).is_none());
        assert_eq!(s.get(new).map(|i| i.value), Some(0));
    }

    #[test]
    fn test_get2_mut_rejects_same_slot() {
        let mut s: SlotStorage<Item, Key> = SlotStorage::with_capacity(2);
        let (a, _) = s.claim();
        let (b, _) = s.claim();
        assert!(s.get2_mut(a, a).is_none());
        let (x, y) = s.get2_mut(b, a).unwrap();
        x.value = 1;
        y.value = 2;
        assert_eq!(s.get(a).unwrap().value, 2);
        assert_eq!(s.get(b).unwrap().value, 1);
    }

    #[test]
    fn test_out_of_range_handle() {
        let s: SlotStorage<Item, Key> = SlotStorage::with_capacity(1);
        assert!(s.get(Key(5, 0)).is_none());
    }
}
