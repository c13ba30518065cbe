//! The generational slot arena.
//!
//! [`Arena`] hands out typed keys for inserted values. Vacated slots go
//! onto a free list and are reused with a bumped generation, so indices
//! stay dense while stale keys are still rejected.

use std::marker::PhantomData;

use crate::error::ArenaError;
use crate::handle::SlotKey;

#[derive(Clone, Debug)]
struct Slot<V> {
    generation: u32,
    value: Option<V>,
}

/// Dense storage addressed by generational keys.
///
/// Iteration order is slot order, which for an arena without removals
/// is insertion order. All operations are O(1) except iteration.
#[derive(Clone, Debug)]
pub struct Arena<K, V> {
    slots: Vec<Slot<V>>,
    free: Vec<u32>,
    len: usize,
    _key: PhantomData<fn() -> K>,
}

impl<K: SlotKey, V> Arena<K, V> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty arena with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
            _key: PhantomData,
        }
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the arena holds no live values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a value, returning its key.
    pub fn insert(&mut self, value: V) -> Result<K, ArenaError> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            self.len += 1;
            return Ok(K::from_raw(index, slot.generation));
        }
        let index = u32::try_from(self.slots.len()).map_err(|_| ArenaError::CapacityExceeded {
            slots: self.slots.len(),
        })?;
        if index == u32::MAX {
            return Err(ArenaError::CapacityExceeded {
                slots: self.slots.len(),
            });
        }
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        self.len += 1;
        Ok(K::from_raw(index, 0))
    }

    /// Whether `key` addresses a live value.
    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Borrow the value for `key`, if live.
    pub fn get(&self, key: K) -> Option<&V> {
        let slot = self.slots.get(key.index() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    /// Mutably borrow the value for `key`, if live.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let slot = self.slots.get_mut(key.index() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    /// Remove and return the value for `key`.
    ///
    /// The slot generation is bumped so `key` (and every copy of it)
    /// becomes stale.
    pub fn remove(&mut self, key: K) -> Option<V> {
        let slot = self.slots.get_mut(key.index() as usize)?;
        if slot.generation != key.generation() {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index());
        self.len -= 1;
        Some(value)
    }

    /// Iterate over live `(key, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value
                .as_ref()
                .map(|v| (K::from_raw(i as u32, slot.generation), v))
        })
    }

    /// Iterate over live keys in slot order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    /// Iterate over live values in slot order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.slots.iter().filter_map(|slot| slot.value.as_ref())
    }
}

impl<K: SlotKey, V> Default for Arena<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
