// crates/ragdoll_ecs/src/world.rs

use crate::entity::Handle;
use crate::storage::SparseSet;

/// Owns values behind generational handles. Removing a value bumps its slot's
/// generation, so handles kept elsewhere go stale instead of aliasing.
pub struct Arena<T> {
    values: SparseSet<T>,
    free_indices: Vec<u32>,
    generations: Vec<u32>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            values: SparseSet::new(),
            free_indices: Vec::new(),
            generations: Vec::new(),
        }
    }

    pub fn insert(&mut self, value: T) -> Handle {
        let index = if let Some(idx) = self.free_indices.pop() {
            idx
        } else {
            self.generations.push(0);
            (self.generations.len() - 1) as u32
        };

        let handle = Handle::new(index, self.generations[index as usize]);
        self.values.insert(handle, value);
        handle
    }

    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let value = self.values.remove(handle)?;
        let slot = &mut self.generations[handle.index()];
        *slot = slot.wrapping_add(1);
        self.free_indices.push(handle.index() as u32);
        Some(value)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.values.get(handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.values.get_mut(handle)
    }

    /// Mutable access to two distinct live values at once.
    pub fn get_pair_mut(&mut self, a: Handle, b: Handle) -> Option<(&mut T, &mut T)> {
        if a == b || !self.contains(a) || !self.contains(b) {
            return None;
        }
        let mut found_a = None;
        let mut found_b = None;
        for (handle, value) in self.values.iter_mut() {
            if handle == a {
                found_a = Some(value);
            } else if handle == b {
                found_b = Some(value);
            }
        }
        Some((found_a?, found_b?))
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.values.contains(handle)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.values.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.values.iter_mut()
    }

    /// Drops every value; all outstanding handles become stale.
    pub fn clear(&mut self) {
        let live: Vec<Handle> = self.values.iter().map(|(handle, _)| handle).collect();
        for handle in live {
            self.remove(handle);
        }
    }
}
