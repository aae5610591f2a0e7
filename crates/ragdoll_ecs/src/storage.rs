// crates/ragdoll_ecs/src/storage.rs
use crate::Handle;

pub struct SparseSet<T> {
    dense: Vec<T>,              // Tightly packed data
    handles: Vec<Handle>,       // The handle that owns the data at 'dense[i]'
    sparse: Vec<Option<usize>>, // Maps Handle Index -> Dense Index
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            handles: Vec::new(),
            sparse: Vec::new(),
        }
    }

    pub fn insert(&mut self, handle: Handle, value: T) {
        let index = handle.index();

        if index >= self.sparse.len() {
            self.sparse.resize(index + 1, None);
        }

        // Same slot already occupied: overwrite (also adopts the newer generation)
        if let Some(dense_index) = self.sparse[index] {
            self.dense[dense_index] = value;
            self.handles[dense_index] = handle;
        } else {
            let dense_index = self.dense.len();
            self.dense.push(value);
            self.handles.push(handle);
            self.sparse[index] = Some(dense_index);
        }
    }

    fn dense_index(&self, handle: Handle) -> Option<usize> {
        let dense_index = (*self.sparse.get(handle.index())?)?;
        // Stale handles (older generation) never resolve
        (self.handles[dense_index] == handle).then_some(dense_index)
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.dense_index(handle).map(|i| &self.dense[i])
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.dense_index(handle).map(|i| &mut self.dense[i])
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.dense_index(handle).is_some()
    }

    /// Swap-remove; the last element moves into the freed dense slot.
    pub fn remove(&mut self, handle: Handle) -> Option<T> {
        let dense_index = self.dense_index(handle)?;
        self.sparse[handle.index()] = None;

        let last = self.dense.len() - 1;
        if dense_index != last {
            let moved = self.handles[last];
            self.sparse[moved.index()] = Some(dense_index);
        }
        self.handles.swap_remove(dense_index);
        Some(self.dense.swap_remove(dense_index))
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.dense
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.handles.iter().copied().zip(self.dense.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle, &mut T)> {
        self.handles.iter().copied().zip(self.dense.iter_mut())
    }

    pub fn clear(&mut self) {
        self.dense.clear();
        self.handles.clear();
        self.sparse.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_keeps_other_entries_reachable() {
        let mut set = SparseSet::new();
        let a = Handle::new(0, 0);
        let b = Handle::new(1, 0);
        let c = Handle::new(5, 0);
        set.insert(a, "a");
        set.insert(b, "b");
        set.insert(c, "c");

        assert_eq!(set.remove(a), Some("a"));
        assert_eq!(set.get(b), Some(&"b"));
        assert_eq!(set.get(c), Some(&"c"));
        assert_eq!(set.len(), 2);
        assert!(set.remove(a).is_none());
    }

    #[test]
    fn stale_generation_does_not_resolve() {
        let mut set = SparseSet::new();
        set.insert(Handle::new(2, 1), 10);
        assert!(set.get(Handle::new(2, 0)).is_none());
        assert_eq!(set.get(Handle::new(2, 1)), Some(&10));
    }
}
