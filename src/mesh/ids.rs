//! Collision-checked id allocation for generated entities

use std::collections::HashSet;

/// Hands out ids above every id already in use in one namespace
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
    taken: HashSet<u64>,
}

impl IdAllocator {
    /// Allocator whose first id is one past the largest of `taken`
    pub fn above<I>(taken: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let taken: HashSet<u64> = taken.into_iter().collect();
        let next = taken.iter().max().map_or(1, |max| max.saturating_add(1));
        Self { next, taken }
    }

    /// Next free id
    pub fn allocate(&mut self) -> u64 {
        while self.taken.contains(&self.next) {
            self.next += 1;
        }
        let id = self.next;
        self.taken.insert(id);
        self.next += 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::above(std::iter::empty())
    }
}
