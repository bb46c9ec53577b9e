use std::{collections::HashMap, num::NonZeroUsize, sync::Arc};

use crate::glyph_key::{GlyphCoverage, GlyphKey};

/// Default number of masks a [`CoverageCache`] keeps.
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Default, Clone, Copy)]
struct LruNodes {
    newer: Option<usize>,
    older: Option<usize>,
}

/// Fixed-capacity LRU of glyph coverage masks.
///
/// Slots live in flat vectors and are linked newest to oldest by index.
/// Inserting into a full cache reuses the least recently used slot. Glyphs
/// without ink are cached as `None` so they are not rasterized again.
pub struct CoverageCache {
    capacity: usize,
    slots: Vec<Option<Arc<GlyphCoverage>>>,

    lru_nodes: Vec<LruNodes>,
    lru_head: Option<usize>,
    lru_tail: Option<usize>,
    lru_map: HashMap<GlyphKey, usize, fxhash::FxBuildHasher>,
    lru_empties: Vec<usize>,
    lru_keys: Vec<Option<GlyphKey>>,
}

impl Default for CoverageCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }
}

impl CoverageCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();

        Self {
            capacity,
            slots: vec![None; capacity],
            lru_nodes: vec![LruNodes::default(); capacity],
            lru_head: None,
            lru_tail: None,
            lru_map: HashMap::with_capacity_and_hasher(capacity, fxhash::FxBuildHasher::default()),
            lru_empties: (0..capacity).collect(),
            lru_keys: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lru_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lru_map.is_empty()
    }

    pub fn contains(&self, key: &GlyphKey) -> bool {
        self.lru_map.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.lru_map.clear();
        self.lru_empties = (0..self.capacity).collect();
        self.lru_keys.fill(None);
        self.slots.fill(None);
        self.lru_nodes.fill(LruNodes::default());
        self.lru_head = None;
        self.lru_tail = None;
    }

    /// Returns the cached mask for `key`, or stores what `f` produces.
    ///
    /// A hit moves the entry to the front.
    pub fn get_or_insert_with(
        &mut self,
        key: GlyphKey,
        f: impl FnOnce() -> Option<Arc<GlyphCoverage>>,
    ) -> Option<Arc<GlyphCoverage>> {
        if let Some(&index) = self.lru_map.get(&key) {
            self.detach(index);
            self.attach_to_head(index, key);
            return self.slots[index].clone();
        }

        let coverage = f();
        if let Some(index) = self.take_slot() {
            self.slots[index] = coverage.clone();
            self.attach_to_head(index, key);
        }
        coverage
    }
}

/// internal helpers
impl CoverageCache {
    /// A free slot, evicting the oldest entry when none is left.
    fn take_slot(&mut self) -> Option<usize> {
        if let Some(index) = self.lru_empties.pop() {
            return Some(index);
        }

        let tail = self.lru_tail?;
        self.detach(tail);
        if let Some(old_key) = self.lru_keys[tail].take() {
            self.lru_map.remove(&old_key);
        }
        self.slots[tail] = None;
        Some(tail)
    }

    fn detach(&mut self, index: usize) {
        let LruNodes { newer, older } = self.lru_nodes[index];

        match newer {
            Some(newer) => self.lru_nodes[newer].older = older,
            None => self.lru_head = older,
        }
        match older {
            Some(older) => self.lru_nodes[older].newer = newer,
            None => self.lru_tail = newer,
        }

        self.lru_nodes[index] = LruNodes::default();
    }

    fn attach_to_head(&mut self, index: usize, key: GlyphKey) {
        self.lru_nodes[index].newer = None;
        self.lru_nodes[index].older = self.lru_head;
        self.lru_map.insert(key, index);
        self.lru_keys[index] = Some(key);

        if let Some(old_head) = self.lru_head {
            self.lru_nodes[old_head].newer = Some(index);
        }

        self.lru_head = Some(index);
        if self.lru_tail.is_none() {
            self.lru_tail = Some(index);
        }
    }
}
