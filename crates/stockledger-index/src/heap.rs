//! Array-backed binary heap keyed by a decimal sort key.
//!
//! The mode (min or max) is fixed at construction. Entries carry their own
//! key so the payload type needs no ordering of its own.

use rust_decimal::Decimal;

/// Which end of the key range sits at the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapMode {
    /// Root holds the smallest key.
    Min,
    /// Root holds the largest key.
    Max,
}

#[derive(Debug, Clone)]
struct HeapEntry<T> {
    key: Decimal,
    item: T,
}

/// A binary heap of `T` ordered by a [`Decimal`] key.
///
/// Children of slot `i` live at `2i + 1` and `2i + 2`. A child only moves
/// above its parent when it is *strictly* more extreme, so among equal keys
/// the earliest pushed entry stays closest to the root.
#[derive(Debug, Clone)]
pub struct BinaryHeap<T> {
    entries: Vec<HeapEntry<T>>,
    mode: HeapMode,
}

impl<T> BinaryHeap<T> {
    #[must_use]
    pub fn new(mode: HeapMode) -> Self {
        Self {
            entries: Vec::new(),
            mode,
        }
    }

    #[must_use]
    pub fn min() -> Self {
        Self::new(HeapMode::Min)
    }

    #[must_use]
    pub fn max() -> Self {
        Self::new(HeapMode::Max)
    }

    #[must_use]
    pub fn mode(&self) -> HeapMode {
        self.mode
    }

    /// Insert `item` under `key`. O(log n).
    pub fn push(&mut self, item: T, key: Decimal) {
        self.entries.push(HeapEntry { key, item });
        self.sift_up(self.entries.len() - 1);
    }

    /// The most extreme item, or `None` if the heap is empty.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.entries.first().map(|e| &e.item)
    }

    /// Key of the most extreme item.
    #[must_use]
    pub fn peek_key(&self) -> Option<Decimal> {
        self.entries.first().map(|e| e.key)
    }

    /// Remove and return the most extreme item. O(log n).
    pub fn pop(&mut self) -> Option<T> {
        if self.entries.is_empty() {
            return None;
        }
        let root = self.entries.swap_remove(0);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some(root.item)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` if key `a` belongs strictly above key `b`.
    fn more_extreme(&self, a: Decimal, b: Decimal) -> bool {
        match self.mode {
            HeapMode::Min => a < b,
            HeapMode::Max => a > b,
        }
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if !self.more_extreme(self.entries[idx].key, self.entries[parent].key) {
                break;
            }
            self.entries.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * idx + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut child = left;
            if right < len && self.more_extreme(self.entries[right].key, self.entries[left].key) {
                child = right;
            }
            if !self.more_extreme(self.entries[child].key, self.entries[idx].key) {
                break;
            }
            self.entries.swap(idx, child);
            idx = child;
        }
    }
}
