use std::collections::{HashMap, VecDeque};

use super::replacer::Replacer;
use crate::page::PageId;

/// Strict LRU order over the unpinned resident pages.
#[derive(Debug)]
pub struct LruReplacer {
    /// Evictable pages, least recently used at the front.
    lru_list: VecDeque<PageId>,
    /// Position of each evictable page in `lru_list`, for O(1) membership.
    positions: HashMap<PageId, usize>,
    /// Maximum number of evictable pages.
    max_size: usize,
}

impl LruReplacer {
    pub fn new(max_size: usize) -> Self {
        Self {
            lru_list: VecDeque::with_capacity(max_size),
            positions: HashMap::with_capacity(max_size),
            max_size,
        }
    }

    fn reindex(&mut self) {
        for (idx, &page_id) in self.lru_list.iter().enumerate() {
            self.positions.insert(page_id, idx);
        }
    }

    fn remove_entry(&mut self, page_id: PageId) -> bool {
        if let Some(idx) = self.positions.remove(&page_id) {
            self.lru_list.remove(idx);
            self.reindex();
            true
        } else {
            false
        }
    }

    fn push_mru(&mut self, page_id: PageId) {
        self.lru_list.push_back(page_id);
        self.positions.insert(page_id, self.lru_list.len() - 1);
    }
}

impl Replacer for LruReplacer {
    fn victim(&self) -> Option<PageId> {
        self.lru_list.front().copied()
    }

    fn pin(&mut self, page_id: PageId) {
        self.remove_entry(page_id);
    }

    fn unpin(&mut self, page_id: PageId) {
        if !self.positions.contains_key(&page_id) && self.lru_list.len() < self.max_size {
            self.push_mru(page_id);
        }
    }

    fn touch(&mut self, page_id: PageId) {
        if self.remove_entry(page_id) {
            self.push_mru(page_id);
        }
    }

    fn size(&self) -> usize {
        self.lru_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_lru_order() {
        let mut replacer = LruReplacer::new(3);

        // Initially empty
        assert_eq!(replacer.size(), 0);
        assert_eq!(replacer.victim(), None);

        replacer.unpin(PageId(1));
        replacer.unpin(PageId(2));
        replacer.unpin(PageId(3));
        assert_eq!(replacer.size(), 3);

        // First unpinned is the first victim
        assert_eq!(replacer.victim(), Some(PageId(1)));
        replacer.pin(PageId(1));
        assert_eq!(replacer.victim(), Some(PageId(2)));
        replacer.pin(PageId(2));
        assert_eq!(replacer.victim(), Some(PageId(3)));
        replacer.pin(PageId(3));
        assert_eq!(replacer.victim(), None);
    }

    #[test]
    fn test_pin_removes_from_order() {
        let mut replacer = LruReplacer::new(3);

        replacer.unpin(PageId(1));
        replacer.unpin(PageId(2));
        assert_eq!(replacer.size(), 2);

        replacer.pin(PageId(1));
        assert_eq!(replacer.size(), 1);
        assert_eq!(replacer.victim(), Some(PageId(2)));

        // Unpin frame 1 again: it becomes the most recently used
        replacer.unpin(PageId(1));
        assert_eq!(replacer.victim(), Some(PageId(2)));
    }

    #[test]
    fn test_touch_moves_to_mru() {
        let mut replacer = LruReplacer::new(3);

        replacer.unpin(PageId(1));
        replacer.unpin(PageId(2));
        replacer.unpin(PageId(3));

        replacer.touch(PageId(1));
        assert_eq!(replacer.victim(), Some(PageId(2)));

        replacer.touch(PageId(2));
        assert_eq!(replacer.victim(), Some(PageId(3)));
    }

    #[test]
    fn test_touch_ignores_absent() {
        let mut replacer = LruReplacer::new(2);

        replacer.touch(PageId(999));
        assert_eq!(replacer.size(), 0);
    }

    #[test]
    fn test_duplicate_unpin() {
        let mut replacer = LruReplacer::new(2);

        replacer.unpin(PageId(1));
        assert_eq!(replacer.size(), 1);

        // Duplicate unpin does not reorder or duplicate the entry
        replacer.unpin(PageId(1));
        assert_eq!(replacer.size(), 1);
    }

    #[test]
    fn test_pin_non_existent() {
        let mut replacer = LruReplacer::new(2);

        replacer.pin(PageId(999));
        assert_eq!(replacer.size(), 0);
    }

    #[test]
    fn test_max_size_limit() {
        let mut replacer = LruReplacer::new(2);

        replacer.unpin(PageId(1));
        replacer.unpin(PageId(2));
        replacer.unpin(PageId(3)); // Ignored due to max size

        assert_eq!(replacer.size(), 2);
    }

    #[test]
    fn test_complex_scenario() {
        let mut replacer = LruReplacer::new(3);

        replacer.unpin(PageId(1));
        replacer.unpin(PageId(2));
        replacer.unpin(PageId(3));

        replacer.pin(PageId(2));
        assert_eq!(replacer.size(), 2);

        assert_eq!(replacer.victim(), Some(PageId(1)));
        replacer.pin(PageId(1));

        replacer.unpin(PageId(2));
        replacer.unpin(PageId(4));

        // Eviction order is now 3, 2, 4
        assert_eq!(replacer.victim(), Some(PageId(3)));
        replacer.pin(PageId(3));
        assert_eq!(replacer.victim(), Some(PageId(2)));
        replacer.pin(PageId(2));
        assert_eq!(replacer.victim(), Some(PageId(4)));
    }
}
