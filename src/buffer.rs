//! Bounded in-memory cache of page frames with pin counts and dirty flags.
//!
//! The pool never performs disk I/O itself: the paged file selects a victim
//! via [`BufferPool::victim`], writes it back if dirty, and only then calls
//! [`BufferPool::remove`], so a failed write-back leaves the entry resident.

pub mod lru;
pub mod replacer;

use std::collections::HashMap;

use lru::LruReplacer;
use replacer::Replacer;

use crate::error::{PagedFileError, Result};
use crate::page::{Page, PageId};

/// Default number of resident frames.
pub const DEFAULT_POOL_CAPACITY: usize = 40;

/// A resident page plus its cache bookkeeping. Owned by the pool.
#[derive(Debug)]
pub struct BufferedPage {
    page: Page,
    pin_count: u32,
    dirty: bool,
}

impl BufferedPage {
    fn new(page: Page) -> Self {
        Self {
            page,
            pin_count: 0,
            dirty: false,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub(crate) fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

/// Capacity-bounded mapping from page number to [`BufferedPage`], with LRU
/// recency over the unpinned entries.
///
/// Invariants: a page with a non-zero pin count is never chosen as a victim
/// and never leaves the pool through eviction; `len() <= capacity()`.
pub struct BufferPool {
    frames: HashMap<PageId, BufferedPage>,
    replacer: Box<dyn Replacer>,
    capacity: usize,
}

impl BufferPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: HashMap::with_capacity(capacity),
            replacer: Box::new(LruReplacer::new(capacity)),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, page_id: PageId) -> bool {
        self.frames.contains_key(&page_id)
    }

    /// Cache lookup. A hit refreshes the entry's recency.
    pub fn lookup(&mut self, page_id: PageId) -> Option<&Page> {
        let frame = self.frames.get(&page_id)?;
        if frame.pin_count == 0 {
            self.replacer.touch(page_id);
        }
        Some(&frame.page)
    }

    /// Insert a page with no pins and a clean flag, registered as the most
    /// recently used entry. The caller evicts first when the pool is full.
    pub fn insert(&mut self, page: Page) -> Result<()> {
        if self.is_full() {
            return Err(PagedFileError::BufferPoolFull);
        }
        let page_id = page.id();
        self.frames.insert(page_id, BufferedPage::new(page));
        self.replacer.unpin(page_id);
        Ok(())
    }

    /// Increment a resident page's pin count.
    pub fn pin(&mut self, page_id: PageId) -> Result<()> {
        let frame = self
            .frames
            .get_mut(&page_id)
            .ok_or(PagedFileError::NotBuffered(page_id))?;
        frame.pin_count += 1;
        if frame.pin_count == 1 {
            self.replacer.pin(page_id);
        }
        Ok(())
    }

    /// Decrement a resident page's pin count. At zero pins the page becomes
    /// the most recently used eviction candidate.
    pub fn unpin(&mut self, page_id: PageId) -> Result<()> {
        let frame = self
            .frames
            .get_mut(&page_id)
            .ok_or(PagedFileError::NotBuffered(page_id))?;
        if frame.pin_count == 0 {
            return Err(PagedFileError::NotPinned(page_id));
        }
        frame.pin_count -= 1;
        if frame.pin_count == 0 {
            self.replacer.unpin(page_id);
        }
        Ok(())
    }

    /// Mark a resident page dirty. The page must be pinned by its modifier,
    /// so it cannot be evicted mid-mutation.
    pub fn mark_dirty(&mut self, page_id: PageId) -> Result<()> {
        let frame = self
            .frames
            .get_mut(&page_id)
            .ok_or(PagedFileError::NotBuffered(page_id))?;
        if frame.pin_count == 0 {
            return Err(PagedFileError::NotPinned(page_id));
        }
        frame.dirty = true;
        Ok(())
    }

    /// Remove an entry regardless of pin state. Callers check pins first.
    pub fn remove(&mut self, page_id: PageId) -> Option<BufferedPage> {
        self.replacer.pin(page_id);
        self.frames.remove(&page_id)
    }

    /// The least recently used unpinned page, or `None` when every resident
    /// page is pinned. The entry stays resident until [`BufferPool::remove`].
    pub fn victim(&self) -> Option<PageId> {
        self.replacer.victim()
    }

    pub fn frame(&self, page_id: PageId) -> Option<&BufferedPage> {
        self.frames.get(&page_id)
    }

    pub(crate) fn frame_mut(&mut self, page_id: PageId) -> Option<&mut BufferedPage> {
        self.frames.get_mut(&page_id)
    }

    pub(crate) fn frames_mut(&mut self) -> impl Iterator<Item = &mut BufferedPage> {
        self.frames.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_with_pages(capacity: usize, count: i32) -> BufferPool {
        let mut pool = BufferPool::new(capacity);
        for i in 0..count {
            pool.insert(Page::with_default_bytes(PageId(i))).unwrap();
        }
        pool
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut pool = BufferPool::new(4);
        let mut page = Page::with_default_bytes(PageId(0));
        page.data_mut()[0] = 42;
        pool.insert(page).unwrap();

        assert!(pool.contains(PageId(0)));
        assert_eq!(pool.len(), 1);
        let hit = pool.lookup(PageId(0)).unwrap();
        assert_eq!(hit.data()[0], 42);
        assert!(pool.lookup(PageId(1)).is_none());
    }

    #[test]
    fn test_new_entry_is_clean_and_unpinned() {
        let pool = pool_with_pages(4, 1);
        let frame = pool.frame(PageId(0)).unwrap();
        assert_eq!(frame.pin_count(), 0);
        assert!(!frame.is_dirty());
    }

    #[test]
    fn test_insert_full_pool() {
        let mut pool = pool_with_pages(2, 2);
        let result = pool.insert(Page::with_default_bytes(PageId(2)));
        assert!(matches!(result, Err(PagedFileError::BufferPoolFull)));
    }

    #[test]
    fn test_pin_count_round_trip() {
        let mut pool = pool_with_pages(4, 1);

        pool.pin(PageId(0)).unwrap();
        pool.pin(PageId(0)).unwrap();
        assert_eq!(pool.frame(PageId(0)).unwrap().pin_count(), 2);

        pool.unpin(PageId(0)).unwrap();
        assert_eq!(pool.frame(PageId(0)).unwrap().pin_count(), 1);
        pool.unpin(PageId(0)).unwrap();

        let result = pool.unpin(PageId(0));
        assert!(matches!(result, Err(PagedFileError::NotPinned(_))));
    }

    #[test]
    fn test_pin_absent_page() {
        let mut pool = BufferPool::new(4);
        let result = pool.pin(PageId(0));
        assert!(matches!(result, Err(PagedFileError::NotBuffered(_))));
        let result = pool.unpin(PageId(0));
        assert!(matches!(result, Err(PagedFileError::NotBuffered(_))));
    }

    #[test]
    fn test_mark_dirty_requires_pin() {
        let mut pool = pool_with_pages(4, 1);

        let result = pool.mark_dirty(PageId(0));
        assert!(matches!(result, Err(PagedFileError::NotPinned(_))));

        pool.pin(PageId(0)).unwrap();
        pool.mark_dirty(PageId(0)).unwrap();
        assert!(pool.frame(PageId(0)).unwrap().is_dirty());

        // Dirty flag survives unpinning
        pool.unpin(PageId(0)).unwrap();
        assert!(pool.frame(PageId(0)).unwrap().is_dirty());

        let result = pool.mark_dirty(PageId(9));
        assert!(matches!(result, Err(PagedFileError::NotBuffered(_))));
    }

    #[test]
    fn test_victim_is_lru_unpinned() {
        let mut pool = pool_with_pages(3, 3);

        assert_eq!(pool.victim(), Some(PageId(0)));

        // A lookup hit refreshes recency
        pool.lookup(PageId(0)).unwrap();
        assert_eq!(pool.victim(), Some(PageId(1)));

        // Pinned pages are skipped
        pool.pin(PageId(1)).unwrap();
        assert_eq!(pool.victim(), Some(PageId(2)));
    }

    #[test]
    fn test_victim_none_when_all_pinned() {
        let mut pool = pool_with_pages(2, 2);
        pool.pin(PageId(0)).unwrap();
        pool.pin(PageId(1)).unwrap();
        assert_eq!(pool.victim(), None);

        pool.unpin(PageId(1)).unwrap();
        assert_eq!(pool.victim(), Some(PageId(1)));
    }

    #[test]
    fn test_lookup_of_pinned_page_keeps_order() {
        let mut pool = pool_with_pages(3, 3);
        pool.pin(PageId(0)).unwrap();

        // Hits on a pinned page do not touch the evictable order
        pool.lookup(PageId(0)).unwrap();
        assert_eq!(pool.victim(), Some(PageId(1)));
    }

    #[test]
    fn test_remove_is_unconditional() {
        let mut pool = pool_with_pages(4, 2);
        pool.pin(PageId(1)).unwrap();

        let removed = pool.remove(PageId(1)).unwrap();
        assert_eq!(removed.page().id(), PageId(1));
        assert!(!pool.contains(PageId(1)));
        assert_eq!(pool.len(), 1);

        assert!(pool.remove(PageId(1)).is_none());
    }

    #[test]
    fn test_victim_survives_until_remove() {
        let mut pool = pool_with_pages(2, 2);

        // Peeking at the victim does not remove it
        assert_eq!(pool.victim(), Some(PageId(0)));
        assert!(pool.contains(PageId(0)));
        assert_eq!(pool.victim(), Some(PageId(0)));

        pool.remove(PageId(0));
        assert_eq!(pool.victim(), Some(PageId(1)));
    }
}
