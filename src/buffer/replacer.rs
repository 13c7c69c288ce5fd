use std::fmt::Debug;

use crate::page::PageId;

/// Eviction-policy seam for the buffer pool. Implementations track the set of
/// evictable (unpinned) resident pages and their replacement order.
pub trait Replacer: Send + Sync + Debug {
    /// The current eviction candidate, without removing it. Returns `None`
    /// when every resident page is pinned. The candidate stays tracked until
    /// `pin` drops it, so a failed write-back never loses the entry.
    fn victim(&self) -> Option<PageId>;

    /// Mark a page as pinned (not evictable).
    fn pin(&mut self, page_id: PageId);

    /// Mark a page as unpinned, making it the most recently used evictable
    /// entry.
    fn unpin(&mut self, page_id: PageId);

    /// Record an access, moving the page to most recently used if it is
    /// currently evictable.
    fn touch(&mut self, page_id: PageId);

    /// Number of evictable pages.
    fn size(&self) -> usize;
}
