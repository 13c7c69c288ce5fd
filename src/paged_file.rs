//! The paged-file façade: page allocation and disposal bookkeeping on top of
//! the buffer pool and the raw page store.

use std::path::Path;

use log::warn;
use parking_lot::Mutex;

use crate::buffer::{BufferPool, DEFAULT_POOL_CAPACITY};
use crate::disk::PageStore;
use crate::error::{PagedFileError, Result};
use crate::page::{Page, PageId, PAGE_DATA_SIZE, PAGE_SIZE};

struct Inner {
    store: PageStore,
    pool: BufferPool,
    /// High-water mark of allocated page slots. Disposal does not shrink it.
    page_count: i32,
}

impl Inner {
    fn check_range(&self, page_id: PageId) -> Result<()> {
        if page_id.0 < 0 || page_id.0 >= self.page_count {
            return Err(PagedFileError::OutOfRange {
                page_id,
                page_count: self.page_count,
            });
        }
        Ok(())
    }

    /// Ensure one free pool slot, evicting the least recently used unpinned
    /// page when full. A dirty victim is written back strictly before its
    /// entry is removed, so a failed write-back leaves the pool intact.
    fn make_room(&mut self) -> Result<()> {
        if !self.pool.is_full() {
            return Ok(());
        }
        let victim = self.pool.victim().ok_or(PagedFileError::BufferPoolFull)?;
        let frame = self
            .pool
            .frame(victim)
            .ok_or(PagedFileError::NotBuffered(victim))?;
        if frame.is_dirty() {
            self.store.write_frame(victim.0 as u32, frame.page())?;
        }
        self.pool.remove(victim);
        Ok(())
    }

    fn flush_dirty(&mut self) -> Result<()> {
        // Flush order does not matter: no page depends on another's position.
        for frame in self.pool.frames_mut() {
            if frame.is_dirty() {
                let page_id = frame.page().id();
                self.store.write_frame(page_id.0 as u32, frame.page())?;
                frame.clear_dirty();
            }
        }
        Ok(())
    }

    /// Write back one resident page if dirty, clearing its flag. A page that
    /// is not resident or not dirty needs no forcing.
    fn force_page(&mut self, page_id: PageId) -> Result<()> {
        if let Some(frame) = self.pool.frame_mut(page_id) {
            if frame.is_dirty() {
                self.store.write_frame(page_id.0 as u32, frame.page())?;
                frame.clear_dirty();
            }
        }
        Ok(())
    }

    /// Read the frame at `page_id`'s slot. The header must carry either the
    /// slot's own number or the disposed sentinel; anything else means the
    /// file is corrupt.
    fn read_slot(&mut self, page_id: PageId) -> Result<Page> {
        let page = self.store.read_frame(page_id.0 as u32)?;
        if !page.id().is_disposed() && page.id() != page_id {
            return Err(PagedFileError::CorruptFrame {
                page_id,
                found: page.id(),
            });
        }
        Ok(page)
    }

    /// Fetch an in-range page, caching it on a miss. Returns `None` for a
    /// disposed slot; the disposed marker is never cached.
    fn try_fetch(&mut self, page_id: PageId) -> Result<Option<Page>> {
        if let Some(page) = self.pool.lookup(page_id) {
            return Ok(Some(page.clone()));
        }
        self.make_room()?;
        let page = self.read_slot(page_id)?;
        if page.id().is_disposed() {
            return Ok(None);
        }
        self.pool.insert(page.clone())?;
        Ok(Some(page))
    }

    /// First live page at or after slot `from`.
    fn scan_forward(&mut self, from: i32) -> Result<Page> {
        for n in from.max(0)..self.page_count {
            if let Some(page) = self.try_fetch(PageId(n))? {
                return Ok(page);
            }
        }
        Err(PagedFileError::NoLivePage)
    }

    /// First live page at or before slot `from`.
    fn scan_backward(&mut self, from: i32) -> Result<Page> {
        let mut n = from.min(self.page_count - 1);
        while n >= 0 {
            if let Some(page) = self.try_fetch(PageId(n))? {
                return Ok(page);
            }
            n -= 1;
        }
        Err(PagedFileError::NoLivePage)
    }
}

/// A disk file organized as fixed-size pages, with a bounded in-memory cache.
///
/// Every operation locks the interior, so a `PagedFile` can be shared across
/// threads. The pin protocol is the caller's contract: pin before mutating,
/// mark dirty after mutating, unpin when done, and unpin before disposing.
pub struct PagedFile {
    inner: Mutex<Inner>,
}

impl PagedFile {
    /// Create a paged file at `path`. The file must not already exist.
    pub fn create(path: &Path) -> Result<Self> {
        Self::create_with_capacity(path, DEFAULT_POOL_CAPACITY)
    }

    pub fn create_with_capacity(path: &Path, capacity: usize) -> Result<Self> {
        let store = PageStore::create(path)?;
        Ok(Self::from_store(store, 0, capacity))
    }

    /// Open a paged file previously built by [`PagedFile::create`]. No pages
    /// are preloaded into the pool.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_capacity(path, DEFAULT_POOL_CAPACITY)
    }

    pub fn open_with_capacity(path: &Path, capacity: usize) -> Result<Self> {
        let store = PageStore::open(path)?;
        let len = store.file_len()?;
        if len % PAGE_SIZE as u64 != 0 {
            warn!(
                "file {} length {} is not a multiple of the page size; trailing bytes ignored",
                path.display(),
                len
            );
        }
        let page_count = (len / PAGE_SIZE as u64) as i32;
        Ok(Self::from_store(store, page_count, capacity))
    }

    fn from_store(store: PageStore, page_count: i32, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                store,
                pool: BufferPool::new(capacity),
                page_count,
            }),
        }
    }

    /// Allocate the next page number, write its default-filled frame to disk,
    /// and cache it pinned. Callers unpin when done. Page numbers grow
    /// monotonically: disposed numbers are not reused.
    pub fn allocate_page(&self) -> Result<Page> {
        let mut inner = self.inner.lock();
        inner.make_room()?;
        let page_id = PageId(inner.page_count);
        let page = Page::with_default_bytes(page_id);
        inner.store.write_frame(page_id.0 as u32, &page)?;
        inner.pool.insert(page.clone())?;
        inner.pool.pin(page_id)?;
        inner.page_count += 1;
        Ok(page)
    }

    /// Fetch a page by number. Pool hits return the cached frame without disk
    /// I/O; misses read the frame from disk and cache it, evicting the least
    /// recently used unpinned page when the pool is full. The page is not
    /// pinned on the caller's behalf; pin explicitly before mutating.
    pub fn get_page(&self, page_id: PageId) -> Result<Page> {
        let mut inner = self.inner.lock();
        inner.check_range(page_id)?;
        inner
            .try_fetch(page_id)?
            .ok_or(PagedFileError::PageDisposed(page_id))
    }

    /// The first live page of the file, skipping disposed slots. Fails with
    /// `NoLivePage` when the file is empty or every page has been disposed.
    pub fn first_page(&self) -> Result<Page> {
        let mut inner = self.inner.lock();
        inner.scan_forward(0)
    }

    /// The last live page of the file, skipping disposed slots.
    pub fn last_page(&self) -> Result<Page> {
        let mut inner = self.inner.lock();
        let from = inner.page_count - 1;
        inner.scan_backward(from)
    }

    /// The nearest live page after `current`, skipping disposed slots. Fails
    /// with `NoLivePage` when no live page follows.
    pub fn next_page(&self, current: PageId) -> Result<Page> {
        let mut inner = self.inner.lock();
        inner.check_range(current)?;
        inner.scan_forward(current.0 + 1)
    }

    /// The nearest live page before `current`, skipping disposed slots.
    pub fn previous_page(&self, current: PageId) -> Result<Page> {
        let mut inner = self.inner.lock();
        inner.check_range(current)?;
        inner.scan_backward(current.0 - 1)
    }

    /// Pin a resident page, marking it in use and ineligible for eviction.
    pub fn pin_page(&self, page_id: PageId) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.check_range(page_id)?;
        inner.pool.pin(page_id)
    }

    /// Mutate the buffered payload of a pinned page. The dirty flag is not
    /// touched; call [`PagedFile::mark_dirty`] to schedule the write-back.
    pub fn update_page<F>(&self, page_id: PageId, f: F) -> Result<()>
    where
        F: FnOnce(&mut [u8; PAGE_DATA_SIZE]),
    {
        let mut inner = self.inner.lock();
        inner.check_range(page_id)?;
        let frame = inner
            .pool
            .frame_mut(page_id)
            .ok_or(PagedFileError::NotBuffered(page_id))?;
        if frame.pin_count() == 0 {
            return Err(PagedFileError::NotPinned(page_id));
        }
        f(frame.page_mut().data_mut());
        Ok(())
    }

    /// Record that a page's payload has diverged from disk. The page must be
    /// pinned by its modifier for the duration of the mutation.
    pub fn mark_dirty(&self, page_id: PageId) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.check_range(page_id)?;
        inner.pool.mark_dirty(page_id)
    }

    /// Release one pin. Once this returns, the page is eligible for eviction.
    /// Unpinning a page that is not resident is a logged warning, not an
    /// error.
    pub fn unpin_page(&self, page_id: PageId) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.check_range(page_id)?;
        match inner.pool.unpin(page_id) {
            Err(PagedFileError::NotBuffered(_)) => {
                warn!("unpin of page {} ignored: not in the buffer pool", page_id);
                Ok(())
            }
            other => other,
        }
    }

    /// Overwrite the page's on-disk frame with the disposed marker and drop
    /// it from the pool. The page must be unpinned first. The slot is not
    /// reused by later allocations.
    pub fn dispose_page(&self, page_id: PageId) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.check_range(page_id)?;
        if let Some(frame) = inner.pool.frame(page_id) {
            if frame.pin_count() > 0 {
                return Err(PagedFileError::StillPinned(page_id));
            }
        } else {
            // Not resident: the on-disk header tells whether this slot was
            // already disposed.
            let on_disk = inner.read_slot(page_id)?;
            if on_disk.id().is_disposed() {
                return Err(PagedFileError::PageDisposed(page_id));
            }
        }
        // Write the marker first; drop the pool entry only once the frame is
        // safely on disk.
        inner.store.write_frame(page_id.0 as u32, &Page::disposed())?;
        inner.pool.remove(page_id);
        Ok(())
    }

    /// Write one page's buffered content to disk if dirty, clearing its
    /// dirty flag. The page may stay pinned; the file stays open. A page that
    /// is not resident (or not dirty) needs no forcing and is not an error.
    pub fn force_page(&self, page_id: PageId) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.check_range(page_id)?;
        inner.force_page(page_id)
    }

    /// Write every dirty buffered page to disk, clearing the dirty flags.
    /// Unlike [`PagedFile::close`], the file stays open and the pool keeps
    /// its entries.
    pub fn force_all_pages(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.flush_dirty()
    }

    /// Number of page slots ever allocated.
    pub fn num_pages(&self) -> i32 {
        self.inner.lock().page_count
    }

    /// Flush every dirty buffered page to disk and sync the file.
    pub fn close(self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.flush_dirty()?;
        inner.store.sync()?;
        Ok(())
    }
}

impl Drop for PagedFile {
    fn drop(&mut self) {
        // Best effort for callers that skipped close(); a closed file has no
        // dirty pages left, so this is a no-op after a successful close.
        let mut inner = self.inner.lock();
        if let Err(e) = inner.flush_dirty() {
            warn!("flush on drop failed: {}", e);
        }
    }
}
