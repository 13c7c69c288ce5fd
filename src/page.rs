//! Page frame layout shared by the disk store and the buffer pool.
//!
//! A frame is 4096 bytes: the first 4 bytes hold the page number as a
//! little-endian `i32`, the remaining 4092 bytes hold the payload.

use std::fmt;

/// Total size of one frame in bytes, on disk and in memory.
pub const PAGE_SIZE: usize = 4096;

/// Size of the frame header (the page number).
pub const PAGE_HEADER_SIZE: usize = 4;

/// Size of the payload portion of a frame.
pub const PAGE_DATA_SIZE: usize = PAGE_SIZE - PAGE_HEADER_SIZE;

/// Fill byte for freshly allocated and disposed frames. Makes uninitialized
/// reads visibly distinguishable from real data in a hex dump.
pub const DEFAULT_BYTE: u8 = 0xee;

/// Page number. Non-negative for live pages; [`PageId::DISPOSED`] marks a
/// disposed frame on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub i32);

impl PageId {
    /// Reserved header value written over a disposed frame.
    pub const DISPOSED: PageId = PageId(-1);

    pub fn is_disposed(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page frame: identity plus fixed-size payload.
#[derive(Debug, Clone)]
pub struct Page {
    id: PageId,
    data: Box<[u8; PAGE_DATA_SIZE]>,
}

impl Page {
    /// A frame for `id` with the body filled with [`DEFAULT_BYTE`].
    pub fn with_default_bytes(id: PageId) -> Self {
        Self {
            id,
            data: Box::new([DEFAULT_BYTE; PAGE_DATA_SIZE]),
        }
    }

    /// The marker frame written over a disposed slot.
    pub fn disposed() -> Self {
        Self::with_default_bytes(PageId::DISPOSED)
    }

    pub(crate) fn from_parts(id: PageId, data: Box<[u8; PAGE_DATA_SIZE]>) -> Self {
        Self { id, data }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn data(&self) -> &[u8; PAGE_DATA_SIZE] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8; PAGE_DATA_SIZE] {
        &mut self.data
    }
}
