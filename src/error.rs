//! Error types for the paged-file storage layer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::page::PageId;

/// Errors reported by the paged file and its components. All are synchronous
/// results of the failing operation; nothing is retried internally.
#[derive(Error, Debug)]
pub enum PagedFileError {
    #[error("file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("page {page_id} out of range (page count: {page_count})")]
    OutOfRange { page_id: PageId, page_count: i32 },

    #[error("page {0} is not in the buffer pool")]
    NotBuffered(PageId),

    #[error("page {0} is not pinned")]
    NotPinned(PageId),

    #[error("page {0} is still pinned")]
    StillPinned(PageId),

    #[error("page {0} has been disposed")]
    PageDisposed(PageId),

    #[error("no live page in the scanned range")]
    NoLivePage,

    #[error("corrupt frame header at page {page_id}: found {found}")]
    CorruptFrame { page_id: PageId, found: PageId },

    #[error("buffer pool is full: every resident page is pinned")]
    BufferPoolFull,
}

/// Result type for paged-file operations.
pub type Result<T> = std::result::Result<T, PagedFileError>;
