//! Fixed-size paged-file storage with a pinned LRU buffer pool.
//!
//! A data file is a sequence of 4096-byte frames, one per page number. Key
//! components:
//!
//! - **Page**: a frame's identity (4-byte little-endian header) plus its
//!   4092-byte payload
//! - **PageStore**: positional frame reads and writes against the open file
//! - **BufferPool**: bounded in-memory cache with pin counts, dirty flags,
//!   and LRU eviction over the unpinned entries
//! - **PagedFile**: the façade enforcing the pin/dirty/dispose protocol and
//!   page-number validity
//!
//! Callers normally interact with [`PagedFile`] alone; the lower layers are
//! exposed for embedding layers that bring their own caching policy.

pub mod buffer;
pub mod disk;
pub mod error;
pub mod fsutil;
pub mod page;
pub mod paged_file;

pub use buffer::{BufferPool, BufferedPage, DEFAULT_POOL_CAPACITY};
pub use disk::PageStore;
pub use error::{PagedFileError, Result};
pub use page::{Page, PageId, DEFAULT_BYTE, PAGE_DATA_SIZE, PAGE_HEADER_SIZE, PAGE_SIZE};
pub use paged_file::PagedFile;
