//! Positional frame I/O against the underlying data file.
//!
//! [`PageStore`] is the only component that touches raw bytes and offsets.
//! Positions are slot indices equal to page numbers; the store never consults
//! pin or dirty state.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{PagedFileError, Result};
use crate::fsutil;
use crate::page::{Page, PageId, PAGE_DATA_SIZE, PAGE_SIZE};

pub struct PageStore {
    file: File,
}

impl PageStore {
    /// Create the data file at `path`. The file must not already exist.
    pub fn create(path: &Path) -> Result<Self> {
        if fsutil::path_exists(path) {
            return Err(PagedFileError::AlreadyExists(path.to_path_buf()));
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(Self { file })
    }

    /// Open an existing data file at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if fsutil::path_not_exists(path) {
            return Err(PagedFileError::NotFound(path.to_path_buf()));
        }
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self { file })
    }

    /// Read the whole frame at slot `position`: the little-endian page-number
    /// header, then the body. Short reads surface as IO errors.
    pub fn read_frame(&mut self, position: u32) -> Result<Page> {
        self.seek_to(position)?;
        let num = self.file.read_i32::<LittleEndian>()?;
        let mut data = Box::new([0u8; PAGE_DATA_SIZE]);
        self.file.read_exact(&mut data[..])?;
        Ok(Page::from_parts(PageId(num), data))
    }

    /// Write the whole frame for `page` at slot `position`, header then body.
    pub fn write_frame(&mut self, position: u32, page: &Page) -> Result<()> {
        self.seek_to(position)?;
        self.file.write_i32::<LittleEndian>(page.id().0)?;
        self.file.write_all(&page.data()[..])?;
        Ok(())
    }

    pub fn file_len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Flush file contents and metadata to the OS.
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    fn seek_to(&mut self, position: u32) -> Result<()> {
        let offset = position as u64 * PAGE_SIZE as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
}
