//! Memory-mapped page dump files
//!
//! A dump is a raw copy of consecutive DMA pages. The file is mapped
//! read-only and split into fixed-size pages; headers are read in place.

use std::fs::File;
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapOptions};

use crate::error::{Error, Result};

/// A page dump mapped into memory
pub struct PageFile {
    mmap: Mmap,
    path: PathBuf,
}

impl PageFile {
    /// Map `path` read-only
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        if file.metadata()?.len() == 0 {
            return Err(Error::EmptyFile(path));
        }

        // SAFETY: read-only mapping; the dump is not expected to change while inspected
        let mmap = unsafe { MmapOptions::new().map(&file)? };

        tracing::debug!(path = %path.display(), bytes = mmap.len(), "mapped page dump");
        Ok(Self { mmap, path })
    }

    /// Path the dump was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whole file contents
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }

    /// File size in bytes
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Number of pages of `page_size` bytes, counting a short last page
    pub fn page_count(&self, page_size: usize) -> Result<usize> {
        let page_size = checked_page_size(page_size)?;
        Ok(self.len().div_ceil(page_size))
    }

    /// Consecutive pages of `page_size` bytes; the last one may be shorter
    pub fn pages(&self, page_size: usize) -> Result<std::slice::Chunks<'_, u8>> {
        let page_size = checked_page_size(page_size)?;
        Ok(self.as_bytes().chunks(page_size))
    }
}

fn checked_page_size(page_size: usize) -> Result<usize> {
    if page_size == 0 {
        return Err(Error::InvalidPageSize(0));
    }
    Ok(page_size)
}
