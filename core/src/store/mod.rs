//! store/mod.rs
//! Raw access to the kernelspace framestore.
//!
//! Responsibilities:
//! - Whole-file reads/writes of the small metadata pseudo-files
//! - Positioned reads/writes against the arena
//!
//! Non-responsibilities:
//! - Layout (offsets, widths, byte order)
//! - Validation

use std::io;

use bytes::Bytes;

use crate::layout::{MetaBlobs, MetaFile};

pub mod debugfs;
pub mod memory;

pub use debugfs::DebugfsStore;
pub use memory::MemoryStore;

/// Byte-addressable framestore backend.
///
/// Callers serialize access: one conversion in flight per arena.
pub trait RawIo {
    /// Read a metadata pseudo-file in full.
    fn read_meta(&mut self, file: MetaFile) -> io::Result<Vec<u8>>;

    /// Replace the contents of a metadata pseudo-file.
    fn write_meta(&mut self, file: MetaFile, data: &[u8]) -> io::Result<()>;

    /// Read exactly `len` bytes of the arena starting at `offset`.
    fn read_arena(&mut self, offset: u64, len: usize) -> io::Result<Bytes>;

    /// Write `data` into the arena starting at `offset`.
    fn write_arena(&mut self, offset: u64, data: &[u8]) -> io::Result<()>;

    /// Fixed size of the arena in bytes.
    fn arena_capacity(&self) -> u64;
}

impl<T: RawIo + ?Sized> RawIo for &mut T {
    fn read_meta(&mut self, file: MetaFile) -> io::Result<Vec<u8>> {
        (**self).read_meta(file)
    }

    fn write_meta(&mut self, file: MetaFile, data: &[u8]) -> io::Result<()> {
        (**self).write_meta(file, data)
    }

    fn read_arena(&mut self, offset: u64, len: usize) -> io::Result<Bytes> {
        (**self).read_arena(offset, len)
    }

    fn write_arena(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        (**self).write_arena(offset, data)
    }

    fn arena_capacity(&self) -> u64 {
        (**self).arena_capacity()
    }
}

/// Read all six metadata pseudo-files.
pub fn read_blobs<S: RawIo + ?Sized>(store: &mut S) -> io::Result<MetaBlobs> {
    let mut blobs = MetaBlobs::default();
    for file in MetaFile::ALL {
        *blobs.get_mut(file) = store.read_meta(file)?;
    }
    Ok(blobs)
}

/// Write all six metadata pseudo-files, count first.
pub fn write_blobs<S: RawIo + ?Sized>(store: &mut S, blobs: &MetaBlobs) -> io::Result<()> {
    for (file, data) in blobs.iter() {
        store.write_meta(file, data)?;
    }
    Ok(())
}

/// Error for positioned access outside the arena.
pub(crate) fn out_of_arena(offset: u64, len: usize, capacity: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("arena access {}..{} outside capacity {}", offset, offset + len as u64, capacity),
    )
}
