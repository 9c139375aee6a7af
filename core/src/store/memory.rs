//! store/memory.rs
//! In-memory framestore.
//!
//! The arena grows on demand up to its fixed capacity; unwritten bytes read
//! back as zero. With `with_fixed_blobs` the metadata files behave like the
//! driver's debugfs blobs: fixed size, writes overlay a prefix and the old
//! tail survives.

use std::collections::HashMap;
use std::io;

use bytes::Bytes;

use crate::constants::{N_FRAMES_MAX, N_SEGMS_MAX};
use crate::layout::MetaFile;
use crate::store::{out_of_arena, RawIo};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    capacity: u64,
    arena: Vec<u8>,
    meta: HashMap<MetaFile, Vec<u8>>,
    fixed_blobs: bool,
}

impl MemoryStore {
    pub fn new(capacity: u64) -> Self {
        Self { capacity, ..Default::default() }
    }

    /// Emulate driver blobs: every array pre-sized and zero-filled.
    pub fn with_fixed_blobs(mut self) -> Self {
        self.fixed_blobs = true;
        for file in MetaFile::ALL {
            if let Some(size) = Self::blob_size(file) {
                self.meta.insert(file, vec![0u8; size]);
            }
        }
        self.meta.insert(MetaFile::SegmentCount, b"0\n".to_vec());
        self
    }

    /// Size of the driver blob behind `file`; `None` for the scalar.
    pub fn blob_size(file: MetaFile) -> Option<usize> {
        match file {
            MetaFile::SegmentCount => None,
            MetaFile::FrameSizes => Some(N_FRAMES_MAX * 4),
            other => other.element_width().map(|w| w * N_SEGMS_MAX),
        }
    }

    pub fn meta(&self, file: MetaFile) -> Option<&[u8]> {
        self.meta.get(&file).map(Vec::as_slice)
    }

    pub fn set_meta(&mut self, file: MetaFile, data: Vec<u8>) {
        self.meta.insert(file, data);
    }

    /// Bytes written so far (the arena's high-water mark).
    pub fn arena(&self) -> &[u8] {
        &self.arena
    }

    fn check_range(&self, offset: u64, len: usize) -> io::Result<()> {
        if offset + len as u64 > self.capacity {
            return Err(out_of_arena(offset, len, self.capacity));
        }
        Ok(())
    }
}

impl RawIo for MemoryStore {
    fn read_meta(&mut self, file: MetaFile) -> io::Result<Vec<u8>> {
        self.meta.get(&file).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not present", file))
        })
    }

    fn write_meta(&mut self, file: MetaFile, data: &[u8]) -> io::Result<()> {
        match (self.fixed_blobs, Self::blob_size(file)) {
            (true, Some(size)) => {
                if data.len() > size {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("{}: {} bytes exceed blob size {}", file, data.len(), size),
                    ));
                }
                let blob = self.meta.entry(file).or_insert_with(|| vec![0u8; size]);
                blob[..data.len()].copy_from_slice(data);
            }
            _ => {
                self.meta.insert(file, data.to_vec());
            }
        }
        Ok(())
    }

    fn read_arena(&mut self, offset: u64, len: usize) -> io::Result<Bytes> {
        self.check_range(offset, len)?;
        let start = offset as usize;
        let mut buf = vec![0u8; len];
        if start < self.arena.len() {
            let end = (start + len).min(self.arena.len());
            buf[..end - start].copy_from_slice(&self.arena[start..end]);
        }
        Ok(Bytes::from(buf))
    }

    fn write_arena(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        self.check_range(offset, data.len())?;
        let start = offset as usize;
        let end = start + data.len();
        if self.arena.len() < end {
            self.arena.resize(end, 0);
        }
        self.arena[start..end].copy_from_slice(data);
        Ok(())
    }

    fn arena_capacity(&self) -> u64 {
        self.capacity
    }
}
