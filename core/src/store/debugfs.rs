//! store/debugfs.rs
//! Framestore backed by the driver's debugfs directory.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::constants::FDATA_MAX;
use crate::layout::{MetaFile, ARENA_FILE};
use crate::store::{out_of_arena, RawIo};

#[derive(Debug)]
pub struct DebugfsStore {
    dir: PathBuf,
    capacity: u64,
    arena: Option<File>,
}

impl DebugfsStore {
    /// Open a framestore directory. The arena itself is opened on first access.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("framestore directory {} not found", dir.display()),
            ));
        }
        Ok(Self { dir, capacity: FDATA_MAX, arena: None })
    }

    /// Override the arena capacity (the driver's `SIZE_FDATA`).
    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn meta_path(&self, file: MetaFile) -> PathBuf {
        self.dir.join(file.file_name())
    }

    fn arena(&mut self) -> io::Result<&mut File> {
        if self.arena.is_none() {
            // Never truncate: the arena is a fixed-size driver buffer.
            let f = OpenOptions::new()
                .read(true)
                .write(true)
                .open(self.dir.join(ARENA_FILE))?;
            self.arena = Some(f);
        }
        match self.arena.as_mut() {
            Some(f) => Ok(f),
            None => Err(io::Error::new(io::ErrorKind::Other, "arena handle unavailable")),
        }
    }

    fn check_range(&self, offset: u64, len: usize) -> io::Result<()> {
        if offset + len as u64 > self.capacity {
            return Err(out_of_arena(offset, len, self.capacity));
        }
        Ok(())
    }
}

impl RawIo for DebugfsStore {
    fn read_meta(&mut self, file: MetaFile) -> io::Result<Vec<u8>> {
        fs::read(self.meta_path(file))
    }

    fn write_meta(&mut self, file: MetaFile, data: &[u8]) -> io::Result<()> {
        let mut f = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.meta_path(file))?;
        f.write_all(data)?;
        f.flush()
    }

    fn read_arena(&mut self, offset: u64, len: usize) -> io::Result<Bytes> {
        self.check_range(offset, len)?;
        let f = self.arena()?;
        f.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; len];
        f.read_exact(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    fn write_arena(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        self.check_range(offset, data.len())?;
        let f = self.arena()?;
        f.seek(SeekFrom::Start(offset))?;
        f.write_all(data)?;
        f.flush()
    }

    fn arena_capacity(&self) -> u64 {
        self.capacity
    }
}
