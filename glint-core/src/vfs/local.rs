//! Local-disk storage backend rooted at a fixed directory.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::backend::{BackendFile, OpenMode, SeekOrigin, StorageBackend};
use crate::error::{VfsError, VfsResult};

/// Backend serving files from a directory on the local filesystem.
///
/// Every path handed to `open` is resolved under the mount root, which
/// is fixed at construction time.
pub struct LocalBackend {
    root: PathBuf,
}

impl LocalBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Translate an abstract open mode to `OpenOptions`.
///
/// Write modes truncate and create, matching the classic
/// "rb" / "wb" / "w+" table. The match is exhaustive; there is no
/// fallback mode.
fn open_options(mode: OpenMode) -> OpenOptions {
    let mut opts = OpenOptions::new();
    match mode {
        OpenMode::Read => {
            opts.read(true);
        }
        OpenMode::Write => {
            opts.write(true).create(true).truncate(true);
        }
        OpenMode::ReadWrite => {
            opts.read(true).write(true).create(true).truncate(true);
        }
    }
    opts
}

impl StorageBackend for LocalBackend {
    fn ready(&self) -> bool {
        self.root.is_dir()
    }

    fn open(&mut self, path: &str, mode: OpenMode) -> VfsResult<Box<dyn BackendFile>> {
        let full = self.root.join(path);
        if mode != OpenMode::Read {
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = open_options(mode).open(full)?;
        Ok(Box::new(LocalFile { file, mode }))
    }
}

struct LocalFile {
    file: File,
    mode: OpenMode,
}

impl BackendFile for LocalFile {
    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize> {
        if self.mode == OpenMode::Write {
            return Err(VfsError::NotReadable);
        }
        Ok(self.file.read(buf)?)
    }

    fn write(&mut self, buf: &[u8]) -> VfsResult<usize> {
        if self.mode == OpenMode::Read {
            return Err(VfsError::NotWritable);
        }
        Ok(self.file.write(buf)?)
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> VfsResult<()> {
        let whence = match origin {
            SeekOrigin::Start => {
                SeekFrom::Start(u64::try_from(offset).map_err(|_| VfsError::SeekOutOfRange)?)
            }
            SeekOrigin::Current => SeekFrom::Current(offset),
            SeekOrigin::End => SeekFrom::End(offset),
        };
        self.file.seek(whence)?;
        Ok(())
    }

    fn tell(&mut self) -> VfsResult<u64> {
        Ok(self.file.stream_position()?)
    }

    fn close(self: Box<Self>) -> VfsResult<()> {
        if self.mode != OpenMode::Read {
            self.file.sync_all()?;
        }
        Ok(())
    }
}
