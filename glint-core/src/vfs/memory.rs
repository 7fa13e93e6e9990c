//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::backend::{BackendFile, OpenMode, SeekOrigin, StorageBackend};
use crate::error::{VfsError, VfsResult};

type SharedStore = Arc<RwLock<HashMap<String, Vec<u8>>>>;

/// Upper bound on one in-memory file. A write that would grow a file
/// past this fails instead of exhausting memory.
const MAX_FILE_LEN: usize = 1 << 30;

/// In-memory backend.
///
/// The store is shared with every file opened from it, so data written
/// through one handle is visible to later opens. Clone is cheap (just
/// clones the Arc).
#[derive(Default, Clone)]
pub struct MemoryBackend {
    store: SharedStore,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with initial files.
    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let files = files
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v))
            .collect();
        Self {
            store: Arc::new(RwLock::new(files)),
        }
    }

    /// Insert a file directly into the store.
    pub fn add_file(&self, path: &str, data: impl Into<Vec<u8>>) {
        if let Ok(mut store) = self.store.write() {
            store.insert(path.to_string(), data.into());
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.store
            .read()
            .map(|s| s.contains_key(path))
            .unwrap_or(false)
    }
}

impl StorageBackend for MemoryBackend {
    fn open(&mut self, path: &str, mode: OpenMode) -> VfsResult<Box<dyn BackendFile>> {
        let mut store = self.store.write().map_err(|_| VfsError::LockPoisoned)?;
        match mode {
            OpenMode::Read => {
                if !store.contains_key(path) {
                    return Err(VfsError::FileNotFound(path.to_string()));
                }
            }
            // Write modes truncate, creating the file if missing.
            OpenMode::Write | OpenMode::ReadWrite => {
                store.insert(path.to_string(), Vec::new());
            }
        }
        drop(store);

        Ok(Box::new(MemoryFile {
            store: Arc::clone(&self.store),
            path: path.to_string(),
            pos: 0,
            mode,
        }))
    }
}

struct MemoryFile {
    store: SharedStore,
    path: String,
    pos: u64,
    mode: OpenMode,
}

impl MemoryFile {
    fn len(&self) -> VfsResult<u64> {
        let store = self.store.read().map_err(|_| VfsError::LockPoisoned)?;
        Ok(store.get(&self.path).map(|d| d.len() as u64).unwrap_or(0))
    }
}

impl BackendFile for MemoryFile {
    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize> {
        if self.mode == OpenMode::Write {
            return Err(VfsError::NotReadable);
        }
        let store = self.store.read().map_err(|_| VfsError::LockPoisoned)?;
        let data = store
            .get(&self.path)
            .ok_or_else(|| VfsError::FileNotFound(self.path.clone()))?;

        let start = usize::try_from(self.pos).unwrap_or(usize::MAX).min(data.len());
        let n = (data.len() - start).min(buf.len());
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> VfsResult<usize> {
        if self.mode == OpenMode::Read {
            return Err(VfsError::NotWritable);
        }
        // The cursor may sit anywhere after a seek; it is the write
        // that must land inside the size cap, without overflow.
        let start = usize::try_from(self.pos).map_err(|_| VfsError::SeekOutOfRange)?;
        let end = start
            .checked_add(buf.len())
            .filter(|e| *e <= MAX_FILE_LEN)
            .ok_or(VfsError::SeekOutOfRange)?;

        let mut store = self.store.write().map_err(|_| VfsError::LockPoisoned)?;
        let data = store.entry(self.path.clone()).or_default();
        if end > data.len() {
            // A gap left by a seek past the end fills with zeros.
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> VfsResult<()> {
        let base = match origin {
            SeekOrigin::Start => 0,
            SeekOrigin::Current => self.pos as i64,
            SeekOrigin::End => self.len()? as i64,
        };
        let target = base
            .checked_add(offset)
            .filter(|p| *p >= 0)
            .ok_or(VfsError::SeekOutOfRange)?;
        self.pos = target as u64;
        Ok(())
    }

    fn tell(&mut self) -> VfsResult<u64> {
        Ok(self.pos)
    }

    fn close(self: Box<Self>) -> VfsResult<()> {
        Ok(())
    }
}
