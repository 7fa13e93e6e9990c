//! DriveRegistry - maps drive letters to backends and tracks open handles.

use super::backend::{normalize_path, BackendFile, FsStatus, OpenMode, SeekOrigin, StorageBackend};
use crate::error::{VfsError, VfsResult};

const DRIVE_COUNT: usize = 26;

/// Opaque lease on one open file, valid from `open` until `close`.
///
/// Handles are generation-checked: once closed, a handle can never
/// reach its old resource again even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHandle {
    index: u32,
    generation: u32,
}

struct HandleSlot {
    file: Option<Box<dyn BackendFile>>,
    generation: u32,
}

/// Registry mapping drive letters (A-Z) to storage backends.
///
/// Explicitly owned and passed by reference; there is no process-wide
/// table. Operations on a handle are strictly sequential from a single
/// cooperative caller, so no locking happens at this layer.
#[derive(Default)]
pub struct DriveRegistry {
    drives: [Option<Box<dyn StorageBackend>>; DRIVE_COUNT],
    slots: Vec<HandleSlot>,
    free: Vec<u32>,
    open: usize,
}

impl DriveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under a drive letter.
    ///
    /// Duplicate registration is rejected; `unregister` first to
    /// replace a backend.
    pub fn register(&mut self, letter: char, backend: Box<dyn StorageBackend>) -> VfsResult<()> {
        let idx = drive_index(letter)?;
        if self.drives[idx].is_some() {
            return Err(VfsError::DriveAlreadyRegistered(letter.to_ascii_uppercase()));
        }
        self.drives[idx] = Some(backend);
        Ok(())
    }

    /// Remove a drive's backend. Handles opened on it remain valid
    /// until closed; the backend itself is dropped.
    pub fn unregister(&mut self, letter: char) -> VfsResult<()> {
        let idx = drive_index(letter)?;
        if self.drives[idx].take().is_none() {
            return Err(VfsError::DriveNotRegistered(letter.to_ascii_uppercase()));
        }
        Ok(())
    }

    pub fn is_registered(&self, letter: char) -> bool {
        matches!(drive_index(letter), Ok(idx) if self.drives[idx].is_some())
    }

    /// Whether the drive's backing store is ready. Unregistered drives
    /// are never ready.
    pub fn is_ready(&self, letter: char) -> bool {
        match drive_index(letter) {
            Ok(idx) => self.drives[idx].as_ref().map(|b| b.ready()).unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Open a file on a drive.
    ///
    /// Failure is communicated by the absence of a handle - an
    /// unregistered drive, a bad path and a backend refusal all look
    /// the same to the caller, mirroring the backing store's
    /// null-on-failure contract. Never panics.
    pub fn open(&mut self, letter: char, path: &str, mode: OpenMode) -> Option<FileHandle> {
        let idx = drive_index(letter).ok()?;
        let normalized = normalize_path(path).ok()?;
        let backend = self.drives[idx].as_mut()?;
        let file = backend.open(&normalized, mode).ok()?;
        Some(self.insert(file))
    }

    /// Close a handle. The arena slot is reclaimed even when the
    /// backend's close fails, so a handle never leaks either way.
    pub fn close(&mut self, handle: FileHandle) -> FsStatus {
        match self.take(handle) {
            Some(file) => match file.close() {
                Ok(()) => FsStatus::Ok,
                Err(_) => FsStatus::Unknown,
            },
            None => FsStatus::Unknown,
        }
    }

    /// Read up to `buf.len()` bytes. A short or zero-length read is
    /// `Ok`; `Unknown` means a hard I/O error or a stale handle.
    pub fn read(&mut self, handle: FileHandle, buf: &mut [u8]) -> (usize, FsStatus) {
        match self.file_mut(handle) {
            Some(file) => match file.read(buf) {
                Ok(n) => (n, FsStatus::Ok),
                Err(_) => (0, FsStatus::Unknown),
            },
            None => (0, FsStatus::Unknown),
        }
    }

    /// Write `buf` at the cursor. Short writes are `Ok`, analogous to
    /// `read`.
    pub fn write(&mut self, handle: FileHandle, buf: &[u8]) -> (usize, FsStatus) {
        match self.file_mut(handle) {
            Some(file) => match file.write(buf) {
                Ok(n) => (n, FsStatus::Ok),
                Err(_) => (0, FsStatus::Unknown),
            },
            None => (0, FsStatus::Unknown),
        }
    }

    /// Reposition the cursor. A rejected combination returns `Unknown`
    /// and leaves the cursor where it was.
    pub fn seek(&mut self, handle: FileHandle, offset: i64, origin: SeekOrigin) -> FsStatus {
        match self.file_mut(handle) {
            Some(file) => match file.seek(offset, origin) {
                Ok(()) => FsStatus::Ok,
                Err(_) => FsStatus::Unknown,
            },
            None => FsStatus::Unknown,
        }
    }

    /// Current cursor position.
    pub fn tell(&mut self, handle: FileHandle) -> (u64, FsStatus) {
        match self.file_mut(handle) {
            Some(file) => match file.tell() {
                Ok(pos) => (pos, FsStatus::Ok),
                Err(_) => (0, FsStatus::Unknown),
            },
            None => (0, FsStatus::Unknown),
        }
    }

    /// Number of outstanding handles (resource-leak probe).
    pub fn open_count(&self) -> usize {
        self.open
    }

    /// Close every outstanding handle. Returns how many were closed.
    pub fn shutdown(&mut self) -> usize {
        let mut closed = 0;
        for slot in &mut self.slots {
            if let Some(file) = slot.file.take() {
                slot.generation = slot.generation.wrapping_add(1);
                let _ = file.close();
                closed += 1;
            }
        }
        self.free = (0..self.slots.len() as u32).collect();
        self.open = 0;
        closed
    }

    fn insert(&mut self, file: Box<dyn BackendFile>) -> FileHandle {
        self.open += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.file = Some(file);
            FileHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(HandleSlot {
                file: Some(file),
                generation: 0,
            });
            FileHandle {
                index,
                generation: 0,
            }
        }
    }

    fn take(&mut self, handle: FileHandle) -> Option<Box<dyn BackendFile>> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let file = slot.file.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.open -= 1;
        Some(file)
    }

    // The boxed file is 'static; spelling that out keeps the returned
    // trait object from being shortened to the borrow of self.
    fn file_mut(&mut self, handle: FileHandle) -> Option<&mut (dyn BackendFile + 'static)> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.file.as_deref_mut()
    }
}

/// Convert drive letter to index (A=0 ... Z=25).
fn drive_index(letter: char) -> VfsResult<usize> {
    let upper = letter.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Ok((upper as u8 - b'A') as usize)
    } else {
        Err(VfsError::InvalidDrive(letter))
    }
}

#[cfg(test)]
mod tests {
    use super::super::MemoryBackend;
    use super::*;

    fn registry_with_drive(letter: char) -> DriveRegistry {
        let mut reg = DriveRegistry::new();
        let mem = MemoryBackend::with_files([("hello.txt", b"hello".to_vec())]);
        reg.register(letter, Box::new(mem)).unwrap();
        reg
    }

    #[test]
    fn test_register_rejects_duplicate() {
        let mut reg = registry_with_drive('A');
        let err = reg.register('a', Box::new(MemoryBackend::new())).unwrap_err();
        assert!(matches!(err, VfsError::DriveAlreadyRegistered('A')));
    }

    #[test]
    fn test_register_rejects_non_letter() {
        let mut reg = DriveRegistry::new();
        assert!(reg.register('1', Box::new(MemoryBackend::new())).is_err());
    }

    #[test]
    fn test_unregister() {
        let mut reg = registry_with_drive('A');
        assert!(reg.is_registered('A'));
        reg.unregister('A').unwrap();
        assert!(!reg.is_registered('A'));
        assert!(matches!(
            reg.unregister('A'),
            Err(VfsError::DriveNotRegistered('A'))
        ));
    }

    #[test]
    fn test_is_ready() {
        let reg = registry_with_drive('A');
        assert!(reg.is_ready('A'));
        assert!(reg.is_ready('a')); // case insensitive
        assert!(!reg.is_ready('B')); // unregistered
        assert!(!reg.is_ready('?')); // not a letter
    }

    #[test]
    fn test_open_on_unregistered_drive() {
        let mut reg = registry_with_drive('A');
        assert!(reg.open('B', "hello.txt", OpenMode::Read).is_none());
    }

    #[test]
    fn test_open_rejects_traversal() {
        let mut reg = registry_with_drive('A');
        assert!(reg.open('A', "../hello.txt", OpenMode::Read).is_none());
    }

    #[test]
    fn test_stale_handle_rejected() {
        let mut reg = registry_with_drive('A');
        let h = reg.open('A', "hello.txt", OpenMode::Read).unwrap();
        assert_eq!(reg.close(h), FsStatus::Ok);

        // Every operation on the closed handle fails.
        let mut buf = [0u8; 4];
        assert_eq!(reg.read(h, &mut buf), (0, FsStatus::Unknown));
        assert_eq!(reg.write(h, b"x"), (0, FsStatus::Unknown));
        assert_eq!(reg.seek(h, 0, SeekOrigin::Start), FsStatus::Unknown);
        assert_eq!(reg.tell(h), (0, FsStatus::Unknown));
        assert_eq!(reg.close(h), FsStatus::Unknown);
    }

    #[test]
    fn test_slot_reuse_does_not_revive_old_handle() {
        let mut reg = registry_with_drive('A');
        let h1 = reg.open('A', "hello.txt", OpenMode::Read).unwrap();
        reg.close(h1);

        // The new open reuses the slot under a fresh generation.
        let h2 = reg.open('A', "hello.txt", OpenMode::Read).unwrap();
        assert_ne!(h1, h2);

        let mut buf = [0u8; 4];
        assert_eq!(reg.read(h1, &mut buf), (0, FsStatus::Unknown));
        let (n, res) = reg.read(h2, &mut buf);
        assert_eq!(res, FsStatus::Ok);
        assert_eq!(n, 4);
        reg.close(h2);
    }

    #[test]
    fn test_open_count_and_shutdown() {
        let mut reg = registry_with_drive('A');
        assert_eq!(reg.open_count(), 0);

        let h1 = reg.open('A', "hello.txt", OpenMode::Read).unwrap();
        let _h2 = reg.open('A', "hello.txt", OpenMode::Read).unwrap();
        assert_eq!(reg.open_count(), 2);

        reg.close(h1);
        assert_eq!(reg.open_count(), 1);

        assert_eq!(reg.shutdown(), 1);
        assert_eq!(reg.open_count(), 0);
    }

    #[test]
    fn test_drive_index() {
        assert_eq!(drive_index('A').unwrap(), 0);
        assert_eq!(drive_index('a').unwrap(), 0);
        assert_eq!(drive_index('Z').unwrap(), 25);
        assert!(drive_index('0').is_err());
        assert!(drive_index(' ').is_err());
    }
}
