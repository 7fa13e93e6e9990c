//! StorageBackend trait - the capability set a drive backend must implement.

use crate::error::{VfsError, VfsResult};

/// Abstract open mode, independent of any backend's native vocabulary.
///
/// Each backend translates these with an exhaustive match; there is no
/// fallback mode, so an unsupported combination cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read only; the file must exist.
    Read,
    /// Write only; truncates, creating the file if missing.
    Write,
    /// Read and write; truncates, creating the file if missing.
    ReadWrite,
}

/// Abstract seek origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    Start,
    Current,
    End,
}

/// Toolkit-facing operation status.
///
/// Deliberately two-valued: richer causes (not-found, permission,
/// disk-full) are collapsed to `Unknown` at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsStatus {
    Ok,
    Unknown,
}

/// One open file on a backend.
///
/// A short read or write (fewer bytes than requested, including zero at
/// end-of-stream) is a normal outcome and is reported as `Ok(count)`.
/// Only hard I/O failures are reported as `Err`.
pub trait BackendFile: Send {
    /// Read up to `buf.len()` bytes from the cursor position.
    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize>;

    /// Write `buf` at the cursor position.
    fn write(&mut self, buf: &[u8]) -> VfsResult<usize>;

    /// Reposition the cursor. A rejected offset/origin combination
    /// leaves the cursor unchanged.
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> VfsResult<()>;

    /// Current cursor position.
    fn tell(&mut self) -> VfsResult<u64>;

    /// Release the underlying resource. Consumes the file, so exactly
    /// one close per successful open.
    fn close(self: Box<Self>) -> VfsResult<()>;
}

/// Capability set for one registered drive (A-Z).
pub trait StorageBackend: Send {
    /// Whether the backing store is ready for use. Always-mounted
    /// stores keep the default.
    fn ready(&self) -> bool {
        true
    }

    /// Open a drive-relative path. The registry normalizes the path
    /// before it reaches the backend.
    fn open(&mut self, path: &str, mode: OpenMode) -> VfsResult<Box<dyn BackendFile>>;
}

/// Normalize a drive-relative path.
///
/// - Converts `\` to `/` and collapses repeated separators
/// - Strips `.` components
/// - Rejects empty paths, absolute paths and any `..` component, so a
///   backend's mount root cannot be escaped
///
/// # Examples
/// ```
/// use glint_core::normalize_path;
/// assert_eq!(normalize_path("images//logo.bin").unwrap(), "images/logo.bin");
/// assert_eq!(normalize_path("./a/./b").unwrap(), "a/b");
/// assert!(normalize_path("../etc/passwd").is_err());
/// ```
pub fn normalize_path(path: &str) -> VfsResult<String> {
    let trimmed = path.trim();
    if trimmed.starts_with('/') || trimmed.starts_with('\\') {
        return Err(VfsError::InvalidPath(path.to_string()));
    }

    let mut parts = Vec::new();
    for part in trimmed.split(['/', '\\']) {
        match part {
            "" | "." => continue,
            ".." => return Err(VfsError::InvalidPath(path.to_string())),
            p => parts.push(p),
        }
    }

    if parts.is_empty() {
        return Err(VfsError::InvalidPath(path.to_string()));
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_plain() {
        assert_eq!(normalize_path("logo.bin").unwrap(), "logo.bin");
        assert_eq!(normalize_path("images/logo.bin").unwrap(), "images/logo.bin");
    }

    #[test]
    fn test_normalize_separators() {
        assert_eq!(normalize_path("images//logo.bin").unwrap(), "images/logo.bin");
        assert_eq!(normalize_path("images\\logo.bin").unwrap(), "images/logo.bin");
        assert_eq!(normalize_path("./images/./logo.bin").unwrap(), "images/logo.bin");
    }

    #[test]
    fn test_normalize_rejects_traversal() {
        assert!(normalize_path("../secret").is_err());
        assert!(normalize_path("images/../../secret").is_err());
    }

    #[test]
    fn test_normalize_rejects_absolute() {
        assert!(normalize_path("/etc/passwd").is_err());
        assert!(normalize_path("\\windows").is_err());
    }

    #[test]
    fn test_normalize_rejects_empty() {
        assert!(normalize_path("").is_err());
        assert!(normalize_path("./.").is_err());
    }
}
