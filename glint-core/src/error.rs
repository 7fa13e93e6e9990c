//! Error types for the graphics runtime.

use thiserror::Error;

/// Errors that can occur inside the VFS layer.
///
/// These stay internal to the backends and the registry; the
/// toolkit-facing surface collapses them to [`crate::vfs::FsStatus`].
#[derive(Error, Debug)]
pub enum VfsError {
    #[error("Invalid drive: {0}")]
    InvalidDrive(char),

    #[error("Drive not registered: {0}")]
    DriveNotRegistered(char),

    #[error("Drive already registered: {0}")]
    DriveAlreadyRegistered(char),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("File not open for reading")]
    NotReadable,

    #[error("File not open for writing")]
    NotWritable,

    #[error("Seek out of range")]
    SeekOutOfRange,

    #[error("Lock poisoned")]
    LockPoisoned,

    #[error("Bundle error: {0}")]
    Bundle(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for VFS operations.
pub type VfsResult<T> = Result<T, VfsError>;
