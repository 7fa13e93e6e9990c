//! Virtual filesystem layer.
//!
//! Layered architecture:
//! - `StorageBackend` / `BackendFile`: capability traits one drive
//!   backend must implement
//! - `DriveRegistry`: drive letters (A-Z) to backends, plus the handle
//!   arena
//! - Backends: local disk, in-memory, read-only asset bundles

mod backend;
mod bundle;
mod local;
mod memory;
mod registry;

pub use backend::{normalize_path, BackendFile, FsStatus, OpenMode, SeekOrigin, StorageBackend};
pub use bundle::{
    load_bundle, load_bundle_from_path, Bundle, BundleBackend, BundleManifest, MANIFEST_NAME,
};
pub use local::LocalBackend;
pub use memory::MemoryBackend;
pub use registry::{DriveRegistry, FileHandle};
