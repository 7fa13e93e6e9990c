//! Minimal embedded graphics runtime core.
//!
//! This crate provides two pieces:
//! - A double-buffered display pipeline with an exactly-once flush
//!   handshake and a periodic tick clock
//! - A pluggable virtual filesystem behind single-letter drives, so
//!   the toolkit can load assets without knowing the storage medium
//!
//! # Architecture
//!
//! The layers are:
//! - `StorageBackend` / `BackendFile` traits: the capability set one
//!   drive backend must implement
//! - `DriveRegistry`: drive letters (A-Z) to backends, with a
//!   generation-checked handle arena
//! - `DisplaySink` trait + `Display`: buffer swapping and flush
//!   acknowledgement
//! - `Runtime`: the composition the toolkit's tick loop drives

pub mod display;
pub mod error;
pub mod runtime;
pub mod vfs;

pub use display::{
    Display, DisplayConfig, DisplaySink, HeadlessSink, Pixel, Rect, DEFAULT_REFRESH_PERIOD_MS,
};
pub use error::{VfsError, VfsResult};
pub use runtime::Runtime;
pub use vfs::{
    load_bundle, load_bundle_from_path, normalize_path, BackendFile, Bundle, BundleBackend,
    BundleManifest, DriveRegistry, FileHandle, FsStatus, LocalBackend, MemoryBackend, OpenMode,
    SeekOrigin, StorageBackend,
};
