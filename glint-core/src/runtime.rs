//! Runtime - composes the display pipeline with the VFS layer.

use crate::display::{Display, DisplayConfig};
use crate::vfs::{DriveRegistry, FsStatus, OpenMode};

/// The single cooperative context the toolkit drives from its tick
/// loop: owns the display driver and the drive registry.
pub struct Runtime {
    pub display: Display,
    pub vfs: DriveRegistry,
}

impl Runtime {
    pub fn new(config: DisplayConfig) -> Self {
        Self {
            display: Display::new(config),
            vfs: DriveRegistry::new(),
        }
    }

    /// Advance timing; true when the next frame is due.
    pub fn step(&mut self, elapsed_ms: u32) -> bool {
        self.display.tick(elapsed_ms)
    }

    /// Open, read to end, close - the asset-load flow the toolkit
    /// performs mid-render. None on any failure; a missed asset must
    /// not disturb the render loop, and the handle never leaks.
    pub fn load_asset(&mut self, drive: char, path: &str) -> Option<Vec<u8>> {
        let handle = self.vfs.open(drive, path, OpenMode::Read)?;
        let mut data = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let (n, status) = self.vfs.read(handle, &mut chunk);
            if status != FsStatus::Ok {
                self.vfs.close(handle);
                return None;
            }
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);
        }
        self.vfs.close(handle);
        Some(data)
    }

    /// Explicit teardown: closes every outstanding handle.
    pub fn shutdown(&mut self) {
        self.vfs.shutdown();
    }
}
