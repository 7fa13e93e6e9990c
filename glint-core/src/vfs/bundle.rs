//! Read-only asset bundles: ZIP archives with an optional JSON manifest.
//!
//! Bundles are how a UI ships fonts and images: a ZIP file whose
//! entries become drive-relative paths, plus an optional `bundle.json`
//! manifest describing the bundle and the files it promises to carry.

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use zip::ZipArchive;

use super::backend::{BackendFile, OpenMode, SeekOrigin, StorageBackend};
use crate::error::{VfsError, VfsResult};

/// Manifest filename at the archive root.
pub const MANIFEST_NAME: &str = "bundle.json";

/// Manifest schema (`bundle.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleManifest {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Paths the bundle promises to contain; checked at load time.
    #[serde(default)]
    pub files: Vec<String>,
}

/// One loaded bundle: manifest plus fully decompressed entries.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub manifest: BundleManifest,
    pub files: HashMap<String, Vec<u8>>,
}

/// Load a bundle from a ZIP file on disk. The file stem names the
/// bundle when no manifest is present.
pub fn load_bundle_from_path(path: &Path) -> VfsResult<Bundle> {
    let fallback = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("bundle")
        .to_string();
    let file = std::fs::File::open(path)?;
    load_bundle(file, &fallback)
}

/// Load a bundle from any seekable reader.
pub fn load_bundle<R: Read + Seek>(reader: R, fallback_name: &str) -> VfsResult<Bundle> {
    let mut archive = ZipArchive::new(reader)?;
    let mut files = HashMap::new();
    let mut manifest: Option<BundleManifest> = None;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().trim_start_matches('/').to_string();
        // The declared size comes from the archive header, so it is
        // not trusted as an allocation hint.
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;

        if name == MANIFEST_NAME {
            manifest = Some(serde_json::from_slice(&data)?);
        } else {
            files.insert(name, data);
        }
    }

    let manifest = manifest.unwrap_or_else(|| BundleManifest {
        name: fallback_name.to_string(),
        version: None,
        files: Vec::new(),
    });

    for promised in &manifest.files {
        if !files.contains_key(promised) {
            return Err(VfsError::Bundle(format!(
                "missing file listed in manifest: {}",
                promised
            )));
        }
    }

    Ok(Bundle { manifest, files })
}

/// Read-only backend serving entries from loaded bundles.
///
/// Later bundles shadow earlier ones on name collisions. Opens are
/// Read only; write modes are refused.
#[derive(Default)]
pub struct BundleBackend {
    files: HashMap<String, Arc<Vec<u8>>>,
}

impl BundleBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bundles(bundles: Vec<Bundle>) -> Self {
        let mut backend = Self::new();
        for bundle in bundles {
            backend.add_bundle(bundle);
        }
        backend
    }

    pub fn add_bundle(&mut self, bundle: Bundle) {
        for (name, data) in bundle.files {
            self.files.insert(name, Arc::new(data));
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

impl StorageBackend for BundleBackend {
    fn open(&mut self, path: &str, mode: OpenMode) -> VfsResult<Box<dyn BackendFile>> {
        if mode != OpenMode::Read {
            return Err(VfsError::NotWritable);
        }
        let data = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| VfsError::FileNotFound(path.to_string()))?;
        Ok(Box::new(BundleFile { data, pos: 0 }))
    }
}

struct BundleFile {
    data: Arc<Vec<u8>>,
    pos: u64,
}

impl BackendFile for BundleFile {
    fn read(&mut self, buf: &mut [u8]) -> VfsResult<usize> {
        let start = usize::try_from(self.pos).unwrap_or(usize::MAX).min(self.data.len());
        let n = (self.data.len() - start).min(buf.len());
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }

    fn write(&mut self, _buf: &[u8]) -> VfsResult<usize> {
        Err(VfsError::NotWritable)
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> VfsResult<()> {
        let base = match origin {
            SeekOrigin::Start => 0,
            SeekOrigin::Current => self.pos as i64,
            SeekOrigin::End => self.data.len() as i64,
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write as _;
    use zip::write::SimpleFileOptions;

    fn zip_with(entries: &[(&str, &[u8])]) -> Cursor<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            for (name, data) in entries {
                writer
                    .start_file(name.to_string(), SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(data).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn test_load_bundle_without_manifest() {
        let zip = zip_with(&[("fonts/mono.bin", b"xyz")]);
        let bundle = load_bundle(zip, "ui").unwrap();
        assert_eq!(bundle.manifest.name, "ui");
        assert_eq!(bundle.files["fonts/mono.bin"], b"xyz");
    }

    #[test]
    fn test_load_bundle_with_manifest() {
        let manifest = br#"{"name":"theme","version":"1.0","files":["logo.bin"]}"#;
        let zip = zip_with(&[("bundle.json", manifest), ("logo.bin", &[1, 2])]);
        let bundle = load_bundle(zip, "fallback").unwrap();
        assert_eq!(bundle.manifest.name, "theme");
        assert_eq!(bundle.manifest.version.as_deref(), Some("1.0"));
        assert!(bundle.files.contains_key("logo.bin"));
        assert!(!bundle.files.contains_key("bundle.json"));
    }

    #[test]
    fn test_manifest_missing_file_rejected() {
        let manifest = br#"{"name":"theme","files":["absent.bin"]}"#;
        let zip = zip_with(&[("bundle.json", manifest)]);
        assert!(matches!(
            load_bundle(zip, "x"),
            Err(VfsError::Bundle(_))
        ));
    }

    #[test]
    fn test_backend_is_read_only() {
        let zip = zip_with(&[("a.bin", &[1u8, 2, 3])]);
        let bundle = load_bundle(zip, "x").unwrap();
        let mut backend = BundleBackend::from_bundles(vec![bundle]);

        assert!(backend.open("a.bin", OpenMode::Write).is_err());
        assert!(backend.open("a.bin", OpenMode::ReadWrite).is_err());

        let mut f = backend.open("a.bin", OpenMode::Read).unwrap();
        assert!(f.write(&[9]).is_err());

        let mut buf = [0u8; 8];
        assert_eq!(f.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        f.close().unwrap();
    }

    #[test]
    fn test_later_bundle_shadows_earlier() {
        let first = load_bundle(zip_with(&[("a.bin", b"old")]), "first").unwrap();
        let second = load_bundle(zip_with(&[("a.bin", b"new")]), "second").unwrap();
        let mut backend = BundleBackend::from_bundles(vec![first, second]);

        let mut f = backend.open("a.bin", OpenMode::Read).unwrap();
        let mut buf = [0u8; 8];
        let n = f.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"new");
    }
}
