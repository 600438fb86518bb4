//! KMZ archive reading and asset reference resolution.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use percent_encoding::percent_decode_str;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::assets::{AssetHandle, ResourceTracker};
use crate::error::Result;
use crate::util::detect_media_format;

/// One entry of an archive, fully extracted.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Original path inside the archive.
    pub name: String,
    pub is_dir: bool,
    pub data: Vec<u8>,
}

/// Archive entries split into markup documents and embedded assets.
#[derive(Debug, Default)]
pub struct ArchiveContents {
    /// Entries whose name ends in the document extension, in archive order.
    pub documents: Vec<ArchiveEntry>,
    /// Every other non-directory entry.
    pub assets: Vec<ArchiveEntry>,
}

/// Enumerate and extract every non-directory entry of a ZIP archive.
///
/// Entries ending in `document_ext` (case-insensitive) are documents; the
/// rest are assets. An entry that fails to decompress is skipped. Only an
/// unreadable central directory fails the whole archive.
pub fn read_archive(data: &[u8], document_ext: &str) -> Result<ArchiveContents> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let mut contents = ArchiveContents::default();
    let ext = document_ext.to_ascii_lowercase();

    for i in 0..archive.len() {
        let mut file = match archive.by_index(i) {
            Ok(file) => file,
            Err(e) => {
                warn!("Skipping unreadable archive entry {}: {}", i, e);
                continue;
            }
        };

        if file.is_dir() {
            continue;
        }

        let name = file.name().to_string();
        // Declared sizes are untrusted; an entry never inflates the buffer
        // beyond the archive's own length up front.
        let capacity = file.size().min(data.len() as u64) as usize;
        let mut bytes = Vec::with_capacity(capacity);
        if let Err(e) = file.read_to_end(&mut bytes) {
            warn!("Skipping archive entry {}: {}", name, e);
            continue;
        }

        let entry = ArchiveEntry {
            is_dir: false,
            data: bytes,
            name,
        };
        if entry.name.to_ascii_lowercase().ends_with(&ext) {
            contents.documents.push(entry);
        } else {
            contents.assets.push(entry);
        }
    }

    debug!(
        "Archive has {} documents and {} assets",
        contents.documents.len(),
        contents.assets.len()
    );
    Ok(contents)
}

/// Maps reference strings found in documents to registered asset handles.
///
/// Each asset is indexed under four keys: its normalized path, the
/// lowercased path, its basename and the lowercased basename. Lookup tries
/// the same four candidates in that order, so `Files/Icon.PNG`,
/// `./files/icon.png` and `icon.png` all reach the same asset.
#[derive(Debug, Default)]
pub struct AssetResolver {
    keys: HashMap<String, usize>,
    handles: Vec<AssetHandle>,
}

impl AssetResolver {
    /// Register every asset with `tracker` and index the returned handles.
    ///
    /// When two assets share a key, the first one in archive order keeps it.
    pub fn build(assets: &[ArchiveEntry], tracker: &mut dyn ResourceTracker) -> Self {
        let mut resolver = Self::default();

        for asset in assets {
            let mime = detect_media_format(&asset.name, &asset.data).mime_type();
            let handle = tracker.register(&asset.name, &asset.data, mime);
            let index = resolver.handles.len();
            resolver.handles.push(handle);

            for key in candidate_keys(&normalize_path(&asset.name)) {
                resolver.keys.entry(key).or_insert(index);
            }
        }

        resolver
    }

    /// Resolve a reference to a handle, or `None` if nothing matches or the
    /// reference cannot be percent-decoded.
    pub fn resolve(&self, reference: &str) -> Option<&AssetHandle> {
        let decoded = percent_decode_str(reference).decode_utf8().ok()?;
        let normalized = normalize_path(&decoded);
        let normalized = normalized.strip_prefix("./").unwrap_or(&normalized);

        candidate_keys(normalized)
            .into_iter()
            .find_map(|key| self.keys.get(&key))
            .map(|&index| &self.handles[index])
    }

    /// Every handle registered while building this resolver.
    pub fn handles(&self) -> &[AssetHandle] {
        &self.handles
    }

    /// Give up ownership of the registered handles.
    pub fn into_handles(self) -> Vec<AssetHandle> {
        self.handles
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Full path, lowercase path, basename, lowercase basename.
fn candidate_keys(path: &str) -> [String; 4] {
    let base = path.rsplit('/').next().unwrap_or(path);
    [
        path.to_string(),
        path.to_lowercase(),
        base.to_string(),
        base.to_lowercase(),
    ]
}
