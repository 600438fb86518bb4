//! Addressable handles for media embedded in an archive.
//!
//! The host environment decides what a handle is (a browser object URL, a
//! temp file, a `data:` URI). The engine only registers assets and later
//! releases the handles it was given.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// An addressable reference to a registered asset, e.g. a URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AssetHandle(pub String);

impl AssetHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Registration/cleanup pair implemented by the host environment.
pub trait ResourceTracker: Send {
    /// Register an asset and return an addressable handle for it.
    fn register(&mut self, path: &str, data: &[u8], mime_type: &str) -> AssetHandle;

    /// Release a handle previously returned by [`register`](Self::register).
    fn release(&mut self, handle: &AssetHandle);
}

impl<T: ResourceTracker + ?Sized> ResourceTracker for Box<T> {
    fn register(&mut self, path: &str, data: &[u8], mime_type: &str) -> AssetHandle {
        (**self).register(path, data, mime_type)
    }

    fn release(&mut self, handle: &AssetHandle) {
        (**self).release(handle)
    }
}

/// Tracker that inlines every asset as a base64 `data:` URI.
///
/// Nothing needs freeing, so `release` only keeps the live count honest.
#[derive(Debug, Default)]
pub struct DataUriTracker {
    live: usize,
}

impl DataUriTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles registered and not yet released.
    pub fn live(&self) -> usize {
        self.live
    }
}

impl ResourceTracker for DataUriTracker {
    fn register(&mut self, _path: &str, data: &[u8], mime_type: &str) -> AssetHandle {
        self.live += 1;
        AssetHandle(format!("data:{};base64,{}", mime_type, STANDARD.encode(data)))
    }

    fn release(&mut self, _handle: &AssetHandle) {
        self.live = self.live.saturating_sub(1);
    }
}
