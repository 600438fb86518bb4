//! The extraction pipeline: sniff, read, parse, style, extract, bound.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::archive::{AssetResolver, read_archive};
use crate::assets::{AssetHandle, DataUriTracker, ResourceTracker};
use crate::error::{Error, Result};
use crate::extract::{ExtractContext, extract_features};
use crate::kml::KmlDocument;
use crate::model::{BoundingRegion, Feature, Overlay};
use crate::style::{StyleCatalog, StylePolicy};
use crate::util::{decode_markup, is_archive};

/// Runs one input through the whole pipeline.
///
/// Archives (KMZ) keep their embedded styling; a single markup document
/// (KML) is always drawn with the uniform default style.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    policy: StylePolicy,
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: StylePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &StylePolicy {
        &self.policy
    }

    /// Extract an overlay from raw bytes.
    ///
    /// Assets found in an archive are registered with `tracker`; their
    /// handles are returned in [`Overlay::assets`]. If the run fails after
    /// registering assets, those handles are released before returning.
    pub fn process(&self, data: &[u8], tracker: &mut dyn ResourceTracker) -> Result<Overlay> {
        let (features, assets) = if is_archive(data) {
            self.process_archive(data, tracker)?
        } else {
            (self.process_document(data)?, Vec::new())
        };

        if features.is_empty() {
            for handle in &assets {
                tracker.release(handle);
            }
            return Err(Error::NoGeometry);
        }

        let bounds = BoundingRegion::from_features(&features);
        info!("Extracted {} features", features.len());

        Ok(Overlay {
            features,
            bounds,
            assets,
        })
    }

    fn process_archive(
        &self,
        data: &[u8],
        tracker: &mut dyn ResourceTracker,
    ) -> Result<(Vec<Feature>, Vec<AssetHandle>)> {
        let contents = read_archive(data, &self.policy.document_extension)?;
        if contents.documents.is_empty() {
            return Err(Error::NoUsableDocument);
        }

        let resolver = AssetResolver::build(&contents.assets, tracker);
        let mut features = Vec::new();

        for entry in &contents.documents {
            let text = decode_markup(&entry.data);
            let doc = match KmlDocument::parse(&text) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!("Skipping {}: {}", entry.name, e);
                    continue;
                }
            };

            let catalog = StyleCatalog::from_document(&doc);
            let ctx = ExtractContext {
                catalog: &catalog,
                assets: Some(&resolver),
                force_uniform: false,
                policy: &self.policy,
            };
            let extracted = extract_features(&doc.placemarks(), &ctx);
            debug!(
                "{}: {} styles, {} features",
                entry.name,
                catalog.len(),
                extracted.len()
            );
            features.extend(extracted);
        }

        Ok((features, resolver.into_handles()))
    }

    fn process_document(&self, data: &[u8]) -> Result<Vec<Feature>> {
        let text = decode_markup(data);
        let doc = KmlDocument::parse(&text)?;

        // Built for parity with the archive path; uniform mode never consults it.
        let catalog = StyleCatalog::from_document(&doc);
        let ctx = ExtractContext {
            catalog: &catalog,
            assets: None,
            force_uniform: true,
            policy: &self.policy,
        };
        Ok(extract_features(&doc.placemarks(), &ctx))
    }
}

/// Extract an overlay from bytes, inlining assets as `data:` URIs.
pub fn extract_overlay(data: &[u8]) -> Result<Overlay> {
    Extractor::new().process(data, &mut DataUriTracker::new())
}

/// Read a KML or KMZ file and extract its overlay.
///
/// I/O failures are reported as [`Error::Retrieval`].
pub fn read_overlay(path: impl AsRef<Path>) -> Result<Overlay> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| Error::Retrieval(format!("{}: {}", path.display(), e)))?;
    extract_overlay(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_document() {
        let overlay = extract_overlay(
            b"<kml><Placemark><Point><coordinates>2.35,48.85</coordinates></Point></Placemark></kml>",
        )
        .unwrap();
        assert_eq!(overlay.features.len(), 1);
        assert!(overlay.is_single_point());
        assert_eq!(overlay.bounds.min_lat, 48.85);
        assert!(overlay.assets.is_empty());
    }

    #[test]
    fn test_plain_document_errors() {
        assert!(matches!(
            extract_overlay(b"<kml><Document></kml>"),
            Err(Error::InvalidDocument(_))
        ));
        assert!(matches!(
            extract_overlay(b"<kml><Document/></kml>"),
            Err(Error::NoGeometry)
        ));
    }

    #[test]
    fn test_short_input_is_markup() {
        assert!(matches!(extract_overlay(b"PK"), Err(Error::InvalidDocument(_))));
    }

    #[test]
    fn test_read_overlay_missing_file() {
        let err = read_overlay("/nonexistent/overlay.kml").unwrap_err();
        assert!(matches!(err, Error::Retrieval(ref msg) if msg.contains("overlay.kml")));
    }
}
