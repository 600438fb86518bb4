//! # geolay
//!
//! Extract map overlays from KML documents and KMZ archives.
//!
//! ## Features
//!
//! - Detects KMZ (ZIP) versus plain KML input
//! - Recovers text in UTF-8 or a legacy single-byte encoding
//! - Resolves `<Style>` / `<StyleMap>` references and KML's `aabbggrr` colors
//! - Resolves icon references to assets embedded in the archive
//! - Normalizes points, lines, polygons and their multi-variants into
//!   [`Feature`]s with a computed [`BoundingRegion`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use geolay::read_overlay;
//!
//! let overlay = read_overlay("trails.kmz").unwrap();
//! println!("{} features", overlay.features.len());
//! if let Some([south_west, north_east]) = overlay.bounds.corners() {
//!     println!("fit to {south_west:?} .. {north_east:?}");
//! }
//! ```
//!
//! ## Styling policy
//!
//! Styling embedded in a KMZ archive is honoured. A single KML document is
//! always drawn with the uniform defaults of [`StylePolicy`]:
//!
//! ```
//! use geolay::{Extractor, DataUriTracker, Feature};
//!
//! let kml = br#"<kml><Placemark><name>Camp</name>
//!     <Point><coordinates>8.5,47.3</coordinates></Point></Placemark></kml>"#;
//!
//! let overlay = Extractor::new().process(kml, &mut DataUriTracker::new()).unwrap();
//! assert!(matches!(overlay.features[0], Feature::Point { icon: None, .. }));
//! ```

pub mod archive;
pub mod assets;
pub mod color;
pub mod error;
pub mod extract;
pub mod kml;
pub mod model;
pub mod pipeline;
pub mod session;
pub mod style;
pub mod util;
pub mod xml;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use assets::{AssetHandle, DataUriTracker, ResourceTracker};
pub use error::{Error, Result};
pub use model::{
    BoundingRegion, Feature, LatLng, Overlay, ResolvedIcon, ResolvedLabel, ResolvedLineStyle,
    ResolvedPolygonStyle,
};
pub use pipeline::{Extractor, extract_overlay, read_overlay};
pub use session::{LoadOutcome, OverlaySession};
pub use style::{StyleCatalog, StyleDefinition, StylePolicy};
