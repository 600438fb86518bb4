//! Renderer-facing output: features with resolved styles, and bounds.

use crate::assets::AssetHandle;

#[cfg(feature = "serde")]
use serde::Serialize;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Convert a source `[longitude, latitude]` pair.
    pub fn from_position(position: [f64; 2]) -> Self {
        Self {
            lat: position[1],
            lng: position[0],
        }
    }
}

/// Stroke and fill for a polygon.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ResolvedPolygonStyle {
    pub stroke_color: String,
    pub stroke_opacity: f64,
    /// Stroke width in pixels; zero means no outline.
    pub weight: u32,
    pub fill_color: String,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ResolvedLineStyle {
    pub color: String,
    pub opacity: f64,
    /// Stroke width in pixels, at least one.
    pub weight: u32,
}

/// Custom marker icon.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ResolvedIcon {
    /// Asset handle, or the raw reference when it did not resolve.
    pub href: String,
    /// Square icon size in pixels, when the style scales the icon.
    pub size_px: Option<u32>,
}

/// Text label attached to a point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ResolvedLabel {
    pub text: String,
    /// CSS color with opacity folded in; `None` means the renderer default.
    pub color: Option<String>,
    pub font_size_px: f64,
}

/// One renderable feature.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum Feature {
    Polygon {
        /// First ring is the outer boundary, the rest are holes.
        rings: Vec<Vec<LatLng>>,
        style: ResolvedPolygonStyle,
    },
    Polyline {
        path: Vec<LatLng>,
        style: ResolvedLineStyle,
    },
    Point {
        position: LatLng,
        icon: Option<ResolvedIcon>,
        label: Option<ResolvedLabel>,
    },
}

impl Feature {
    /// Visit every point of this feature.
    pub fn points(&self) -> Box<dyn Iterator<Item = &LatLng> + '_> {
        match self {
            Feature::Polygon { rings, .. } => Box::new(rings.iter().flatten()),
            Feature::Polyline { path, .. } => Box::new(path.iter()),
            Feature::Point { position, .. } => Box::new(std::iter::once(position)),
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self, Feature::Point { .. })
    }
}

/// Smallest latitude/longitude rectangle enclosing a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct BoundingRegion {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Default for BoundingRegion {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingRegion {
    /// A region containing nothing; extending it with a point yields that point.
    pub const fn empty() -> Self {
        Self {
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_lng: f64::INFINITY,
            max_lng: f64::NEG_INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_lat > self.max_lat || self.min_lng > self.max_lng
    }

    pub fn extend(&mut self, point: &LatLng) {
        self.min_lat = self.min_lat.min(point.lat);
        self.max_lat = self.max_lat.max(point.lat);
        self.min_lng = self.min_lng.min(point.lng);
        self.max_lng = self.max_lng.max(point.lng);
    }

    /// Bounds of every point of every feature.
    pub fn from_features(features: &[Feature]) -> Self {
        let mut bounds = Self::empty();
        for point in features.iter().flat_map(|f| f.points()) {
            bounds.extend(point);
        }
        bounds
    }

    pub fn center(&self) -> Option<LatLng> {
        (!self.is_empty()).then(|| {
            LatLng::new(
                (self.min_lat + self.max_lat) / 2.0,
                (self.min_lng + self.max_lng) / 2.0,
            )
        })
    }

    /// Renderer-style `[[south, west], [north, east]]` corners.
    pub fn corners(&self) -> Option<[LatLng; 2]> {
        (!self.is_empty()).then(|| {
            [
                LatLng::new(self.min_lat, self.min_lng),
                LatLng::new(self.max_lat, self.max_lng),
            ]
        })
    }
}

/// Result of one successful extraction run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Overlay {
    pub features: Vec<Feature>,
    pub bounds: BoundingRegion,
    /// Asset handles registered for this run. Released by whoever owns the run.
    pub assets: Vec<AssetHandle>,
}

impl Overlay {
    /// True when the overlay is exactly one point feature, the case in which
    /// renderers cap their zoom level instead of fitting the bounds.
    pub fn is_single_point(&self) -> bool {
        matches!(self.features.as_slice(), [f] if f.is_point())
    }
}
