//! Turning placemarks into renderable features.

use tracing::debug;

use crate::archive::AssetResolver;
use crate::kml::{Geometry, Placemark, Position};
use crate::model::{Feature, LatLng};
use crate::style::{StyleCatalog, StyleDefinition, StylePolicy};

/// Everything the extractor needs besides the placemarks themselves.
#[derive(Clone, Copy)]
pub struct ExtractContext<'a> {
    pub catalog: &'a StyleCatalog,
    pub assets: Option<&'a AssetResolver>,
    /// Ignore embedded styling and use the policy defaults throughout.
    pub force_uniform: bool,
    pub policy: &'a StylePolicy,
}

/// Extract features from one document's placemarks, in document order.
///
/// Multi-shapes yield one feature per member. Placemarks without geometry,
/// and polygons or lines without points, are dropped.
pub fn extract_features(placemarks: &[Placemark], ctx: &ExtractContext<'_>) -> Vec<Feature> {
    let mut features = Vec::new();

    for placemark in placemarks {
        let Some(geometry) = &placemark.geometry else {
            continue;
        };
        let style = ctx
            .catalog
            .resolve(placemark.style_url.as_deref(), ctx.force_uniform);
        let before = features.len();

        push_geometry(
            &mut features,
            geometry,
            placemark.name.as_deref(),
            style,
            ctx,
        );

        debug!(
            "{} {:?} -> {} features",
            geometry.kind(),
            placemark.name,
            features.len() - before
        );
    }

    features
}

fn push_geometry(
    out: &mut Vec<Feature>,
    geometry: &Geometry,
    name: Option<&str>,
    style: Option<&StyleDefinition>,
    ctx: &ExtractContext<'_>,
) {
    match geometry {
        Geometry::Point(position) => out.push(point(*position, name, style, ctx)),
        Geometry::MultiPoint(positions) => {
            out.extend(positions.iter().map(|p| point(*p, name, style, ctx)));
        }
        Geometry::LineString(path) => out.extend(polyline(path, style, ctx)),
        Geometry::MultiLineString(paths) => {
            out.extend(paths.iter().filter_map(|path| polyline(path, style, ctx)));
        }
        Geometry::Polygon(rings) => out.extend(polygon(rings, style, ctx)),
        Geometry::MultiPolygon(polygons) => {
            out.extend(polygons.iter().filter_map(|rings| polygon(rings, style, ctx)));
        }
        Geometry::Collection(members) => {
            for member in members {
                push_geometry(out, member, name, style, ctx);
            }
        }
    }
}

fn to_points(positions: &[Position]) -> Vec<LatLng> {
    positions.iter().copied().map(LatLng::from_position).collect()
}

fn polygon(
    rings: &[Vec<Position>],
    style: Option<&StyleDefinition>,
    ctx: &ExtractContext<'_>,
) -> Option<Feature> {
    let rings: Vec<Vec<LatLng>> = rings
        .iter()
        .map(|ring| to_points(ring))
        .filter(|ring| !ring.is_empty())
        .collect();
    if rings.is_empty() {
        return None;
    }

    Some(Feature::Polygon {
        rings,
        style: ctx.policy.polygon_style(style),
    })
}

fn polyline(
    path: &[Position],
    style: Option<&StyleDefinition>,
    ctx: &ExtractContext<'_>,
) -> Option<Feature> {
    if path.is_empty() {
        return None;
    }

    Some(Feature::Polyline {
        path: to_points(path),
        style: ctx.policy.line_style(style),
    })
}

fn point(
    position: Position,
    name: Option<&str>,
    style: Option<&StyleDefinition>,
    ctx: &ExtractContext<'_>,
) -> Feature {
    let (icon, label) = if ctx.force_uniform {
        (None, ctx.policy.uniform_label(name))
    } else {
        (
            ctx.policy.icon(style, ctx.assets),
            ctx.policy.label(name, style),
        )
    };

    Feature::Point {
        position: LatLng::from_position(position),
        icon,
        label,
    }
}
