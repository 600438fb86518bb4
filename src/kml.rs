//! KML overlay vocabulary: placemarks and their geometry.
//!
//! This is not a general KML reader. It understands placemarks, the five
//! overlay geometry shapes and `MultiGeometry`; styles are read separately
//! by [`crate::style::StyleCatalog`].

use tracing::debug;

use crate::error::Result;
use crate::xml::{self, Element};

/// A `[longitude, latitude]` pair in degrees, in source order.
pub type Position = [f64; 2];

/// Placemark geometry, after `MultiGeometry` normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    /// Rings: the first is the outer boundary, the rest are holes.
    Polygon(Vec<Vec<Position>>),
    MultiPoint(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
    /// A `MultiGeometry` with mixed member shapes.
    Collection(Vec<Geometry>),
}

impl Geometry {
    /// Shape name, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::Collection(_) => "GeometryCollection",
        }
    }
}

/// One entry of the document's feature collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Placemark {
    pub name: Option<String>,
    /// Raw `styleUrl` text, e.g. `#red` or `styles.kml#red`.
    pub style_url: Option<String>,
    pub geometry: Option<Geometry>,
}

/// A parsed KML document.
#[derive(Debug, Clone)]
pub struct KmlDocument {
    root: Element,
}

impl KmlDocument {
    /// Parse markup text. Fails only on structural XML errors.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self {
            root: xml::parse(content)?,
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Every placemark in document order, including those nested in folders.
    pub fn placemarks(&self) -> Vec<Placemark> {
        let root_placemark = (self.root.name == "Placemark").then_some(&self.root);
        root_placemark
            .into_iter()
            .chain(self.root.descendants().filter(|e| e.name == "Placemark"))
            .map(read_placemark)
            .collect()
    }
}

fn read_placemark(element: &Element) -> Placemark {
    let geometry = element.children.iter().find_map(read_geometry);
    if geometry.is_none() {
        debug!("Placemark {:?} has no usable geometry", element.child_text("name"));
    }

    Placemark {
        name: non_empty(element.child_text("name")),
        style_url: non_empty(element.child_text("styleUrl")),
        geometry,
    }
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.is_empty()).map(str::to_string)
}

/// Read a geometry element. Returns `None` for non-geometry elements and
/// for geometries without a single usable coordinate.
fn read_geometry(element: &Element) -> Option<Geometry> {
    match element.name.as_str() {
        "Point" => coordinates(element).into_iter().next().map(Geometry::Point),
        "LineString" | "LinearRing" => {
            let path = coordinates(element);
            (!path.is_empty()).then_some(Geometry::LineString(path))
        }
        "Polygon" => read_polygon(element).map(Geometry::Polygon),
        "MultiGeometry" => read_multi_geometry(element),
        _ => None,
    }
}

fn read_polygon(element: &Element) -> Option<Vec<Vec<Position>>> {
    let outer = element
        .child("outerBoundaryIs")
        .and_then(|b| b.child("LinearRing"))
        .map(coordinates)
        .unwrap_or_default();
    if outer.is_empty() {
        return None;
    }

    let holes = element
        .children_named("innerBoundaryIs")
        .flat_map(|b| b.children_named("LinearRing"))
        .map(coordinates)
        .filter(|ring| !ring.is_empty());

    Some(std::iter::once(outer).chain(holes).collect())
}

/// Homogeneous members collapse into the matching multi-shape; anything
/// else stays a collection.
fn read_multi_geometry(element: &Element) -> Option<Geometry> {
    let members: Vec<Geometry> = element.children.iter().filter_map(read_geometry).collect();
    if members.is_empty() {
        return None;
    }

    if members.iter().all(|g| matches!(g, Geometry::Polygon(_))) {
        return Some(Geometry::MultiPolygon(
            members
                .into_iter()
                .filter_map(|g| match g {
                    Geometry::Polygon(rings) => Some(rings),
                    _ => None,
                })
                .collect(),
        ));
    }
    if members.iter().all(|g| matches!(g, Geometry::LineString(_))) {
        return Some(Geometry::MultiLineString(
            members
                .into_iter()
                .filter_map(|g| match g {
                    Geometry::LineString(path) => Some(path),
                    _ => None,
                })
                .collect(),
        ));
    }
    if members.iter().all(|g| matches!(g, Geometry::Point(_))) {
        return Some(Geometry::MultiPoint(
            members
                .into_iter()
                .filter_map(|g| match g {
                    Geometry::Point(p) => Some(p),
                    _ => None,
                })
                .collect(),
        ));
    }

    Some(Geometry::Collection(members))
}

fn coordinates(element: &Element) -> Vec<Position> {
    element
        .child("coordinates")
        .map(|c| parse_coordinates(&c.text))
        .unwrap_or_default()
}

/// Parse a whitespace-separated list of `lon,lat[,alt]` tuples.
///
/// Tuples with fewer than two numbers or with non-finite values are skipped.
pub fn parse_coordinates(text: &str) -> Vec<Position> {
    text.split_whitespace()
        .filter_map(|tuple| {
            let mut parts = tuple.split(',').map(|p| p.trim().parse::<f64>());
            let lon = parts.next()?.ok()?;
            let lat = parts.next()?.ok()?;
            (lon.is_finite() && lat.is_finite()).then_some([lon, lat])
        })
        .collect()
}
