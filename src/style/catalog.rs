//! Building a style catalog from `<Style>` and `<StyleMap>` elements.

use std::collections::HashMap;

use crate::color::{DisplayColor, decode_color};
use crate::kml::KmlDocument;
use crate::xml::Element;

/// `<PolyStyle>`: fill color and the fill/outline switches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolyStyle {
    pub color: Option<DisplayColor>,
    pub fill: Option<bool>,
    pub outline: Option<bool>,
}

/// `<LineStyle>`: stroke color and width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineStyle {
    pub color: Option<DisplayColor>,
    pub width: Option<f64>,
}

/// `<IconStyle>`: icon reference and scale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IconStyle {
    pub href: Option<String>,
    pub scale: Option<f64>,
}

/// `<LabelStyle>`: label color and scale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelStyle {
    pub color: Option<DisplayColor>,
    pub scale: Option<f64>,
}

/// A named style. Every part is optional: absence means "use the default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDefinition {
    pub poly: Option<PolyStyle>,
    pub line: Option<LineStyle>,
    pub icon: Option<IconStyle>,
    pub label: Option<LabelStyle>,
}

/// Style definitions and alias redirects of one document.
///
/// Both tables are keyed by `#id`, the form used by `styleUrl`.
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    pub(crate) styles: HashMap<String, StyleDefinition>,
    /// Alias id -> the style reference of its `normal` pair.
    pub(crate) aliases: HashMap<String, String>,
}

impl StyleCatalog {
    /// Collect every `<Style id>` and `<StyleMap id>` in the document.
    ///
    /// Only the `normal` pair of a style map is recorded; `highlight` pairs
    /// are ignored, and maps without a `normal` pair are dropped.
    pub fn from_document(doc: &KmlDocument) -> Self {
        let mut catalog = Self::default();

        for element in std::iter::once(doc.root()).chain(doc.root().descendants()) {
            let Some(id) = element.attr("id").filter(|id| !id.is_empty()) else {
                continue;
            };

            match element.name.as_str() {
                "Style" => {
                    catalog.styles.insert(format!("#{id}"), read_style(element));
                }
                "StyleMap" => {
                    if let Some(target) = normal_pair_target(element) {
                        catalog.aliases.insert(format!("#{id}"), target.to_string());
                    }
                }
                _ => {}
            }
        }

        catalog
    }

    /// Style definition stored under `key` (e.g. `#red`), without alias lookup.
    pub fn style(&self, key: &str) -> Option<&StyleDefinition> {
        self.styles.get(key)
    }

    /// Raw redirect target of the alias stored under `key`.
    pub fn alias(&self, key: &str) -> Option<&str> {
        self.aliases.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.aliases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.styles.len() + self.aliases.len()
    }
}

fn normal_pair_target(style_map: &Element) -> Option<&str> {
    style_map
        .children_named("Pair")
        .find(|pair| pair.child_text("key") == Some("normal"))
        .and_then(|pair| pair.child_text("styleUrl"))
        .filter(|url| !url.is_empty())
}

fn read_style(element: &Element) -> StyleDefinition {
    StyleDefinition {
        poly: element.child("PolyStyle").map(|e| PolyStyle {
            color: color(e),
            fill: boolean(e, "fill"),
            outline: boolean(e, "outline"),
        }),
        line: element.child("LineStyle").map(|e| LineStyle {
            color: color(e),
            width: number(e, "width"),
        }),
        icon: element.child("IconStyle").map(|e| IconStyle {
            href: e
                .child("Icon")
                .and_then(|icon| icon.child_text("href"))
                .filter(|href| !href.is_empty())
                .map(str::to_string),
            scale: number(e, "scale"),
        }),
        label: element.child("LabelStyle").map(|e| LabelStyle {
            color: color(e),
            scale: number(e, "scale"),
        }),
    }
}

fn color(element: &Element) -> Option<DisplayColor> {
    element.child_text("color").map(decode_color)
}

fn number(element: &Element, name: &str) -> Option<f64> {
    element
        .child_text(name)
        .and_then(|t| t.parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

fn boolean(element: &Element, name: &str) -> Option<bool> {
    match element.child_text(name)? {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}
