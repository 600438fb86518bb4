//! Defaults and style composition rules.
//!
//! Every "what happens when X is absent" decision lives here. The geometry
//! extractor asks the policy for a resolved style given whatever style
//! definition (if any) the resolver produced.

use tracing::debug;

use crate::archive::AssetResolver;
use crate::color::DisplayColor;
use crate::model::{ResolvedIcon, ResolvedLabel, ResolvedLineStyle, ResolvedPolygonStyle};

use super::catalog::StyleDefinition;

/// Default appearance and sizing rules.
#[derive(Debug, Clone, PartialEq)]
pub struct StylePolicy {
    /// Polygon style used in uniform mode and when no style applies.
    pub polygon: ResolvedPolygonStyle,
    /// Line style used in uniform mode and when no style applies.
    pub line: ResolvedLineStyle,
    /// Icon edge length at scale 1.0.
    pub icon_base_px: f64,
    /// Icons never render smaller than this.
    pub icon_min_px: u32,
    /// Label font size at scale 1.0.
    pub label_base_px: f64,
    pub label_scale_min: f64,
    pub label_scale_max: f64,
    /// Extension identifying markup documents inside an archive.
    pub document_extension: String,
}

impl Default for StylePolicy {
    fn default() -> Self {
        Self {
            polygon: ResolvedPolygonStyle {
                stroke_color: "rgb(51,136,255)".to_string(),
                stroke_opacity: 1.0,
                weight: 2,
                fill_color: "rgb(51,136,255)".to_string(),
                fill_opacity: 0.2,
            },
            line: ResolvedLineStyle {
                color: "rgb(51,136,255)".to_string(),
                opacity: 1.0,
                weight: 3,
            },
            icon_base_px: 32.0,
            icon_min_px: 12,
            label_base_px: 12.0,
            label_scale_min: 0.5,
            label_scale_max: 3.0,
            document_extension: ".kml".to_string(),
        }
    }
}

impl StylePolicy {
    /// Compose a polygon style.
    ///
    /// - fill comes from `PolyStyle.color`; `fill=0` forces zero fill opacity
    /// - `outline=0` forces zero stroke weight
    /// - otherwise a `LineStyle` supplies stroke color and rounded width
    /// - with no `LineStyle` at all, the stroke copies the poly color
    pub fn polygon_style(&self, style: Option<&StyleDefinition>) -> ResolvedPolygonStyle {
        let mut resolved = self.polygon.clone();
        let Some(style) = style else {
            return resolved;
        };
        let poly = style.poly.as_ref();
        let poly_color = poly.and_then(|p| p.color);

        if let Some(color) = poly_color {
            resolved.fill_color = color.css();
            resolved.fill_opacity = color.opacity;
        }
        if poly.and_then(|p| p.fill) == Some(false) {
            resolved.fill_opacity = 0.0;
        }

        match (&style.line, poly_color) {
            (Some(line), _) => {
                if let Some(color) = line.color {
                    resolved.stroke_color = color.css();
                    resolved.stroke_opacity = color.opacity;
                }
                if let Some(width) = line.width {
                    resolved.weight = round_px(width);
                }
            }
            (None, Some(color)) => {
                resolved.stroke_color = color.css();
                resolved.stroke_opacity = color.opacity;
            }
            (None, None) => {}
        }

        if poly.and_then(|p| p.outline) == Some(false) {
            resolved.weight = 0;
        }

        resolved
    }

    /// Compose a line style: `LineStyle` color and width, width at least 1.
    pub fn line_style(&self, style: Option<&StyleDefinition>) -> ResolvedLineStyle {
        let mut resolved = self.line.clone();
        let Some(line) = style.and_then(|s| s.line.as_ref()) else {
            return resolved;
        };

        if let Some(color) = line.color {
            resolved.color = color.css();
            resolved.opacity = color.opacity;
        }
        if let Some(width) = line.width {
            resolved.weight = round_px(width).max(1);
        }
        resolved
    }

    /// Custom icon for a point, if the style names one.
    ///
    /// An href that does not resolve to an archive asset is kept verbatim.
    pub fn icon(
        &self,
        style: Option<&StyleDefinition>,
        assets: Option<&AssetResolver>,
    ) -> Option<ResolvedIcon> {
        let icon = style?.icon.as_ref()?;
        let href = icon.href.as_deref()?;

        let resolved_href = match assets.and_then(|a| a.resolve(href)) {
            Some(handle) => handle.as_str().to_string(),
            None => {
                if assets.is_some() {
                    debug!("Icon reference {} not found in archive", href);
                }
                href.to_string()
            }
        };

        Some(ResolvedIcon {
            href: resolved_href,
            size_px: icon.scale.map(|scale| self.icon_size(scale)),
        })
    }

    /// Icon edge length for a scale factor, floored at `icon_min_px`.
    pub fn icon_size(&self, scale: f64) -> u32 {
        round_px(self.icon_base_px * scale).max(self.icon_min_px)
    }

    /// Label for a point. Without a name there is nothing to show.
    pub fn label(&self, name: Option<&str>, style: Option<&StyleDefinition>) -> Option<ResolvedLabel> {
        let text = name?.to_string();
        let label = style.and_then(|s| s.label.as_ref());

        Some(ResolvedLabel {
            text,
            color: label
                .and_then(|l| l.color)
                .map(|c: DisplayColor| c.css_with_opacity(1.0)),
            font_size_px: self.label_font_size(label.and_then(|l| l.scale)),
        })
    }

    /// Plain label used in uniform mode.
    pub fn uniform_label(&self, name: Option<&str>) -> Option<ResolvedLabel> {
        self.label(name, None)
    }

    pub fn label_font_size(&self, scale: Option<f64>) -> f64 {
        let scale = scale
            .unwrap_or(1.0)
            .clamp(self.label_scale_min, self.label_scale_max);
        self.label_base_px * scale
    }
}

fn round_px(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveEntry;
    use crate::assets::DataUriTracker;
    use crate::color::decode_color;
    use crate::style::catalog::{IconStyle, LabelStyle, LineStyle, PolyStyle};

    fn poly(color: Option<&str>, fill: Option<bool>, outline: Option<bool>) -> PolyStyle {
        PolyStyle {
            color: color.map(decode_color),
            fill,
            outline,
        }
    }

    fn line(color: Option<&str>, width: Option<f64>) -> LineStyle {
        LineStyle {
            color: color.map(decode_color),
            width,
        }
    }

    #[test]
    fn test_polygon_no_style_is_default() {
        let policy = StylePolicy::default();
        assert_eq!(policy.polygon_style(None), policy.polygon);
        assert_eq!(policy.polygon_style(Some(&StyleDefinition::default())), policy.polygon);
    }

    #[test]
    fn test_polygon_fill_false_zeroes_opacity() {
        let policy = StylePolicy::default();
        let style = StyleDefinition {
            poly: Some(poly(Some("ff0000ff"), Some(false), None)),
            ..Default::default()
        };
        let resolved = policy.polygon_style(Some(&style));
        assert_eq!(resolved.fill_color, "rgb(255,0,0)");
        assert_eq!(resolved.fill_opacity, 0.0);
    }

    #[test]
    fn test_polygon_outline_false_zeroes_weight() {
        let policy = StylePolicy::default();
        let style = StyleDefinition {
            poly: Some(poly(None, None, Some(false))),
            line: Some(line(Some("ff00ff00"), Some(5.0))),
            ..Default::default()
        };
        assert_eq!(policy.polygon_style(Some(&style)).weight, 0);
    }

    #[test]
    fn test_polygon_line_style_supplies_stroke() {
        let policy = StylePolicy::default();
        let style = StyleDefinition {
            poly: Some(poly(Some("40ff0000"), None, None)),
            line: Some(line(Some("ff00ff00"), Some(2.6))),
            ..Default::default()
        };
        let resolved = policy.polygon_style(Some(&style));
        assert_eq!(resolved.weight, 3);
        assert_eq!(resolved.stroke_color, "rgb(0,255,0)");
        assert_eq!(resolved.stroke_opacity, 1.0);
        assert_eq!(resolved.fill_color, "rgb(0,0,255)");
        assert!((resolved.fill_opacity - 64.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_polygon_stroke_falls_back_to_poly_color() {
        let policy = StylePolicy::default();
        let style = StyleDefinition {
            poly: Some(poly(Some("80123456"), None, None)),
            ..Default::default()
        };
        let resolved = policy.polygon_style(Some(&style));
        assert_eq!(resolved.stroke_color, "rgb(86,52,18)");
        assert_eq!(resolved.stroke_opacity, resolved.fill_opacity);
        assert_eq!(resolved.weight, policy.polygon.weight);
    }

    #[test]
    fn test_line_style() {
        let policy = StylePolicy::default();
        assert_eq!(policy.line_style(None), policy.line);

        let thin = StyleDefinition {
            line: Some(line(Some("ff0000ff"), Some(0.2))),
            ..Default::default()
        };
        let resolved = policy.line_style(Some(&thin));
        assert_eq!(resolved.weight, 1);
        assert_eq!(resolved.color, "rgb(255,0,0)");

        let wide = StyleDefinition {
            line: Some(line(None, Some(4.5))),
            ..Default::default()
        };
        let resolved = policy.line_style(Some(&wide));
        assert_eq!(resolved.weight, 5);
        assert_eq!(resolved.color, policy.line.color);
    }

    #[test]
    fn test_icon_size_is_floored() {
        let policy = StylePolicy::default();
        assert_eq!(policy.icon_size(1.0), 32);
        assert_eq!(policy.icon_size(1.5), 48);
        assert_eq!(policy.icon_size(0.1), 12);
        assert_eq!(policy.icon_size(0.0), 12);
    }

    #[test]
    fn test_icon_resolves_archive_asset() {
        let policy = StylePolicy::default();
        let assets = [ArchiveEntry {
            name: "files/pin.png".into(),
            is_dir: false,
            data: b"png".to_vec(),
        }];
        let resolver = AssetResolver::build(&assets, &mut DataUriTracker::new());
        let style = StyleDefinition {
            icon: Some(IconStyle {
                href: Some("pin.png".into()),
                scale: None,
            }),
            ..Default::default()
        };

        let icon = policy.icon(Some(&style), Some(&resolver)).unwrap();
        assert_eq!(icon.href, resolver.handles()[0].as_str());
        assert_eq!(icon.size_px, None);
    }

    #[test]
    fn test_icon_dangling_href_kept_verbatim() {
        let policy = StylePolicy::default();
        let style = StyleDefinition {
            icon: Some(IconStyle {
                href: Some("http://maps.example.com/pin.png".into()),
                scale: Some(2.0),
            }),
            ..Default::default()
        };
        let resolver = AssetResolver::default();

        let icon = policy.icon(Some(&style), Some(&resolver)).unwrap();
        assert_eq!(icon.href, "http://maps.example.com/pin.png");
        assert_eq!(icon.size_px, Some(64));
        assert!(policy.icon(None, None).is_none());
    }

    #[test]
    fn test_label() {
        let policy = StylePolicy::default();
        assert!(policy.label(None, None).is_none());

        let plain = policy.uniform_label(Some("Camp")).unwrap();
        assert_eq!(plain.text, "Camp");
        assert_eq!(plain.color, None);
        assert_eq!(plain.font_size_px, 12.0);

        let style = StyleDefinition {
            label: Some(LabelStyle {
                color: Some(decode_color("80ffffff")),
                scale: Some(10.0),
            }),
            ..Default::default()
        };
        let styled = policy.label(Some("Camp"), Some(&style)).unwrap();
        assert_eq!(styled.color.as_deref(), Some("rgba(255,255,255,0.502)"));
        assert_eq!(styled.font_size_px, 36.0);
    }

    #[test]
    fn test_label_font_size_clamped() {
        let policy = StylePolicy::default();
        assert_eq!(policy.label_font_size(Some(0.0)), 6.0);
        assert_eq!(policy.label_font_size(Some(2.0)), 24.0);
        assert_eq!(policy.label_font_size(None), 12.0);
    }
}
