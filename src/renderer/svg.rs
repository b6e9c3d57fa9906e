//! SVG generation from a drawn figure

use tracing::debug;

use crate::layout::{Backend, BoundingBox, Figure, LayoutError, Point};

use super::artists::{collect_artists, union_extent, Artist, Baseline, Text, TextAnchor, TextMetrics};
use super::SvgConfig;

/// Build SVG elements incrementally
pub struct SvgBuilder {
    config: SvgConfig,
    styles: Vec<String>,
    elements: Vec<String>,
    indent: usize,
}

impl SvgBuilder {
    /// Create a new SVG builder
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            styles: vec![],
            elements: vec![],
            indent: 1,
        }
    }

    /// Add the base text style
    pub fn add_font_family(&mut self, family: &str) {
        self.styles.push(format!(
            ".{} {{ font-family: {}; }}",
            self.config.class("text"),
            escape_xml(family)
        ));
    }

    fn indent_str(&self) -> String {
        if self.config.pretty_print {
            "  ".repeat(self.indent)
        } else {
            String::new()
        }
    }

    fn newline(&self) -> &str {
        if self.config.pretty_print {
            "\n"
        } else {
            ""
        }
    }

    /// Inches to user units
    fn px(&self, inches: f64) -> f64 {
        round(self.config.user_units(inches))
    }

    fn class_list(&self, kind: &str, class: &str) -> String {
        format!("{} {}", self.config.class(kind), self.config.class(class))
    }

    fn points_attr(&self, points: &[Point]) -> String {
        points
            .iter()
            .map(|p| format!("{},{}", self.px(p.x), self.px(p.y)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Add a rectangle element
    pub fn add_rect(&mut self, bbox: BoundingBox, class: &str, styles: &str) {
        self.elements.push(format!(
            r#"{}<rect class="{}" x="{}" y="{}" width="{}" height="{}"{}/>"#,
            self.indent_str(),
            self.class_list("rect", class),
            self.px(bbox.x),
            self.px(bbox.y),
            self.px(bbox.width),
            self.px(bbox.height),
            styles
        ));
    }

    /// Add a circle element
    pub fn add_circle(&mut self, center: Point, r: f64, class: &str, styles: &str) {
        self.elements.push(format!(
            r#"{}<circle class="{}" cx="{}" cy="{}" r="{}"{}/>"#,
            self.indent_str(),
            self.class_list("circle", class),
            self.px(center.x),
            self.px(center.y),
            self.px(r),
            styles
        ));
    }

    /// Add an open polyline element
    pub fn add_polyline(&mut self, points: &[Point], class: &str, styles: &str) {
        self.elements.push(format!(
            r#"{}<polyline class="{}" points="{}" fill="none"{}/>"#,
            self.indent_str(),
            self.class_list("line", class),
            self.points_attr(points),
            styles
        ));
    }

    /// Add a polygon element
    pub fn add_polygon(&mut self, points: &[Point], class: &str, styles: &str) {
        self.elements.push(format!(
            r#"{}<polygon class="{}" points="{}"{}/>"#,
            self.indent_str(),
            self.class_list("polygon", class),
            self.points_attr(points),
            styles
        ));
    }

    /// Add a text element
    pub fn add_text(&mut self, text: &Text) {
        let anchor = match text.anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        };
        let baseline = match text.baseline {
            Baseline::Top => "hanging",
            Baseline::Middle => "middle",
            Baseline::Bottom => "text-after-edge",
        };
        let (x, y) = (self.px(text.at.x), self.px(text.at.y));
        let rotate = if text.rotated {
            format!(r#" transform="rotate(-90 {} {})""#, x, y)
        } else {
            String::new()
        };
        let weight = if text.bold {
            r#" font-weight="bold""#
        } else {
            ""
        };
        self.elements.push(format!(
            r#"{}<text class="{}" x="{}" y="{}" text-anchor="{}" dominant-baseline="{}" font-size="{}" fill="{}"{}{}>{}</text>"#,
            self.indent_str(),
            self.class_list("text", text.class),
            x,
            y,
            anchor,
            baseline,
            round(self.config.font_units(text.size)),
            escape_xml(&text.color),
            weight,
            rotate,
            escape_xml(&text.content)
        ));
    }

    /// Add a group element with optional ID and classes
    pub fn start_group(&mut self, id: Option<&str>, classes: &[String]) {
        let id_attr = id.map(|i| format!(r#" id="{}""#, i)).unwrap_or_default();
        let class_attr = if classes.is_empty() {
            String::new()
        } else {
            format!(r#" class="{}""#, classes.join(" "))
        };

        self.elements
            .push(format!("{}<g{}{}>", self.indent_str(), id_attr, class_attr));
        self.indent += 1;
    }

    /// Close a group element
    pub fn end_group(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.elements.push(format!("{}</g>", self.indent_str()));
    }

    /// Build the final SVG string for a canvas of `width` x `height` inches
    pub fn build(self, width: f64, height: f64) -> String {
        let (w, h) = (self.px(width), self.px(height));
        let nl = self.newline();

        let mut svg = String::new();

        // XML declaration for standalone
        if self.config.standalone {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(nl);
        }

        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        ));
        svg.push_str(nl);

        if !self.styles.is_empty() {
            svg.push_str("  <style>");
            svg.push_str(nl);
            for style in &self.styles {
                svg.push_str("    ");
                svg.push_str(style);
                svg.push_str(nl);
            }
            svg.push_str("  </style>");
            svg.push_str(nl);
        }

        for elem in &self.elements {
            svg.push_str(elem);
            svg.push_str(nl);
        }

        svg.push_str("</svg>");
        svg
    }
}

/// Backend that measures with estimated text extents and paints SVG
#[derive(Debug, Clone, Default)]
pub struct SvgBackend {
    pub config: SvgConfig,
    pub metrics: TextMetrics,
}

impl SvgBackend {
    pub fn new(config: SvgConfig) -> Self {
        Self {
            config,
            metrics: TextMetrics::default(),
        }
    }

    pub fn with_metrics(mut self, metrics: TextMetrics) -> Self {
        self.metrics = metrics;
        self
    }
}

impl Backend for SvgBackend {
    type Output = Result<String, LayoutError>;

    fn measure_bounding_box(&self, figure: &Figure) -> Result<BoundingBox, LayoutError> {
        let artists = collect_artists(figure, &self.metrics)?;
        let extent = match union_extent(&artists, &self.metrics) {
            Some(extent) => extent,
            // nothing drawn yet: the subplot block is all there is
            None => figure.block_box()?,
        };
        debug!(
            "measured {} artists within x={:.3} y={:.3} w={:.3} h={:.3}",
            artists.len(),
            extent.x,
            extent.y,
            extent.width,
            extent.height
        );
        Ok(extent)
    }

    fn paint(&mut self, figure: &Figure) -> Self::Output {
        let artists = collect_artists(figure, &self.metrics)?;
        Ok(render_svg(figure, &artists, &self.config))
    }
}

/// Render collected artists to an SVG string
pub fn render_svg(figure: &Figure, artists: &[Artist], config: &SvgConfig) -> String {
    let mut builder = SvgBuilder::new(config.clone());
    if let Some(family) = figure.style().text("text.family") {
        builder.add_font_family(family);
    }

    let canvas = figure.size();
    builder.start_group(Some("figure"), &[config.class("figure")]);
    builder.add_rect(
        BoundingBox::new(0.0, 0.0, canvas.width, canvas.height),
        "background",
        r#" fill="white""#,
    );
    for artist in artists {
        render_artist(artist, &mut builder);
    }
    builder.end_group();

    builder.build(canvas.width, canvas.height)
}

fn render_artist(artist: &Artist, builder: &mut SvgBuilder) {
    match artist {
        Artist::Rect {
            bbox,
            fill,
            stroke,
            stroke_width,
            class,
        } => {
            let fill_attr = format!(
                r#" fill="{}""#,
                fill.as_deref().map(escape_xml).unwrap_or_else(|| "none".to_string())
            );
            let stroke_attr = stroke
                .as_deref()
                .map(|s| format!(r#" stroke="{}" stroke-width="{}""#, escape_xml(s), stroke_width))
                .unwrap_or_default();
            builder.add_rect(*bbox, class, &format!("{fill_attr}{stroke_attr}"));
        }
        Artist::Polyline {
            points,
            stroke,
            stroke_width,
            class,
        } => builder.add_polyline(
            points,
            class,
            &format!(r#" stroke="{}" stroke-width="{}""#, escape_xml(stroke), stroke_width),
        ),
        Artist::Polygon {
            points,
            fill,
            class,
        } => builder.add_polygon(
            points,
            class,
            &format!(r#" fill="{}" fill-opacity="0.4""#, escape_xml(fill)),
        ),
        Artist::Marker {
            center,
            radius,
            fill,
        } => builder.add_circle(*center, *radius, "marker", &format!(r#" fill="{}""#, escape_xml(fill))),
        Artist::Text(text) => builder.add_text(text),
    }
}

/// Round to 1/100 of a unit to keep output stable and short
fn round(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Escape special XML characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
