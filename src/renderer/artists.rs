//! Drawable primitives derived from a figure
//!
//! Everything the SVG backend paints is first collected as a list of
//! [`Artist`]s in canvas inches (origin top-left). The same list is used to
//! measure the drawn extent for tight layout, with text extents estimated
//! from character counts.

use crate::layout::geo::{format_latitude, format_longitude, latitude_gridlines, longitude_gridlines};
use crate::layout::{
    AxesKind, AxesNode, Axis, BoundingBox, Capability, Figure, HAlign, LayoutError, PanelContent,
    PanelFill, Point, PlotKind, Side, Size,
};
use crate::style::StyleSource;

use super::ticks::{format_tick, nice_ticks, tick_step};

/// Points per inch; style sizes are points
pub const POINTS_PER_INCH: f64 = 72.0;

const TICK_COUNT: usize = 5;

/// Estimated text extents for a proportional font
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Average advance of one character, in em
    pub char_width: f64,
    /// Height of one line, in em
    pub line_height: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 0.6,
            line_height: 1.0,
        }
    }
}

impl TextMetrics {
    /// Unrotated size of a single line of text in inches
    pub fn extent(&self, text: &str, size: f64) -> Size {
        let em = size / POINTS_PER_INCH;
        Size::new(
            text.chars().count() as f64 * self.char_width * em,
            self.line_height * em,
        )
    }
}

/// Horizontal text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// Vertical text anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    Top,
    Middle,
    Bottom,
}

/// A single line of text
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub content: String,
    pub at: Point,
    /// Font size in points
    pub size: f64,
    pub anchor: TextAnchor,
    pub baseline: Baseline,
    /// Rotated 90 degrees counter-clockwise, reading bottom to top
    pub rotated: bool,
    pub color: String,
    pub bold: bool,
    pub class: &'static str,
}

impl Text {
    fn new(content: impl Into<String>, at: Point, size: f64, style: &dyn StyleSource) -> Self {
        Self {
            content: content.into(),
            at,
            size,
            anchor: TextAnchor::Middle,
            baseline: Baseline::Middle,
            rotated: false,
            color: style.text("text.color").unwrap_or("black").to_string(),
            bold: false,
            class: "text",
        }
    }

    fn anchored(mut self, anchor: TextAnchor, baseline: Baseline) -> Self {
        self.anchor = anchor;
        self.baseline = baseline;
        self
    }

    fn rotated(mut self) -> Self {
        self.rotated = true;
        self
    }

    fn bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    fn class(mut self, class: &'static str) -> Self {
        self.class = class;
        self
    }

    /// Estimated box covered by the text
    pub fn extent(&self, metrics: &TextMetrics) -> BoundingBox {
        let size = metrics.extent(&self.content, self.size);
        // offset of the box start from the anchor along the reading
        // direction and across it
        let along = match self.anchor {
            TextAnchor::Start => 0.0,
            TextAnchor::Middle => -size.width / 2.0,
            TextAnchor::End => -size.width,
        };
        let across = match self.baseline {
            Baseline::Top => 0.0,
            Baseline::Middle => -size.height / 2.0,
            Baseline::Bottom => -size.height,
        };
        if self.rotated {
            // reading direction is -y, "down" is +x
            BoundingBox::new(
                self.at.x + across,
                self.at.y - along - size.width,
                size.height,
                size.width,
            )
        } else {
            BoundingBox::new(self.at.x + along, self.at.y + across, size.width, size.height)
        }
    }
}

/// A drawable primitive in canvas inches
#[derive(Debug, Clone, PartialEq)]
pub enum Artist {
    Rect {
        bbox: BoundingBox,
        fill: Option<String>,
        stroke: Option<String>,
        stroke_width: f64,
        class: &'static str,
    },
    Polyline {
        points: Vec<Point>,
        stroke: String,
        stroke_width: f64,
        class: &'static str,
    },
    Polygon {
        points: Vec<Point>,
        fill: String,
        class: &'static str,
    },
    Marker {
        center: Point,
        radius: f64,
        fill: String,
    },
    Text(Text),
}

impl Artist {
    fn line(from: Point, to: Point, stroke: &str, stroke_width: f64, class: &'static str) -> Self {
        Artist::Polyline {
            points: vec![from, to],
            stroke: stroke.to_string(),
            stroke_width,
            class,
        }
    }

    /// Box covered by the artist; `None` for a path without points
    pub fn extent(&self, metrics: &TextMetrics) -> Option<BoundingBox> {
        match self {
            Artist::Rect { bbox, .. } => Some(*bbox),
            Artist::Polyline { points, .. } | Artist::Polygon { points, .. } => points_extent(points),
            Artist::Marker { center, radius, .. } => Some(BoundingBox::new(
                center.x - radius,
                center.y - radius,
                2.0 * radius,
                2.0 * radius,
            )),
            Artist::Text(text) => Some(text.extent(metrics)),
        }
    }
}

fn points_extent(points: &[Point]) -> Option<BoundingBox> {
    let (first, rest) = points.split_first()?;
    Some(rest.iter().fold(BoundingBox::new(first.x, first.y, 0.0, 0.0), |acc, p| {
        acc.union(&BoundingBox::new(p.x, p.y, 0.0, 0.0))
    }))
}

/// Union of the extents of several artists
pub fn union_extent<'a>(
    artists: impl IntoIterator<Item = &'a Artist>,
    metrics: &TextMetrics,
) -> Option<BoundingBox> {
    artists
        .into_iter()
        .filter_map(|artist| artist.extent(metrics))
        .reduce(|acc, bbox| acc.union(&bbox))
}

fn points(value: f64) -> f64 {
    value / POINTS_PER_INCH
}

/// Resolved style values used while collecting artists
struct Look<'a> {
    style: &'a dyn StyleSource,
    edge: String,
    face: String,
    line_width: f64,
    grid_color: String,
    tick_size: f64,
    tick_length: f64,
    tick_pad: f64,
    label_size: f64,
    label_pad: f64,
    title_size: f64,
    title_pad: f64,
}

impl<'a> Look<'a> {
    fn new(style: &'a dyn StyleSource) -> Self {
        Self {
            style,
            edge: style.text("axes.edgecolor").unwrap_or("black").to_string(),
            face: style.text("axes.facecolor").unwrap_or("white").to_string(),
            line_width: style.number_or("axes.linewidth", 0.8),
            grid_color: style.text("geogrid.color").unwrap_or("#bbbbbb").to_string(),
            tick_size: style.number_or("tick.labelsize", 8.0),
            tick_length: points(style.number_or("tick.length", 4.0)),
            tick_pad: points(style.number_or("tick.pad", 2.0)),
            label_size: style.number_or("axes.labelsize", 9.0),
            label_pad: points(style.number_or("axes.labelpad", 4.0)),
            title_size: style.number_or("axes.titlesize", 10.0),
            title_pad: points(style.number_or("axes.titlepad", 5.0)),
        }
    }

    fn text(&self, content: impl Into<String>, at: Point, size: f64) -> Text {
        Text::new(content, at, size, self.style)
    }
}

/// Collect every primitive the figure draws, in painting order
pub fn collect_artists(figure: &Figure, metrics: &TextMetrics) -> Result<Vec<Artist>, LayoutError> {
    let look = Look::new(figure.style());
    let canvas = figure.size();
    let mut artists = Vec::new();

    for node in figure.graph().iter().filter(|node| node.is_drawn()) {
        let frame = figure.axes_box(node.id)?.scaled(canvas.width, canvas.height);
        if node.is_panel() {
            for fill in &node.fills {
                let cell = figure.cell_box(&fill.cell)?.scaled(canvas.width, canvas.height);
                let side = node.panel_of().map(|(_, side)| side).unwrap_or(Side::Right);
                panel_artists(fill, side, cell, &look, metrics, &mut artists);
            }
            continue;
        }

        let start = artists.len();
        axes_artists(figure, node, frame, &look, metrics, &mut artists);
        let extent = union_extent(&artists[start..], metrics).unwrap_or(frame);

        if let Some(label) = node.row_label.as_ref().filter(|l| !l.is_empty()) {
            artists.push(Artist::Text(
                look.text(label.as_str(), Point::new(extent.x - look.label_pad, frame.center().y), look.title_size)
                    .anchored(TextAnchor::Middle, Baseline::Bottom)
                    .rotated()
                    .bold(true)
                    .class("row-label"),
            ));
        }
        if let Some(label) = node.col_label.as_ref().filter(|l| !l.is_empty()) {
            artists.push(Artist::Text(
                look.text(label.as_str(), Point::new(frame.center().x, extent.y - look.title_pad), look.title_size)
                    .anchored(TextAnchor::Middle, Baseline::Bottom)
                    .bold(true)
                    .class("col-label"),
            ));
        }
    }

    if let (Some(title), Some(at)) = (figure.suptitle(), figure.suptitle_position()) {
        let style = figure.style();
        artists.push(Artist::Text(
            look.text(
                title,
                Point::new(at.x * canvas.width, at.y * canvas.height),
                style.number_or("figure.titlesize", 12.0),
            )
            .anchored(TextAnchor::Middle, Baseline::Bottom)
            .bold(style.text("figure.titleweight") == Some("bold"))
            .class("suptitle"),
        ));
    }
    Ok(artists)
}

/// Maps data coordinates into a frame
struct DataMap {
    frame: BoundingBox,
    x: (f64, f64),
    y: (f64, f64),
}

impl DataMap {
    fn new(frame: BoundingBox, node: &AxesNode) -> Self {
        let (x, y) = match node.kind {
            AxesKind::GeoLatLon => ((-180.0, 180.0), (-90.0, 90.0)),
            _ => (node.limits(Axis::X), node.limits(Axis::Y)),
        };
        Self { frame, x, y }
    }

    fn px(&self, x: f64) -> f64 {
        self.frame.x + (x - self.x.0) / (self.x.1 - self.x.0) * self.frame.width
    }

    fn py(&self, y: f64) -> f64 {
        self.frame.bottom() - (y - self.y.0) / (self.y.1 - self.y.0) * self.frame.height
    }

    fn point(&self, x: f64, y: f64) -> Point {
        Point::new(self.px(x), self.py(y))
    }
}

fn axes_artists(
    figure: &Figure,
    node: &AxesNode,
    frame: BoundingBox,
    look: &Look,
    metrics: &TextMetrics,
    out: &mut Vec<Artist>,
) {
    let graph = figure.graph();
    let map = DataMap::new(frame, node);

    out.push(Artist::Rect {
        bbox: frame,
        fill: Some(look.face.clone()),
        stroke: None,
        stroke_width: 0.0,
        class: "axes-face",
    });

    // outward extent of tick labels per axis, for placing axis labels
    let mut label_offset = [look.tick_length + look.tick_pad; 2];
    if node.kind.supports(Capability::GeoGridlines) {
        geo_gridlines(node, &map, look, metrics, &mut label_offset, out);
    } else if node.kind.supports(Capability::TickLabels) {
        for axis in Axis::BOTH {
            let visible = graph.tick_labels_visible(axis, node.id);
            let offset = cartesian_ticks(axis, &map, visible, look, metrics, out);
            label_offset[axis.index()] += offset;
        }
    }

    // a series whose points were all non-finite draws nothing
    for series in node.series.iter().filter(|series| !series.x.is_empty()) {
        let color = series
            .color
            .clone()
            .unwrap_or_else(|| look.edge.clone());
        let pts: Vec<Point> = series
            .x
            .iter()
            .zip(&series.y)
            .map(|(x, y)| map.point(*x, *y))
            .collect();
        match series.kind {
            PlotKind::Line => out.push(Artist::Polyline {
                points: pts,
                stroke: color,
                stroke_width: 1.5,
                class: "series",
            }),
            PlotKind::Scatter => out.extend(pts.into_iter().map(|center| Artist::Marker {
                center,
                radius: points(2.5),
                fill: color.clone(),
            })),
            PlotKind::FillBetween => {
                let lower = series.y2.as_deref().unwrap_or(&[]);
                let mut outline = pts;
                outline.extend(
                    series
                        .x
                        .iter()
                        .zip(lower)
                        .rev()
                        .map(|(x, y)| map.point(*x, *y)),
                );
                out.push(Artist::Polygon {
                    points: outline,
                    fill: color,
                    class: "series",
                });
            }
        }
    }

    out.push(Artist::Rect {
        bbox: frame,
        fill: None,
        stroke: Some(look.edge.clone()),
        stroke_width: look.line_width,
        class: "axes-frame",
    });

    for axis in Axis::BOTH {
        if !graph.axis_label_visible(axis, node.id) {
            continue;
        }
        let Some(text) = graph.axis_label_text(axis, node.id) else {
            continue;
        };
        let center = node.axis(axis).span_label_at;
        let offset = label_offset[axis.index()] + look.label_pad;
        let label = match axis {
            Axis::X => {
                let x = center.map_or(frame.center().x, |f| f * figure.size().width);
                look.text(text, Point::new(x, frame.bottom() + offset), look.label_size)
                    .anchored(TextAnchor::Middle, Baseline::Top)
            }
            Axis::Y => {
                let y = center.map_or(frame.center().y, |f| f * figure.size().height);
                look.text(text, Point::new(frame.x - offset, y), look.label_size)
                    .anchored(TextAnchor::Middle, Baseline::Bottom)
                    .rotated()
            }
        };
        out.push(Artist::Text(label.class("axis-label")));
    }

    if let Some(title) = node.title.as_ref().filter(|t| !t.is_empty()) {
        let loc = node.title_loc;
        let inset = if loc.inside { look.title_pad } else { 0.0 };
        let (x, anchor) = match loc.align {
            HAlign::Left => (frame.x + inset, TextAnchor::Start),
            HAlign::Center => (frame.center().x, TextAnchor::Middle),
            HAlign::Right => (frame.right() - inset, TextAnchor::End),
        };
        let (y, baseline) = if loc.inside {
            (frame.y + look.title_pad, Baseline::Top)
        } else {
            (frame.y - look.title_pad, Baseline::Bottom)
        };
        out.push(Artist::Text(
            look.text(title.as_str(), Point::new(x, y), look.title_size)
                .anchored(anchor, baseline)
                .class("title"),
        ));
    }

    if let Some(label) = abc_label(node, look.style) {
        let size = look.style.number_or("abc.size", 10.0);
        out.push(Artist::Text(
            look.text(
                label,
                Point::new(frame.x + look.title_pad, frame.y + look.title_pad),
                size,
            )
            .anchored(TextAnchor::Start, Baseline::Top)
            .bold(true)
            .class("abc"),
        ));
    }
}

/// Tick marks and labels on the bottom or left edge. Returns how far the
/// tick labels reach beyond the ticks.
fn cartesian_ticks(
    axis: Axis,
    map: &DataMap,
    labels: bool,
    look: &Look,
    metrics: &TextMetrics,
    out: &mut Vec<Artist>,
) -> f64 {
    let (lo, hi) = match axis {
        Axis::X => map.x,
        Axis::Y => map.y,
    };
    let ticks = nice_ticks(lo, hi, TICK_COUNT);
    let step = tick_step(&ticks);
    let frame = map.frame;
    let mut reach: f64 = 0.0;
    for value in ticks {
        let text = format_tick(value, step);
        let (from, to, label) = match axis {
            Axis::X => {
                let x = map.px(value);
                let tip = frame.bottom() + look.tick_length;
                (
                    Point::new(x, frame.bottom()),
                    Point::new(x, tip),
                    look.text(text, Point::new(x, tip + look.tick_pad), look.tick_size)
                        .anchored(TextAnchor::Middle, Baseline::Top),
                )
            }
            Axis::Y => {
                let y = map.py(value);
                let tip = frame.x - look.tick_length;
                (
                    Point::new(frame.x, y),
                    Point::new(tip, y),
                    look.text(text, Point::new(tip - look.tick_pad, y), look.tick_size)
                        .anchored(TextAnchor::End, Baseline::Middle),
                )
            }
        };
        out.push(Artist::line(from, to, &look.edge, look.line_width, "tick"));
        if labels {
            let size = label.extent(metrics);
            reach = reach.max(match axis {
                Axis::X => size.height,
                Axis::Y => size.width,
            });
            out.push(Artist::Text(label.class("tick-label")));
        }
    }
    reach
}

fn geo_gridlines(
    node: &AxesNode,
    map: &DataMap,
    look: &Look,
    metrics: &TextMetrics,
    label_offset: &mut [f64; 2],
    out: &mut Vec<Artist>,
) {
    let style = look.style;
    let frame = map.frame;
    let lon0 = match node.kind {
        AxesKind::GeoLatLon => 0.0,
        _ => (map.x.0 + map.x.1) / 2.0,
    };
    let inside = |value: f64, (lo, hi): (f64, f64)| value >= lo.min(hi) && value <= lo.max(hi);
    let mut reach = [0.0f64; 2];

    for lon in longitude_gridlines(lon0, style.number_or("geogrid.lonstep", 60.0)) {
        if !inside(lon, map.x) {
            continue;
        }
        let x = map.px(lon);
        out.push(Artist::line(
            Point::new(x, frame.y),
            Point::new(x, frame.bottom()),
            &look.grid_color,
            0.5,
            "gridline",
        ));
        let label = look
            .text(format_longitude(lon), Point::new(x, frame.bottom() + look.tick_pad), look.tick_size)
            .anchored(TextAnchor::Middle, Baseline::Top);
        reach[0] = reach[0].max(label.extent(metrics).height);
        out.push(Artist::Text(label.class("tick-label")));
    }
    let latmax = style.number_or("geogrid.latmax", 80.0);
    for lat in latitude_gridlines(style.number_or("geogrid.latstep", 30.0), latmax) {
        if !inside(lat, map.y) {
            continue;
        }
        let y = map.py(lat);
        out.push(Artist::line(
            Point::new(frame.x, y),
            Point::new(frame.right(), y),
            &look.grid_color,
            0.5,
            "gridline",
        ));
        let label = look
            .text(format_latitude(lat), Point::new(frame.x - look.tick_pad, y), look.tick_size)
            .anchored(TextAnchor::End, Baseline::Middle);
        reach[1] = reach[1].max(label.extent(metrics).width);
        out.push(Artist::Text(label.class("tick-label")));
    }
    // gridline labels sit next to the frame without tick marks
    for axis in Axis::BOTH {
        label_offset[axis.index()] = look.tick_pad + reach[axis.index()];
    }
}

/// Subplot number rendered with the `abc.style` template, e.g. "a", "A" or "(a)"
fn abc_label(node: &AxesNode, style: &dyn StyleSource) -> Option<String> {
    if style.flag("abc.enabled") != Some(true) {
        return None;
    }
    let number = node.number?;
    let index = ((number - 1) % 26) as u8;
    let template = style.text("abc.style").unwrap_or("a");
    if template.contains('A') {
        Some(template.replacen('A', &char::from(b'A' + index).to_string(), 1))
    } else if template.contains('a') {
        Some(template.replacen('a', &char::from(b'a' + index).to_string(), 1))
    } else {
        Some(char::from(b'a' + index).to_string())
    }
}

fn panel_artists(
    fill: &PanelFill,
    side: Side,
    cell: BoundingBox,
    look: &Look,
    metrics: &TextMetrics,
    out: &mut Vec<Artist>,
) {
    match &fill.content {
        PanelContent::Legend { entries } => {
            let size = look.style.number_or("legend.fontsize", 8.0);
            let row = points(size * 1.4);
            let swatch = points(size * 2.0);
            let gap = points(size * 0.6);
            let mut cursor = Point::new(cell.x + gap, cell.y + row / 2.0);
            for entry in entries {
                out.push(Artist::line(
                    cursor,
                    Point::new(cursor.x + swatch, cursor.y),
                    &entry.color,
                    2.0,
                    "legend-swatch",
                ));
                let text = look
                    .text(entry.label.as_str(), Point::new(cursor.x + swatch + gap, cursor.y), size)
                    .anchored(TextAnchor::Start, Baseline::Middle)
                    .class("legend-label");
                let width = text.extent(metrics).width;
                out.push(Artist::Text(text));
                match side.axis_along() {
                    Axis::X => cursor.x += swatch + 2.0 * gap + width,
                    Axis::Y => cursor.y += row,
                }
            }
        }
        PanelContent::Colorbar {
            label,
            colors,
            ticks,
        } => {
            let along = side.axis_along();
            let count = colors.len().max(1);
            for (i, color) in colors.iter().enumerate() {
                let t0 = i as f64 / count as f64;
                let t1 = (i + 1) as f64 / count as f64;
                // colorbars run left to right, or bottom to top
                let bbox = match along {
                    Axis::X => BoundingBox::from_edges(
                        cell.x + t0 * cell.width,
                        cell.y,
                        cell.x + t1 * cell.width,
                        cell.bottom(),
                    ),
                    Axis::Y => BoundingBox::from_edges(
                        cell.x,
                        cell.bottom() - t1 * cell.height,
                        cell.right(),
                        cell.bottom() - t0 * cell.height,
                    ),
                };
                out.push(Artist::Rect {
                    bbox,
                    fill: Some(color.clone()),
                    stroke: None,
                    stroke_width: 0.0,
                    class: "colorbar-segment",
                });
            }
            out.push(Artist::Rect {
                bbox: cell,
                fill: None,
                stroke: Some(look.edge.clone()),
                stroke_width: look.line_width,
                class: "colorbar-frame",
            });

            let mut reach: f64 = 0.0;
            let n = ticks.len();
            for (i, tick) in ticks.iter().enumerate() {
                let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.5 };
                let (from, to, label) = match side {
                    Side::Bottom | Side::Top => {
                        let x = cell.x + t * cell.width;
                        let (edge, dir) = if side == Side::Bottom {
                            (cell.bottom(), 1.0)
                        } else {
                            (cell.y, -1.0)
                        };
                        let tip = edge + dir * look.tick_length;
                        let baseline = if side == Side::Bottom { Baseline::Top } else { Baseline::Bottom };
                        (
                            Point::new(x, edge),
                            Point::new(x, tip),
                            look.text(tick.as_str(), Point::new(x, tip + dir * look.tick_pad), look.tick_size)
                                .anchored(TextAnchor::Middle, baseline),
                        )
                    }
                    Side::Left | Side::Right => {
                        let y = cell.bottom() - t * cell.height;
                        let (edge, dir) = if side == Side::Right {
                            (cell.right(), 1.0)
                        } else {
                            (cell.x, -1.0)
                        };
                        let tip = edge + dir * look.tick_length;
                        let anchor = if side == Side::Right { TextAnchor::Start } else { TextAnchor::End };
                        (
                            Point::new(edge, y),
                            Point::new(tip, y),
                            look.text(tick.as_str(), Point::new(tip + dir * look.tick_pad, y), look.tick_size)
                                .anchored(anchor, Baseline::Middle),
                        )
                    }
                };
                out.push(Artist::line(from, to, &look.edge, look.line_width, "tick"));
                let extent = label.extent(metrics);
                reach = reach.max(match along {
                    Axis::X => extent.height,
                    Axis::Y => extent.width,
                });
                out.push(Artist::Text(label.class("tick-label")));
            }

            if let Some(text) = label.as_ref().filter(|l| !l.is_empty()) {
                let offset = look.tick_length + look.tick_pad + reach + look.label_pad;
                let text = match side {
                    Side::Bottom => look
                        .text(text.as_str(), Point::new(cell.center().x, cell.bottom() + offset), look.label_size)
                        .anchored(TextAnchor::Middle, Baseline::Top),
                    Side::Top => look
                        .text(text.as_str(), Point::new(cell.center().x, cell.y - offset), look.label_size)
                        .anchored(TextAnchor::Middle, Baseline::Bottom),
                    Side::Right => look
                        .text(text.as_str(), Point::new(cell.right() + offset, cell.center().y), look.label_size)
                        .anchored(TextAnchor::Middle, Baseline::Top)
                        .rotated(),
                    Side::Left => look
                        .text(text.as_str(), Point::new(cell.x - offset, cell.center().y), look.label_size)
                        .anchored(TextAnchor::Middle, Baseline::Bottom)
                        .rotated(),
                };
                out.push(Artist::Text(text.class("axis-label")));
            }
        }
    }
}
