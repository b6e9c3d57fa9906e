//! Axes nodes: the plot regions of a figure
//!
//! All plot regions share one [`AxesNode`] type. What a region can do is
//! decided by its [`AxesKind`] through [`AxesKind::supports`], so side
//! panels and geographic regions need no separate node types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::error::LayoutError;
use super::panels::PanelRequest;
use super::plotting::{Pipeline, PlotCall};
use super::types::{AxesId, Axis, CellRef, CellSpan, GridId, Side};

/// Kind tag of a plot region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxesKind {
    /// Ordinary x/y axes
    Cartesian,
    /// Geographic axes whose data is passed through a projection transform
    GeoTransform,
    /// Geographic axes that take raw longitude/latitude coordinates
    GeoLatLon,
    /// A side panel; `parent` is `None` for figure-level panels
    Panel { parent: Option<AxesId>, side: Side },
}

/// Behaviors a plot region may or may not support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Joining share groups
    Share,
    /// Numeric tick labels
    TickLabels,
    /// Accepting plot calls
    PlotData,
    /// Holding legend or colorbar content
    HostContent,
    /// Longitude/latitude gridlines
    GeoGridlines,
}

impl AxesKind {
    pub fn supports(self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            AxesKind::Cartesian => matches!(capability, Share | TickLabels | PlotData),
            AxesKind::GeoTransform | AxesKind::GeoLatLon => {
                matches!(capability, PlotData | GeoGridlines)
            }
            AxesKind::Panel { .. } => matches!(capability, Share | HostContent),
        }
    }

    pub fn is_panel(self) -> bool {
        matches!(self, AxesKind::Panel { .. })
    }

    pub fn is_geographic(self) -> bool {
        matches!(self, AxesKind::GeoTransform | AxesKind::GeoLatLon)
    }
}

impl FromStr for AxesKind {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cartesian" | "xy" => Ok(AxesKind::Cartesian),
            "geo" | "transform" => Ok(AxesKind::GeoTransform),
            "latlon" => Ok(AxesKind::GeoLatLon),
            other => Err(LayoutError::configuration(format!(
                "unknown axes kind '{}' (expected cartesian, geo or latlon)",
                other
            ))),
        }
    }
}

/// Horizontal alignment of a title
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Placement of an axes title: above the frame or inside its top edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleLoc {
    pub inside: bool,
    pub align: HAlign,
}

impl Default for TitleLoc {
    fn default() -> Self {
        Self {
            inside: false,
            align: HAlign::Center,
        }
    }
}

impl FromStr for TitleLoc {
    type Err = LayoutError;

    /// Parse codes like `"oc"` (outside center), `"il"` (inside left) or `"r"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut loc = TitleLoc::default();
        for ch in s.trim().chars() {
            match ch {
                'l' => loc.align = HAlign::Left,
                'c' => loc.align = HAlign::Center,
                'r' => loc.align = HAlign::Right,
                'o' => loc.inside = false,
                'i' => loc.inside = true,
                _ => {
                    return Err(LayoutError::configuration(format!(
                        "invalid title location '{}'",
                        s
                    )))
                }
            }
        }
        Ok(loc)
    }
}

/// Opaque handle to something drawn on an axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtistHandle {
    pub axes: AxesId,
    pub kind: ArtistKind,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtistKind {
    Series,
    Legend,
    Colorbar,
}

/// One legend row
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

/// Content placed in a side panel
#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    Legend {
        entries: Vec<LegendEntry>,
    },
    Colorbar {
        label: Option<String>,
        colors: Vec<String>,
        ticks: Vec<String>,
    },
}

impl PanelContent {
    fn artist_kind(&self) -> ArtistKind {
        match self {
            PanelContent::Legend { .. } => ArtistKind::Legend,
            PanelContent::Colorbar { .. } => ArtistKind::Colorbar,
        }
    }
}

/// Where in a panel content goes: item `index` of `count` stacked items,
/// using `length` of the panel's long side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSlot {
    pub index: usize,
    pub count: usize,
    pub length: f64,
}

impl PanelSlot {
    pub fn new(index: usize, count: usize, length: f64) -> Self {
        Self {
            index,
            count,
            length,
        }
    }

    /// The whole panel
    pub fn full() -> Self {
        Self::new(0, 1, 1.0)
    }

    pub fn is_full(&self) -> bool {
        self.count == 1 && self.index == 0 && self.length == 1.0
    }
}

impl Default for PanelSlot {
    fn default() -> Self {
        Self::full()
    }
}

/// Content placed in a panel and the sub-cell it occupies
#[derive(Debug, Clone, PartialEq)]
pub struct PanelFill {
    pub content: PanelContent,
    pub slot: PanelSlot,
    pub cell: CellRef,
}

/// Per-axis state of a plot region
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisState {
    /// Axis label text
    pub label: Option<String>,
    /// Range covered by plotted data
    pub data_limits: Option<(f64, f64)>,
    /// Range shown, synchronized across a share group
    pub view_limits: Option<(f64, f64)>,
    /// Canvas-fraction center of the spanning label drawn by this axes
    pub span_label_at: Option<f64>,
}

/// One logical plot region
#[derive(Debug, Clone)]
pub struct AxesNode {
    pub id: AxesId,
    pub kind: AxesKind,
    /// Cell the region is drawn in
    pub cell: CellRef,
    /// Cell of the subplot grid hosting the region and its panels
    pub host: CellRef,
    /// Subplot number, for non-panel axes
    pub number: Option<usize>,
    pub title: Option<String>,
    pub title_loc: TitleLoc,
    pub row_label: Option<String>,
    pub col_label: Option<String>,
    pub series: Vec<PlotCall>,
    pub fills: Vec<PanelFill>,
    pub(crate) panels: BTreeMap<Side, AxesId>,
    pub(crate) panel_grid: Option<GridId>,
    pub(crate) panel_requests: Vec<PanelRequest>,
    pub(crate) axes: [AxisState; 2],
    pub(crate) span: [Option<usize>; 2],
    pipeline: Pipeline,
}

impl AxesNode {
    pub fn new(id: AxesId, kind: AxesKind, cell: CellRef, host: CellRef) -> Self {
        Self {
            id,
            kind,
            cell,
            host,
            number: None,
            title: None,
            title_loc: TitleLoc::default(),
            row_label: None,
            col_label: None,
            series: Vec::new(),
            fills: Vec::new(),
            panels: BTreeMap::new(),
            panel_grid: None,
            panel_requests: Vec::new(),
            axes: [AxisState::default(), AxisState::default()],
            span: [None, None],
            pipeline: Pipeline::for_axes(kind),
        }
    }

    /// Position of the hosting cell in the subplot grid
    pub fn position(&self) -> &CellSpan {
        &self.host.span
    }

    pub fn is_panel(&self) -> bool {
        self.kind.is_panel()
    }

    /// Parent axes and side, for panels
    pub fn panel_of(&self) -> Option<(Option<AxesId>, Side)> {
        match self.kind {
            AxesKind::Panel { parent, side } => Some((parent, side)),
            _ => None,
        }
    }

    /// Panel attached on a side
    pub fn panel(&self, side: Side) -> Option<AxesId> {
        self.panels.get(&side).copied()
    }

    /// All attached panels in side order
    pub fn panels(&self) -> impl Iterator<Item = (Side, AxesId)> + '_ {
        self.panels.iter().map(|(side, id)| (*side, *id))
    }

    /// Panels stay invisible until they hold content
    pub fn is_drawn(&self) -> bool {
        !self.is_panel() || !self.fills.is_empty()
    }

    pub fn axis(&self, axis: Axis) -> &AxisState {
        &self.axes[axis.index()]
    }

    /// Span group on an axis, if any
    pub fn span_group(&self, axis: Axis) -> Option<usize> {
        self.span[axis.index()]
    }

    pub fn set_axis_label(&mut self, axis: Axis, text: impl Into<String>) {
        self.axes[axis.index()].label = Some(text.into());
    }

    pub fn set_title(&mut self, text: impl Into<String>, loc: TitleLoc) {
        self.title = Some(text.into());
        self.title_loc = loc;
    }

    /// True when a title is set and drawn above the frame
    pub fn has_outside_title(&self) -> bool {
        self.title.as_ref().is_some_and(|t| !t.is_empty()) && !self.title_loc.inside
    }

    /// Limits to display: synchronized view, else data, else unit range
    pub fn limits(&self, axis: Axis) -> (f64, f64) {
        let state = self.axis(axis);
        let (lo, hi) = state.view_limits.or(state.data_limits).unwrap_or((0.0, 1.0));
        if hi > lo {
            (lo, hi)
        } else {
            (lo - 0.5, hi + 0.5)
        }
    }

    /// Plot data: run this axes' stages once, then store the series
    pub fn plot(&mut self, call: PlotCall, cycle: &[String]) -> Result<ArtistHandle, LayoutError> {
        if !self.kind.supports(Capability::PlotData) {
            return Err(LayoutError::invalid_data(format!(
                "{} holds legends or colorbars, not data",
                self.id
            )));
        }
        let processed = self.pipeline.run(call, cycle, self.series.len())?;
        Ok(self.push_series(processed))
    }

    /// Store an already processed series and extend the data limits
    fn push_series(&mut self, series: PlotCall) -> ArtistHandle {
        let ys = series.y.iter().chain(series.y2.iter().flatten());
        extend_limits(&mut self.axes[Axis::X.index()].data_limits, series.x.iter());
        extend_limits(&mut self.axes[Axis::Y.index()].data_limits, ys);
        self.series.push(series);
        ArtistHandle {
            axes: self.id,
            kind: ArtistKind::Series,
            index: self.series.len() - 1,
        }
    }

    /// Record panel content; the caller has resolved its cell
    pub(crate) fn push_fill(&mut self, fill: PanelFill) -> ArtistHandle {
        let kind = fill.content.artist_kind();
        self.fills.push(fill);
        ArtistHandle {
            axes: self.id,
            kind,
            index: self.fills.len() - 1,
        }
    }
}

fn extend_limits<'a>(limits: &mut Option<(f64, f64)>, values: impl Iterator<Item = &'a f64>) {
    for v in values {
        *limits = Some(match *limits {
            Some((lo, hi)) => (lo.min(*v), hi.max(*v)),
            None => (*v, *v),
        });
    }
}

impl fmt::Display for AxesNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AxesKind::Panel {
                parent: Some(parent),
                side,
            } => write!(f, "{} ({} panel of {})", self.id, side, parent),
            AxesKind::Panel { parent: None, side } => {
                write!(f, "{} ({} figure panel)", self.id, side)
            }
            _ => write!(f, "{}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: AxesKind) -> AxesNode {
        let cell = CellRef::new(GridId(0), CellSpan::at(0, 0));
        AxesNode::new(AxesId(0), kind, cell.clone(), cell)
    }

    #[test]
    fn test_capabilities_by_kind() {
        assert!(AxesKind::Cartesian.supports(Capability::Share));
        assert!(!AxesKind::GeoLatLon.supports(Capability::Share));
        assert!(AxesKind::GeoTransform.supports(Capability::GeoGridlines));
        let panel = AxesKind::Panel {
            parent: None,
            side: Side::Right,
        };
        assert!(panel.supports(Capability::HostContent));
        assert!(!panel.supports(Capability::PlotData));
    }

    #[test]
    fn test_title_loc_codes() {
        let loc: TitleLoc = "il".parse().unwrap();
        assert!(loc.inside);
        assert_eq!(loc.align, HAlign::Left);
        assert_eq!("".parse::<TitleLoc>().unwrap(), TitleLoc::default());
        assert!("x".parse::<TitleLoc>().is_err());
    }

    #[test]
    fn test_plot_extends_limits() {
        let mut axes = node(AxesKind::Cartesian);
        axes.plot(PlotCall::line(vec![0.0, 2.0], vec![-1.0, 4.0]), &[])
            .unwrap();
        let handle = axes
            .plot(PlotCall::line(vec![5.0], vec![1.0]), &[])
            .unwrap();
        assert_eq!(handle.index, 1);
        assert_eq!(axes.axis(Axis::X).data_limits, Some((0.0, 5.0)));
        assert_eq!(axes.axis(Axis::Y).data_limits, Some((-1.0, 4.0)));
    }

    #[test]
    fn test_panel_rejects_data() {
        let mut panel = node(AxesKind::Panel {
            parent: Some(AxesId(3)),
            side: Side::Bottom,
        });
        assert!(!panel.is_drawn());
        let result = panel.plot(PlotCall::line(vec![0.0], vec![0.0]), &[]);
        assert!(matches!(result, Err(LayoutError::InvalidData { .. })));
    }

    #[test]
    fn test_degenerate_limits_are_widened() {
        let mut axes = node(AxesKind::Cartesian);
        axes.plot(PlotCall::line(vec![1.0], vec![2.0]), &[]).unwrap();
        assert_eq!(axes.limits(Axis::X), (0.5, 1.5));
    }
}
