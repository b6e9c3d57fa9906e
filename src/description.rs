//! Figure description files
//!
//! A description is a TOML document naming the canvas, the subplot grid,
//! the axes placed on it and their relationships:
//!
//! ```toml
//! [figure]
//! size = [6.0, 4.0]
//! suptitle = "Results"
//!
//! [grid]
//! nrows = 1
//! ncols = 2
//!
//! [[axes]]
//! name = "left"
//! row = 0
//! col = 0
//! panels = "b"
//!
//! [[axes.plot]]
//! x = [0.0, 1.0]
//! y = [0.0, 1.0]
//! label = "model"
//!
//! [[axes]]
//! name = "right"
//! row = 0
//! col = 1
//! share_y = "left"
//!
//! [[legend]]
//! axes = "left"
//! side = "bottom"
//! ```

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::error::DescriptionError;
use crate::layout::{
    AxesId, AxesKind, CellSpan, Figure, GridConfig, LayoutConfig, LayoutError, LegendEntry,
    Margins, PanelContent, PanelSize, PanelSlot, PlotCall, PlotKind, Side, Size, SubplotRequest,
    TitleLoc,
};
use crate::style::StyleSource;
use crate::RenderError;

/// A complete figure description
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FigureDescription {
    #[serde(default)]
    pub figure: FigureSection,
    #[serde(default)]
    pub grid: GridSection,
    #[serde(default, rename = "panel")]
    pub panels: Vec<FigurePanelSpec>,
    #[serde(default)]
    pub axes: Vec<AxesSpec>,
    #[serde(default, rename = "span")]
    pub spans: Vec<SpanSpec>,
    #[serde(default, rename = "legend")]
    pub legends: Vec<LegendSpec>,
    #[serde(default, rename = "colorbar")]
    pub colorbars: Vec<ColorbarSpec>,
}

impl FigureDescription {
    /// Parse a description from TOML text
    pub fn from_toml(source: &str) -> Result<Self, DescriptionError> {
        Ok(toml::from_str(source)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FigureSection {
    /// Width and height in inches
    #[serde(default = "default_size")]
    pub size: [f64; 2],
    pub suptitle: Option<String>,
    #[serde(default)]
    pub row_labels: Vec<String>,
    #[serde(default)]
    pub col_labels: Vec<String>,
    pub margins: Option<MarginsSpec>,
}

fn default_size() -> [f64; 2] {
    [6.0, 4.0]
}

impl Default for FigureSection {
    fn default() -> Self {
        Self {
            size: default_size(),
            suptitle: None,
            row_labels: Vec::new(),
            col_labels: Vec::new(),
            margins: None,
        }
    }
}

/// Either one margin for every edge or a table of edges
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum MarginsSpec {
    Uniform(f64),
    Edges {
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
    },
}

impl From<MarginsSpec> for Margins {
    fn from(spec: MarginsSpec) -> Self {
        match spec {
            MarginsSpec::Uniform(value) => Margins::uniform(value),
            MarginsSpec::Edges {
                left,
                right,
                top,
                bottom,
            } => Margins::new(left, right, top, bottom),
        }
    }
}

/// One gap for all positions or one per gap
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Spacing {
    One(f64),
    Each(Vec<f64>),
}

impl Spacing {
    fn values(&self) -> Vec<f64> {
        match self {
            Spacing::One(value) => vec![*value],
            Spacing::Each(values) => values.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridSection {
    #[serde(default = "one")]
    pub nrows: usize,
    #[serde(default = "one")]
    pub ncols: usize,
    pub width_ratios: Option<Vec<f64>>,
    pub height_ratios: Option<Vec<f64>>,
    pub wspace: Option<Spacing>,
    pub hspace: Option<Spacing>,
}

fn one() -> usize {
    1
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            nrows: 1,
            ncols: 1,
            width_ratios: None,
            height_ratios: None,
            wspace: None,
            hspace: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FigurePanelSpec {
    pub side: String,
    pub width: Option<f64>,
    pub space: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxesSpec {
    pub name: Option<String>,
    #[serde(default)]
    pub row: usize,
    #[serde(default)]
    pub col: usize,
    #[serde(default = "one")]
    pub rowspan: usize,
    #[serde(default = "one")]
    pub colspan: usize,
    pub kind: Option<String>,
    pub share_x: Option<String>,
    pub share_y: Option<String>,
    /// Compact side list such as `"rb"`
    pub panels: Option<String>,
    pub panel_width: Option<f64>,
    pub panel_space: Option<f64>,
    pub title: Option<String>,
    pub title_loc: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    #[serde(default, rename = "plot")]
    pub plots: Vec<PlotSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlotSpec {
    #[serde(default)]
    pub kind: PlotKindSpec,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub y2: Option<Vec<f64>>,
    pub color: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotKindSpec {
    #[default]
    Line,
    Scatter,
    FillBetween,
}

impl From<PlotKindSpec> for PlotKind {
    fn from(spec: PlotKindSpec) -> Self {
        match spec {
            PlotKindSpec::Line => PlotKind::Line,
            PlotKindSpec::Scatter => PlotKind::Scatter,
            PlotKindSpec::FillBetween => PlotKind::FillBetween,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpanSpec {
    pub axis: String,
    pub members: Vec<String>,
    pub owner: String,
}

/// Item `index` of `count` stacked items using `length` of the panel
fn slot(index: Option<usize>, count: Option<usize>, length: Option<f64>) -> PanelSlot {
    PanelSlot::new(index.unwrap_or(0), count.unwrap_or(1), length.unwrap_or(1.0))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntrySpec {
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegendSpec {
    /// Owning axes; a figure panel when absent
    pub axes: Option<String>,
    pub side: String,
    /// Explicit rows; otherwise taken from labeled series
    pub entries: Option<Vec<EntrySpec>>,
    pub index: Option<usize>,
    pub count: Option<usize>,
    pub length: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorbarSpec {
    pub axes: Option<String>,
    pub side: String,
    pub label: Option<String>,
    pub colors: Vec<String>,
    #[serde(default)]
    pub ticks: Vec<String>,
    pub index: Option<usize>,
    pub count: Option<usize>,
    pub length: Option<f64>,
}

/// Names of the axes built so far
struct Names<'a> {
    ids: HashMap<&'a str, AxesId>,
    all: Vec<&'a str>,
}

impl<'a> Names<'a> {
    fn new(desc: &'a FigureDescription) -> Self {
        Self {
            ids: HashMap::new(),
            all: desc.axes.iter().filter_map(|a| a.name.as_deref()).collect(),
        }
    }

    fn resolve(&self, name: &str) -> Result<AxesId, DescriptionError> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| DescriptionError::unknown_reference(name, self.all.iter().copied()))
    }
}

fn parse_side(field: &str, value: &str) -> Result<Side, DescriptionError> {
    value
        .parse()
        .map_err(|err: LayoutError| DescriptionError::invalid_value(field, err.to_string()))
}

/// Build a figure from a description
pub fn build_figure(
    desc: &FigureDescription,
    config: LayoutConfig,
    style: impl StyleSource + 'static,
) -> Result<Figure, RenderError> {
    let [width, height] = desc.figure.size;
    let mut figure = Figure::new(Size::new(width, height), config, style)?;

    let grid = &desc.grid;
    let mut grid_config = GridConfig::new(grid.nrows, grid.ncols);
    grid_config.width_ratios = grid.width_ratios.clone();
    grid_config.height_ratios = grid.height_ratios.clone();
    grid_config.wspace = grid.wspace.as_ref().map(Spacing::values);
    grid_config.hspace = grid.hspace.as_ref().map(Spacing::values);
    grid_config.margins = desc.figure.margins.map(Margins::from);
    figure.init_grid(grid_config)?;

    let mut figure_panels = HashMap::new();
    for panel in &desc.panels {
        let side = parse_side("panel.side", &panel.side)?;
        let size = PanelSize {
            width: panel.width,
            space: panel.space,
        };
        figure_panels.insert(side, figure.add_figure_panel(side, size)?);
    }

    let mut names = Names::new(desc);
    for spec in &desc.axes {
        let id = build_axes(&mut figure, spec, &names)?;
        if let Some(name) = spec.name.as_deref() {
            if names.ids.insert(name, id).is_some() {
                return Err(DescriptionError::invalid_value(
                    "axes.name",
                    format!("'{}' is used by more than one axes", name),
                )
                .into());
            }
        }
    }

    for span in &desc.spans {
        let members = span
            .members
            .iter()
            .map(|name| names.resolve(name))
            .collect::<Result<Vec<_>, _>>()?;
        let owner = names.resolve(&span.owner)?;
        match span.axis.as_str() {
            "x" => figure.link_span_x(&members, owner)?,
            "y" => figure.link_span_y(&members, owner)?,
            other => {
                return Err(DescriptionError::invalid_value(
                    "span.axis",
                    format!("expected \"x\" or \"y\", got \"{}\"", other),
                )
                .into())
            }
        };
    }

    let panel_for = |figure: &Figure, axes: Option<&str>, side: &str, field: &str| -> Result<AxesId, RenderError> {
        let side = parse_side(field, side)?;
        let panel = match axes {
            Some(name) => figure.axes(names.resolve(name)?)?.panel(side),
            None => figure_panels.get(&side).copied(),
        };
        panel.ok_or_else(|| {
            DescriptionError::invalid_value(
                field,
                match axes {
                    Some(name) => format!("axes '{}' has no {} panel", name, side),
                    None => format!("figure has no {} panel", side),
                },
            )
            .into()
        })
    };

    for legend in &desc.legends {
        let panel = panel_for(&figure, legend.axes.as_deref(), &legend.side, "legend.side")?;
        let entries = match &legend.entries {
            Some(entries) => entries
                .iter()
                .map(|e| LegendEntry {
                    label: e.label.clone(),
                    color: e.color.clone(),
                })
                .collect(),
            None => {
                let sources = match legend.axes.as_deref() {
                    Some(name) => vec![names.resolve(name)?],
                    None => figure.graph().iter().map(|node| node.id).collect(),
                };
                labeled_series(&figure, &sources)?
            }
        };
        figure.fill_panel(panel, PanelContent::Legend { entries }, slot(legend.index, legend.count, legend.length))?;
    }

    for colorbar in &desc.colorbars {
        let panel = panel_for(&figure, colorbar.axes.as_deref(), &colorbar.side, "colorbar.side")?;
        if colorbar.colors.is_empty() {
            return Err(DescriptionError::invalid_value("colorbar.colors", "at least one color is required").into());
        }
        let content = PanelContent::Colorbar {
            label: colorbar.label.clone(),
            colors: colorbar.colors.clone(),
            ticks: colorbar.ticks.clone(),
        };
        figure.fill_panel(panel, content, slot(colorbar.index, colorbar.count, colorbar.length))?;
    }

    if !desc.figure.row_labels.is_empty() {
        figure.set_row_labels(desc.figure.row_labels.clone())?;
    }
    if !desc.figure.col_labels.is_empty() {
        figure.set_col_labels(desc.figure.col_labels.clone())?;
    }
    if let Some(title) = &desc.figure.suptitle {
        figure.set_suptitle(title.clone());
    }
    debug!("built figure with {} axes", figure.graph().len());
    Ok(figure)
}

fn build_axes(figure: &mut Figure, spec: &AxesSpec, names: &Names) -> Result<AxesId, RenderError> {
    if spec.rowspan == 0 || spec.colspan == 0 {
        return Err(DescriptionError::invalid_value("axes.rowspan", "spans must be at least 1").into());
    }
    let cell = CellSpan::new(spec.row..spec.row + spec.rowspan, spec.col..spec.col + spec.colspan);
    let mut request = SubplotRequest::new(cell);
    if let Some(kind) = &spec.kind {
        request = request.with_kind(
            kind.parse::<AxesKind>()
                .map_err(|err| DescriptionError::invalid_value("axes.kind", err.to_string()))?,
        );
    }
    if let Some(name) = &spec.share_x {
        request = request.with_share_x(names.resolve(name)?);
    }
    if let Some(name) = &spec.share_y {
        request = request.with_share_y(names.resolve(name)?);
    }
    if let Some(sides) = &spec.panels {
        let sides = crate::layout::parse_sides(sides)
            .map_err(|err| DescriptionError::invalid_value("axes.panels", err.to_string()))?;
        for side in sides {
            request = request.with_panel(
                side,
                PanelSize {
                    width: spec.panel_width,
                    space: spec.panel_space,
                },
            );
        }
    }
    let id = figure.add_subplot(request)?;

    if let Some(title) = &spec.title {
        let loc = match &spec.title_loc {
            Some(code) => code
                .parse::<TitleLoc>()
                .map_err(|err| DescriptionError::invalid_value("axes.title_loc", err.to_string()))?,
            None => TitleLoc::default(),
        };
        figure.set_title(id, title.clone(), loc)?;
    }
    if let Some(label) = &spec.xlabel {
        figure.set_axis_label(id, crate::layout::Axis::X, label.clone())?;
    }
    if let Some(label) = &spec.ylabel {
        figure.set_axis_label(id, crate::layout::Axis::Y, label.clone())?;
    }
    for plot in &spec.plots {
        let mut call = PlotCall::new(plot.kind.into(), plot.x.clone(), plot.y.clone());
        call.y2 = plot.y2.clone();
        call.color = plot.color.clone();
        call.label = plot.label.clone();
        figure.plot(id, call)?;
    }
    Ok(id)
}

/// Legend rows for every labeled series of the given axes
fn labeled_series(figure: &Figure, axes: &[AxesId]) -> Result<Vec<LegendEntry>, LayoutError> {
    let mut entries = Vec::new();
    for id in axes {
        for series in &figure.axes(*id)?.series {
            if let (Some(label), Some(color)) = (&series.label, &series.color) {
                entries.push(LegendEntry {
                    label: label.clone(),
                    color: color.clone(),
                });
            }
        }
    }
    Ok(entries)
}
