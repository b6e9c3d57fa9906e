//! The figure: canvas, grid arena and axes
//!
//! A figure owns every grid it uses in a flat arena. Grid 0 partitions the
//! canvas into the subplot block and any figure-level panels; grid 1 is the
//! subplot grid inside that block. Axes with side panels get their own nested
//! grid carved from their subplot cell, and stacked panel content gets a
//! nested grid inside its panel. Each grid records the cell it lives in, and
//! since parents are always created before their children, re-solving the
//! arena in index order lays out the whole tree.
//!
//! Geometry changes are staged on a copy of the arena and only committed
//! when every grid solves.

use std::fmt;

use tracing::debug;

use super::axes::{
    ArtistHandle, AxesKind, AxesNode, Capability, PanelContent, PanelFill, PanelSlot, TitleLoc,
};
use super::config::LayoutConfig;
use super::error::LayoutError;
use super::graph::AxesGraph;
use super::gridspec::{GridParams, GridSpec};
use super::labels;
use super::panels::{panel_layout, stacked_slot, PanelLayout, PanelRequest};
use super::plotting::PlotCall;
use super::tight::{tighten, Backend, EdgeSlot, TightReport};
use super::types::{AxesId, Axis, BoundingBox, CellRef, CellSpan, GridId, Margins, Point, Side, Size};
use crate::style::{Style, StyleSource};

const OUTER_GRID: GridId = GridId(0);
const SUBPLOT_GRID: GridId = GridId(1);

/// Shape of the subplot grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub nrows: usize,
    pub ncols: usize,
    pub width_ratios: Option<Vec<f64>>,
    pub height_ratios: Option<Vec<f64>>,
    /// Column gaps (inches); one value for all gaps or one per gap
    pub wspace: Option<Vec<f64>>,
    /// Row gaps (inches); one value for all gaps or one per gap
    pub hspace: Option<Vec<f64>>,
    /// Figure margins (inches)
    pub margins: Option<Margins>,
}

impl GridConfig {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            width_ratios: None,
            height_ratios: None,
            wspace: None,
            hspace: None,
            margins: None,
        }
    }

    pub fn with_width_ratios(mut self, ratios: Vec<f64>) -> Self {
        self.width_ratios = Some(ratios);
        self
    }

    pub fn with_height_ratios(mut self, ratios: Vec<f64>) -> Self {
        self.height_ratios = Some(ratios);
        self
    }

    pub fn with_spacing(mut self, wspace: f64, hspace: f64) -> Self {
        self.wspace = Some(vec![wspace]);
        self.hspace = Some(vec![hspace]);
        self
    }

    pub fn with_wspace_each(mut self, wspace: Vec<f64>) -> Self {
        self.wspace = Some(wspace);
        self
    }

    pub fn with_hspace_each(mut self, hspace: Vec<f64>) -> Self {
        self.hspace = Some(hspace);
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = Some(margins);
        self
    }

    fn params(&self, config: &LayoutConfig) -> GridParams {
        let gaps = |given: &Option<Vec<f64>>, default: f64, count: usize| match given {
            Some(values) if values.len() == 1 && count != 1 => vec![values[0]; count],
            Some(values) => values.clone(),
            None => vec![default; count],
        };
        let mut params = GridParams::uniform(self.nrows, self.ncols);
        if let Some(ratios) = &self.width_ratios {
            params.width_ratios = ratios.clone();
        }
        if let Some(ratios) = &self.height_ratios {
            params.height_ratios = ratios.clone();
        }
        params.wspace = gaps(&self.wspace, config.wspace, self.ncols.saturating_sub(1));
        params.hspace = gaps(&self.hspace, config.hspace, self.nrows.saturating_sub(1));
        params
    }
}

/// Requested size of a side panel; unset values use the layout defaults
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanelSize {
    /// Panel thickness (inches)
    pub width: Option<f64>,
    /// Gap to the axes, or for figure panels to the canvas edge (inches)
    pub space: Option<f64>,
}

impl PanelSize {
    pub fn new(width: f64, space: f64) -> Self {
        Self {
            width: Some(width),
            space: Some(space),
        }
    }

    pub fn with_width(width: f64) -> Self {
        Self {
            width: Some(width),
            space: None,
        }
    }
}

/// A panel spanning the whole subplot block on one side of the canvas.
///
/// From the canvas edge inwards the edge holds `space`, the panel, the
/// figure margin and then the subplot block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigurePanel {
    pub side: Side,
    pub width: f64,
    pub space: f64,
}

/// Everything needed to create one subplot
#[derive(Debug, Clone, PartialEq)]
pub struct SubplotRequest {
    pub cell: CellSpan,
    pub share_x: Option<AxesId>,
    pub share_y: Option<AxesId>,
    pub kind: AxesKind,
    pub panels: Vec<(Side, PanelSize)>,
}

impl SubplotRequest {
    pub fn new(cell: CellSpan) -> Self {
        Self {
            cell,
            share_x: None,
            share_y: None,
            kind: AxesKind::Cartesian,
            panels: Vec::new(),
        }
    }

    pub fn at(row: usize, col: usize) -> Self {
        Self::new(CellSpan::at(row, col))
    }

    pub fn with_kind(mut self, kind: AxesKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_share_x(mut self, axes: AxesId) -> Self {
        self.share_x = Some(axes);
        self
    }

    pub fn with_share_y(mut self, axes: AxesId) -> Self {
        self.share_y = Some(axes);
        self
    }

    pub fn with_panel(mut self, side: Side, size: PanelSize) -> Self {
        self.panels.push((side, size));
        self
    }
}

#[derive(Debug, Clone)]
enum GridRole {
    /// Parameters used as given
    Fixed(GridParams),
    /// Parameters re-derived from the frame's physical size on every solve
    Panels {
        requests: Vec<PanelRequest>,
        margins: Margins,
    },
}

#[derive(Debug, Clone)]
struct GridNode {
    role: GridRole,
    parent: Option<CellRef>,
    spec: Option<GridSpec>,
}

impl GridNode {
    fn new(role: GridRole, parent: Option<CellRef>) -> Self {
        Self {
            role,
            parent,
            spec: None,
        }
    }
}

/// Solve every grid of an arena in index order
fn solve_arena(grids: &mut [GridNode], size: Size) -> Result<(), LayoutError> {
    for index in 0..grids.len() {
        let frame = match &grids[index].parent {
            None => BoundingBox::unit(),
            Some(cell) => {
                if cell.grid.0 >= index {
                    return Err(LayoutError::configuration(format!(
                        "grid {} is nested in grid {} which is not solved yet",
                        index, cell.grid.0
                    )));
                }
                grids[cell.grid.0]
                    .spec
                    .as_ref()
                    .ok_or_else(|| LayoutError::configuration("parent grid has no geometry"))?
                    .cell_box(&cell.span)?
            }
        };
        let params = match &grids[index].role {
            GridRole::Fixed(params) => params.clone(),
            GridRole::Panels { requests, margins } => {
                let extent = Size::new(frame.width * size.width, frame.height * size.height);
                panel_layout(extent, requests, *margins)?.params
            }
        };
        let node = &mut grids[index];
        match node.spec.as_mut() {
            Some(spec) => spec.update(params, frame, size)?,
            None => node.spec = Some(GridSpec::new(params, frame, size)?),
        }
    }
    Ok(())
}

/// Point grids nested in moved cells at their new cells
fn remap_parents(grids: &mut [GridNode], moves: &[(CellRef, CellRef)]) {
    for grid in grids {
        if let Some(parent) = grid.parent.as_mut() {
            if let Some((_, to)) = moves.iter().find(|(from, _)| from == parent) {
                *parent = to.clone();
            }
        }
    }
}

/// The drawing surface with its grids, axes and figure-level labels
pub struct Figure {
    size: Size,
    config: LayoutConfig,
    style: Box<dyn StyleSource>,
    margins: Margins,
    figure_panels: Vec<FigurePanel>,
    grids: Vec<GridNode>,
    graph: AxesGraph,
    suptitle: Option<String>,
    suptitle_at: Option<Point>,
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    subplot_count: usize,
}

impl fmt::Debug for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Figure")
            .field("size", &self.size)
            .field("margins", &self.margins)
            .field("figure_panels", &self.figure_panels)
            .field("axes", &self.graph.len())
            .field("grids", &self.grids.len())
            .finish_non_exhaustive()
    }
}

/// Create a figure with default configuration and style and build its
/// subplot grid
pub fn create_figure(size: Size, grid: GridConfig) -> Result<Figure, LayoutError> {
    let mut figure = Figure::new(size, LayoutConfig::default(), Style::default())?;
    figure.init_grid(grid)?;
    Ok(figure)
}

impl Figure {
    /// An empty figure; call [`Figure::init_grid`] before adding axes
    pub fn new(
        size: Size,
        config: LayoutConfig,
        style: impl StyleSource + 'static,
    ) -> Result<Self, LayoutError> {
        if !(size.width > 0.0 && size.height > 0.0) {
            return Err(LayoutError::configuration(format!(
                "figure size must be positive, got {}x{}in",
                size.width, size.height
            )));
        }
        Ok(Self {
            size,
            margins: config.margins,
            config,
            style: Box::new(style),
            figure_panels: Vec::new(),
            grids: Vec::new(),
            graph: AxesGraph::new(),
            suptitle: None,
            suptitle_at: None,
            row_labels: Vec::new(),
            col_labels: Vec::new(),
            subplot_count: 0,
        })
    }

    /// Build the canvas and subplot grids
    pub fn init_grid(&mut self, grid: GridConfig) -> Result<(), LayoutError> {
        if self.is_initialized() {
            return Err(LayoutError::configuration("figure grid is already initialized"));
        }
        let margins = grid.margins.unwrap_or(self.margins);
        let (requests, outer) = outer_requests(margins, &self.figure_panels);
        let layout = panel_layout(self.size, &requests, outer)?;

        let mut grids = vec![
            GridNode::new(
                GridRole::Panels {
                    requests,
                    margins: outer,
                },
                None,
            ),
            GridNode::new(
                GridRole::Fixed(grid.params(&self.config)),
                Some(CellRef::new(OUTER_GRID, layout.main)),
            ),
        ];
        solve_arena(&mut grids, self.size)?;
        debug!(
            "initialized {}x{} subplot grid on a {:.2}x{:.2}in canvas",
            grid.nrows, grid.ncols, self.size.width, self.size.height
        );
        self.grids = grids;
        self.margins = margins;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.grids.len() > SUBPLOT_GRID.0
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn style(&self) -> &dyn StyleSource {
        self.style.as_ref()
    }

    pub fn graph(&self) -> &AxesGraph {
        &self.graph
    }

    pub fn figure_panels(&self) -> &[FigurePanel] {
        &self.figure_panels
    }

    pub fn axes(&self, id: AxesId) -> Result<&AxesNode, LayoutError> {
        self.graph.node(id)
    }

    pub fn axes_mut(&mut self, id: AxesId) -> Result<&mut AxesNode, LayoutError> {
        self.graph.node_mut(id)
    }

    /// Solved grid by id
    pub fn grid(&self, id: GridId) -> Option<&GridSpec> {
        self.grids.get(id.0).and_then(|grid| grid.spec.as_ref())
    }

    pub fn subplot_grid(&self) -> Option<&GridSpec> {
        self.grid(SUBPLOT_GRID)
    }

    pub fn suptitle(&self) -> Option<&str> {
        self.suptitle.as_deref()
    }

    /// Anchor of the figure title, once placed by a draw
    pub fn suptitle_position(&self) -> Option<Point> {
        self.suptitle_at
    }

    /// Figure-level panel on a side
    pub fn figure_panel(&self, side: Side) -> Option<AxesId> {
        self.graph
            .iter()
            .find(|node| node.kind == AxesKind::Panel { parent: None, side })
            .map(|node| node.id)
    }

    /// Fractional box of a cell
    pub fn cell_box(&self, cell: &CellRef) -> Result<BoundingBox, LayoutError> {
        self.grid(cell.grid)
            .ok_or(LayoutError::NotInitialized)?
            .cell_box(&cell.span)
    }

    /// Physical size of a cell
    pub fn cell_size(&self, cell: &CellRef) -> Result<Size, LayoutError> {
        self.grid(cell.grid)
            .ok_or(LayoutError::NotInitialized)?
            .cell_size(&cell.span)
    }

    /// Fractional box of an axes' drawing region
    pub fn axes_box(&self, id: AxesId) -> Result<BoundingBox, LayoutError> {
        self.cell_box(&self.graph.node(id)?.cell)
    }

    /// The subplot block in inches, excluding figure panels and margins
    pub fn block_box(&self) -> Result<BoundingBox, LayoutError> {
        let frame = self.subplot_grid().ok_or(LayoutError::NotInitialized)?.frame();
        Ok(frame.scaled(self.size.width, self.size.height))
    }

    fn subplot_cell(&self, span: &CellSpan, skip: Option<AxesId>) -> Result<CellRef, LayoutError> {
        let grid = self.subplot_grid().ok_or(LayoutError::NotInitialized)?;
        grid.cell_box(span)?;
        let overlaps = |a: &std::ops::Range<usize>, b: &std::ops::Range<usize>| {
            a.start < b.end && b.start < a.end
        };
        if let Some(other) = self.graph.iter().find(|node| {
            !node.is_panel()
                && Some(node.id) != skip
                && overlaps(&node.position().rows, &span.rows)
                && overlaps(&node.position().cols, &span.cols)
        }) {
            return Err(LayoutError::configuration(format!(
                "cell rows {:?} cols {:?} is already used by {}",
                span.rows, span.cols, other
            )));
        }
        Ok(CellRef::new(SUBPLOT_GRID, span.clone()))
    }

    fn panel_request(&self, side: Side, size: PanelSize) -> PanelRequest {
        PanelRequest::new(
            side,
            size.width.unwrap_or(self.config.panel_width),
            size.space.unwrap_or(self.config.panel_space),
        )
    }

    /// Create an axes in a subplot cell, with optional side panels and
    /// share links
    pub fn add_subplot(&mut self, request: SubplotRequest) -> Result<AxesId, LayoutError> {
        let cell = self.subplot_cell(&request.cell, None)?;
        if request.kind.is_panel() {
            return Err(LayoutError::configuration(
                "panels are created with add_panel, not add_subplot",
            ));
        }

        let mut panels = request.panels.clone();
        panels.sort_by_key(|(side, _)| *side);
        let requests: Vec<PanelRequest> = panels
            .iter()
            .map(|(side, size)| self.panel_request(*side, *size))
            .collect();
        panel_layout(self.cell_size(&cell)?, &requests, Margins::zero())?;

        for (axis, target) in [(Axis::X, request.share_x), (Axis::Y, request.share_y)] {
            if let Some(target) = target {
                let other = self.graph.node(target)?;
                if !request.kind.supports(Capability::Share)
                    || !other.kind.supports(Capability::Share)
                {
                    return Err(LayoutError::link(
                        axis,
                        format!("{} axes cannot share with {}", kind_name(request.kind), other),
                    ));
                }
            }
        }

        // panels and links touch the grids and graph; restore both if any fails
        let saved = (self.grids.clone(), self.graph.clone(), self.subplot_count);
        match self.insert_subplot(&request, cell, panels) {
            Ok(id) => Ok(id),
            Err(err) => {
                (self.grids, self.graph, self.subplot_count) = saved;
                Err(err)
            }
        }
    }

    fn insert_subplot(
        &mut self,
        request: &SubplotRequest,
        cell: CellRef,
        panels: Vec<(Side, PanelSize)>,
    ) -> Result<AxesId, LayoutError> {
        let id = self.graph.next_id();
        let mut node = AxesNode::new(id, request.kind, cell.clone(), cell);
        self.subplot_count += 1;
        node.number = Some(self.subplot_count);
        self.graph.insert(node);
        debug!("created {} at rows {:?} cols {:?}", id, request.cell.rows, request.cell.cols);

        for (side, size) in panels {
            self.add_panel(id, side, size)?;
        }
        for (axis, target) in [(Axis::X, request.share_x), (Axis::Y, request.share_y)] {
            if let Some(target) = target {
                self.link_share_edgewise(axis, id, target)?;
            }
        }
        Ok(id)
    }

    /// Link so that the merged group's leader is the edge-most of the two
    /// current leaders: bottom-most for x, left-most for y
    fn link_share_edgewise(&mut self, axis: Axis, new: AxesId, target: AxesId) -> Result<(), LayoutError> {
        let rank = |id: AxesId| -> Result<i64, LayoutError> {
            let leader = self.graph.node(self.graph.share_leader(axis, id))?;
            let position = leader.position();
            Ok(match axis {
                Axis::X => position.rows.end as i64,
                Axis::Y => -(position.cols.start as i64),
            })
        };
        if rank(new)? > rank(target)? {
            self.graph.link_share(axis, target, new)
        } else {
            self.graph.link_share(axis, new, target)
        }
    }

    /// Attach a side panel to an axes, re-carving its subplot cell
    pub fn add_panel(&mut self, axes: AxesId, side: Side, size: PanelSize) -> Result<AxesId, LayoutError> {
        let node = self.graph.node(axes)?;
        if node.is_panel() {
            return Err(LayoutError::configuration(format!(
                "cannot attach a panel to {}",
                node
            )));
        }
        if node.panel(side).is_some() {
            return Err(LayoutError::configuration(format!(
                "{} already has a {} panel",
                axes, side
            )));
        }
        let mut requests = node.panel_requests.clone();
        requests.push(self.panel_request(side, size));
        let layout = panel_layout(self.cell_size(&node.host)?, &requests, Margins::zero())?;

        let mut grids = self.grids.clone();
        let grid_id = node.panel_grid.unwrap_or(GridId(grids.len()));
        let mut moves = vec![(node.cell.clone(), CellRef::new(grid_id, layout.main.clone()))];
        for (existing, panel) in node.panels() {
            let from = self.graph.node(panel)?.cell.clone();
            let to = layout
                .panel(existing)
                .cloned()
                .ok_or_else(|| LayoutError::configuration(format!("lost the {} panel", existing)))?;
            moves.push((from, CellRef::new(grid_id, to)));
        }
        remap_parents(&mut grids, &moves);
        let role = GridRole::Panels {
            requests: requests.clone(),
            margins: Margins::zero(),
        };
        match grids.get_mut(grid_id.0) {
            Some(grid) => grid.role = role,
            None => grids.push(GridNode::new(role, Some(node.host.clone()))),
        }
        solve_arena(&mut grids, self.size)?;

        let host = node.host.clone();
        self.commit(grids, self.size, &moves);
        let parent = self.graph.node_mut(axes)?;
        parent.panel_grid = Some(grid_id);
        parent.panel_requests = requests;

        let span = layout
            .panel(side)
            .cloned()
            .ok_or_else(|| LayoutError::configuration(format!("no cell for the {} panel", side)))?;
        let id = self.graph.next_id();
        let kind = AxesKind::Panel {
            parent: Some(axes),
            side,
        };
        self.graph
            .insert(AxesNode::new(id, kind, CellRef::new(grid_id, span), host));
        self.graph.attach_panel(axes, id)?;
        debug!("attached {} panel {} to {}", side, id, axes);
        Ok(id)
    }

    /// Add a panel spanning the subplot block on one side of the canvas
    pub fn add_figure_panel(&mut self, side: Side, size: PanelSize) -> Result<AxesId, LayoutError> {
        if !self.is_initialized() {
            return Err(LayoutError::NotInitialized);
        }
        if self.figure_panel(side).is_some() {
            return Err(LayoutError::configuration(format!(
                "figure already has a {} panel",
                side
            )));
        }
        let mut panels = self.figure_panels.clone();
        panels.push(FigurePanel {
            side,
            width: size.width.unwrap_or(self.config.panel_width),
            space: size.space.unwrap_or(self.config.panel_space),
        });
        let layout = self.relayout_outer(self.size, self.margins, panels)?;

        let span = layout
            .panel(side)
            .cloned()
            .ok_or_else(|| LayoutError::configuration(format!("no cell for the {} panel", side)))?;
        let cell = CellRef::new(OUTER_GRID, span);
        let id = self.graph.next_id();
        let kind = AxesKind::Panel { parent: None, side };
        self.graph.insert(AxesNode::new(id, kind, cell.clone(), cell));
        debug!("added {} figure panel {}", side, id);
        Ok(id)
    }

    /// Re-solve the arena with new canvas-level geometry. Returns the new
    /// canvas partition.
    fn relayout_outer(
        &mut self,
        size: Size,
        margins: Margins,
        panels: Vec<FigurePanel>,
    ) -> Result<PanelLayout, LayoutError> {
        if !self.is_initialized() {
            return Err(LayoutError::NotInitialized);
        }
        let (requests, outer) = outer_requests(margins, &panels);
        let layout = panel_layout(size, &requests, outer)?;

        let mut moves = vec![(
            self.grids[SUBPLOT_GRID.0]
                .parent
                .clone()
                .ok_or_else(|| LayoutError::configuration("subplot grid lost its parent"))?,
            CellRef::new(OUTER_GRID, layout.main.clone()),
        )];
        for node in self.graph.iter() {
            if let AxesKind::Panel { parent: None, side } = node.kind {
                if let Some(span) = layout.panel(side) {
                    moves.push((node.cell.clone(), CellRef::new(OUTER_GRID, span.clone())));
                }
            }
        }

        let mut grids = self.grids.clone();
        remap_parents(&mut grids, &moves);
        grids[OUTER_GRID.0].role = GridRole::Panels {
            requests,
            margins: outer,
        };
        solve_arena(&mut grids, size)?;

        self.commit(grids, size, &moves);
        self.margins = margins;
        self.figure_panels = panels;
        Ok(layout)
    }

    fn commit(&mut self, grids: Vec<GridNode>, size: Size, moves: &[(CellRef, CellRef)]) {
        self.grids = grids;
        self.size = size;
        for node in self.graph.iter_mut() {
            if let Some((_, to)) = moves.iter().find(|(from, _)| *from == node.cell) {
                node.cell = to.clone();
            }
            for fill in &mut node.fills {
                if let Some((_, to)) = moves.iter().find(|(from, _)| *from == fill.cell) {
                    fill.cell = to.clone();
                }
            }
        }
    }

    /// Move an axes (with its panels) to another subplot cell
    pub fn move_axes(&mut self, axes: AxesId, span: CellSpan) -> Result<(), LayoutError> {
        let node = self.graph.node(axes)?;
        if node.is_panel() {
            return Err(LayoutError::configuration(format!(
                "{} moves with its parent",
                node
            )));
        }
        let from = node.host.clone();
        let to = self.subplot_cell(&span, Some(axes))?;
        let panels: Vec<AxesId> = node.panels().map(|(_, id)| id).collect();
        let moves = vec![(from, to.clone())];

        let mut grids = self.grids.clone();
        remap_parents(&mut grids, &moves);
        solve_arena(&mut grids, self.size)?;
        self.commit(grids, self.size, &moves);

        for id in std::iter::once(axes).chain(panels) {
            self.graph.node_mut(id)?.host = to.clone();
        }
        debug!("moved {} to rows {:?} cols {:?}", axes, span.rows, span.cols);
        Ok(())
    }

    /// Whitespace at each canvas edge: the figure margin, or the outer gap
    /// of the figure panel occupying that edge
    pub fn edge_whitespace(&self) -> Margins {
        let mut edges = self.margins;
        for panel in &self.figure_panels {
            edges.set(panel.side, panel.space);
        }
        edges
    }

    /// Which value controls the whitespace at an edge
    pub fn edge_slot(&self, side: Side) -> EdgeSlot {
        if self.figure_panels.iter().any(|panel| panel.side == side) {
            EdgeSlot::PanelSpace
        } else {
            EdgeSlot::Margin
        }
    }

    /// Set the edge whitespace and canvas size together, keeping every
    /// other physical size
    pub fn set_edge_whitespace(&mut self, edges: Margins, size: Size) -> Result<(), LayoutError> {
        if !(size.width > 0.0 && size.height > 0.0) {
            return Err(LayoutError::configuration(format!(
                "figure size must be positive, got {:.3}x{:.3}in",
                size.width, size.height
            )));
        }
        let mut margins = self.margins;
        let mut panels = self.figure_panels.clone();
        for side in Side::ALL {
            match panels.iter_mut().find(|panel| panel.side == side) {
                Some(panel) => panel.space = edges.get(side),
                None => margins.set(side, edges.get(side)),
            }
        }
        self.relayout_outer(size, margins, panels)?;
        Ok(())
    }

    /// Put content into a panel, optionally as item `index` of `count`
    /// stacked items
    pub fn fill_panel(
        &mut self,
        panel: AxesId,
        content: PanelContent,
        slot: PanelSlot,
    ) -> Result<ArtistHandle, LayoutError> {
        let node = self.graph.node(panel)?;
        let side = match node.panel_of() {
            Some((_, side)) if node.kind.supports(Capability::HostContent) => side,
            _ => {
                return Err(LayoutError::configuration(format!(
                    "{} cannot hold legends or colorbars",
                    node
                )))
            }
        };
        let panel_cell = node.cell.clone();

        let cell = if slot.is_full() {
            panel_cell
        } else {
            let (params, span) = stacked_slot(side, slot.index, slot.count, slot.length)?;
            let existing = self.grids.iter().position(|grid| {
                grid.parent.as_ref() == Some(&panel_cell)
                    && matches!(&grid.role, GridRole::Fixed(p) if *p == params)
            });
            let grid_id = match existing {
                Some(index) => GridId(index),
                None => {
                    let mut grids = self.grids.clone();
                    grids.push(GridNode::new(GridRole::Fixed(params), Some(panel_cell)));
                    solve_arena(&mut grids, self.size)?;
                    self.grids = grids;
                    GridId(self.grids.len() - 1)
                }
            };
            CellRef::new(grid_id, span)
        };

        Ok(self
            .graph
            .node_mut(panel)?
            .push_fill(PanelFill { content, slot, cell }))
    }

    /// Plot data on an axes
    pub fn plot(&mut self, axes: AxesId, call: PlotCall) -> Result<ArtistHandle, LayoutError> {
        let cycle: Vec<String> = self
            .style
            .list("axes.prop_cycle")
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        self.graph.node_mut(axes)?.plot(call, &cycle)
    }

    pub fn set_title(
        &mut self,
        axes: AxesId,
        text: impl Into<String>,
        loc: TitleLoc,
    ) -> Result<(), LayoutError> {
        self.graph.node_mut(axes)?.set_title(text, loc);
        Ok(())
    }

    pub fn set_axis_label(
        &mut self,
        axes: AxesId,
        axis: Axis,
        text: impl Into<String>,
    ) -> Result<(), LayoutError> {
        self.graph.node_mut(axes)?.set_axis_label(axis, text);
        Ok(())
    }

    /// Label the rows of the subplot grid; one label is broadcast to all rows
    pub fn set_row_labels(&mut self, labels: Vec<String>) -> Result<usize, LayoutError> {
        let placed = labels::place_row_labels(&mut self.graph, &labels)?;
        self.row_labels = labels;
        Ok(placed)
    }

    /// Label the columns of the subplot grid
    pub fn set_col_labels(&mut self, labels: Vec<String>) -> Result<usize, LayoutError> {
        let placed = labels::place_col_labels(&mut self.graph, &labels)?;
        self.col_labels = labels;
        Ok(placed)
    }

    pub fn set_suptitle(&mut self, text: impl Into<String>) {
        self.suptitle = Some(text.into());
    }

    pub fn link_share_x(&mut self, a: AxesId, b: AxesId) -> Result<(), LayoutError> {
        self.graph.link_share(Axis::X, a, b)
    }

    pub fn link_share_y(&mut self, a: AxesId, b: AxesId) -> Result<(), LayoutError> {
        self.graph.link_share(Axis::Y, a, b)
    }

    pub fn link_span_x(&mut self, members: &[AxesId], owner: AxesId) -> Result<usize, LayoutError> {
        self.graph.link_span(Axis::X, members, owner)
    }

    pub fn link_span_y(&mut self, members: &[AxesId], owner: AxesId) -> Result<usize, LayoutError> {
        self.graph.link_span(Axis::Y, members, owner)
    }

    /// Recompute every span group from the current geometry
    pub fn refresh_spans(&mut self) -> Result<(), LayoutError> {
        for index in 0..self.graph.spans().len() {
            let members = self
                .graph
                .span(index)
                .map(|group| group.members.clone())
                .unwrap_or_default();
            let boxes = members
                .iter()
                .map(|id| Ok((*id, self.axes_box(*id)?)))
                .collect::<Result<Vec<_>, LayoutError>>()?;
            self.graph.refresh_span(index, |id| {
                boxes
                    .iter()
                    .find(|(member, _)| *member == id)
                    .map(|(_, bbox)| *bbox)
                    .ok_or(LayoutError::UnknownAxes(id))
            })?;
        }
        Ok(())
    }

    fn place_suptitle(&mut self) -> Result<(), LayoutError> {
        if self.suptitle.as_ref().map_or(true, |t| t.is_empty()) {
            self.suptitle_at = None;
            return Ok(());
        }
        let offset = labels::suptitle_needs_offset(&self.graph);
        let block = self.block_box()?;
        self.suptitle_at = Some(labels::suptitle_position(
            block,
            self.size,
            self.style.as_ref(),
            offset,
        ));
        Ok(())
    }

    /// Run one tight-layout pass against a backend
    pub fn tight_layout<B: Backend + ?Sized>(
        &mut self,
        backend: &B,
        pad: f64,
    ) -> Result<TightReport, LayoutError> {
        tighten(self, backend, pad)
    }

    /// Reconcile labels, tighten if configured, then paint
    pub fn draw<B: Backend>(&mut self, backend: &mut B) -> Result<B::Output, LayoutError> {
        if !self.is_initialized() {
            return Err(LayoutError::NotInitialized);
        }
        let rows = self.row_labels.clone();
        labels::place_row_labels(&mut self.graph, &rows)?;
        let cols = self.col_labels.clone();
        labels::place_col_labels(&mut self.graph, &cols)?;
        for axis in Axis::BOTH {
            self.graph.sync_limits(axis);
        }
        self.refresh_spans()?;
        self.place_suptitle()?;

        if self.config.tight {
            let pad = self.config.tight_pad;
            tighten(self, &*backend, pad)?;
            self.refresh_spans()?;
            self.place_suptitle()?;
        }
        Ok(backend.paint(self))
    }
}

/// Figure panel requests and outer margins for the canvas partition.
///
/// Seen from an edge holding a figure panel, the outer gap is the panel's
/// space and the figure margin sits between the panel and the subplots.
fn outer_requests(margins: Margins, panels: &[FigurePanel]) -> (Vec<PanelRequest>, Margins) {
    let mut outer = margins;
    let requests = panels
        .iter()
        .map(|panel| {
            outer.set(panel.side, panel.space);
            PanelRequest::new(panel.side, panel.width, margins.get(panel.side))
        })
        .collect();
    (requests, outer)
}

fn kind_name(kind: AxesKind) -> &'static str {
    match kind {
        AxesKind::Cartesian => "cartesian",
        AxesKind::GeoTransform | AxesKind::GeoLatLon => "geographic",
        AxesKind::Panel { .. } => "panel",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::axes::LegendEntry;
    use pretty_assertions::assert_eq;

    fn figure_2x2() -> Figure {
        create_figure(
            Size::new(6.0, 4.0),
            GridConfig::new(2, 2)
                .with_spacing(0.1, 0.1)
                .with_margins(Margins::uniform(0.5)),
        )
        .unwrap()
    }

    #[test]
    fn test_uninitialized_figure() {
        let mut figure = Figure::new(Size::new(4.0, 3.0), LayoutConfig::default(), Style::default()).unwrap();
        assert!(!figure.is_initialized());
        assert!(matches!(
            figure.add_subplot(SubplotRequest::at(0, 0)),
            Err(LayoutError::NotInitialized)
        ));
    }

    #[test]
    fn test_subplot_cells_do_not_overlap() {
        let mut figure = figure_2x2();
        figure.add_subplot(SubplotRequest::new(CellSpan::new(0..1, 0..2))).unwrap();
        assert!(figure.add_subplot(SubplotRequest::at(0, 1)).is_err());
        assert!(figure.add_subplot(SubplotRequest::at(2, 0)).is_err());
        let id = figure.add_subplot(SubplotRequest::at(1, 0)).unwrap();
        assert_eq!(figure.axes(id).unwrap().number, Some(2));
    }

    #[test]
    fn test_panel_keeps_parent_cell_identity() {
        let mut figure = figure_2x2();
        let axes = figure.add_subplot(SubplotRequest::at(0, 0)).unwrap();
        let host = figure.cell_box(&figure.axes(axes).unwrap().host).unwrap();
        let right = figure.add_panel(axes, Side::Right, PanelSize::new(0.3, 0.0)).unwrap();
        let left = figure.add_panel(axes, Side::Left, PanelSize::new(0.2, 0.0)).unwrap();

        let main = figure.axes_box(axes).unwrap();
        let right_box = figure.axes_box(right).unwrap();
        let left_box = figure.axes_box(left).unwrap();
        assert!((left_box.x - host.x).abs() < 1e-9);
        assert!((right_box.right() - host.right()).abs() < 1e-9);
        assert!((right_box.width * 6.0 - 0.3).abs() < 1e-9);
        assert!((left_box.width * 6.0 - 0.2).abs() < 1e-9);
        assert!((main.x - left_box.right()).abs() < 1e-9);
        assert_eq!(figure.axes(axes).unwrap().panel(Side::Right), Some(right));
    }

    #[test]
    fn test_duplicate_panel_is_rejected() {
        let mut figure = figure_2x2();
        let axes = figure.add_subplot(SubplotRequest::at(0, 0)).unwrap();
        figure.add_panel(axes, Side::Bottom, PanelSize::default()).unwrap();
        assert!(figure.add_panel(axes, Side::Bottom, PanelSize::default()).is_err());
    }

    #[test]
    fn test_failed_subplot_leaves_no_trace() {
        let mut figure = figure_2x2();
        let first = figure.add_subplot(SubplotRequest::at(0, 0)).unwrap();
        let grids = figure.grids.len();
        let request = SubplotRequest::at(0, 1)
            .with_panel(Side::Left, PanelSize::default())
            .with_panel(Side::Left, PanelSize::default());
        assert!(figure.add_subplot(request).is_err());
        assert_eq!(figure.graph().len(), 1);
        assert_eq!(figure.grids.len(), grids);

        // the cell is still free and numbering continues from the first axes
        let second = figure.add_subplot(SubplotRequest::at(0, 1)).unwrap();
        assert_eq!(figure.axes(first).unwrap().number, Some(1));
        assert_eq!(figure.axes(second).unwrap().number, Some(2));
    }

    #[test]
    fn test_oversized_panel_leaves_geometry() {
        let mut figure = figure_2x2();
        let axes = figure.add_subplot(SubplotRequest::at(0, 0)).unwrap();
        let before = figure.axes_box(axes).unwrap();
        let result = figure.add_panel(axes, Side::Right, PanelSize::with_width(10.0));
        assert!(matches!(result, Err(LayoutError::Configuration { .. })));
        assert_eq!(figure.axes_box(axes).unwrap(), before);
        assert_eq!(figure.axes(axes).unwrap().panel(Side::Right), None);
    }

    #[test]
    fn test_stacked_fills_share_a_grid() {
        let mut figure = figure_2x2();
        let axes = figure.add_subplot(SubplotRequest::at(0, 0)).unwrap();
        let panel = figure.add_panel(axes, Side::Bottom, PanelSize::new(0.4, 0.1)).unwrap();
        let legend = PanelContent::Legend {
            entries: vec![LegendEntry {
                label: "a".into(),
                color: "red".into(),
            }],
        };
        figure
            .fill_panel(panel, legend.clone(), PanelSlot::new(0, 2, 0.5))
            .unwrap();
        figure
            .fill_panel(panel, legend, PanelSlot::new(1, 2, 0.5))
            .unwrap();
        let fills = &figure.axes(panel).unwrap().fills;
        assert_eq!(fills[0].cell.grid, fills[1].cell.grid);
        let first = figure.cell_box(&fills[0].cell).unwrap();
        let second = figure.cell_box(&fills[1].cell).unwrap();
        let outer = figure.axes_box(panel).unwrap();
        assert!(first.y < second.y);
        assert!((first.width - outer.width / 2.0).abs() < 1e-9);
        assert!(figure.axes(panel).unwrap().is_drawn());
    }

    #[test]
    fn test_axes_cannot_hold_content() {
        let mut figure = figure_2x2();
        let axes = figure.add_subplot(SubplotRequest::at(0, 0)).unwrap();
        let content = PanelContent::Legend { entries: vec![] };
        assert!(figure.fill_panel(axes, content, PanelSlot::full()).is_err());
    }

    #[test]
    fn test_share_hint_leader_is_edge_most() {
        let mut figure = figure_2x2();
        let top = figure.add_subplot(SubplotRequest::at(0, 0)).unwrap();
        let bottom = figure
            .add_subplot(SubplotRequest::at(1, 0).with_share_x(top))
            .unwrap();
        let right = figure
            .add_subplot(SubplotRequest::at(0, 1).with_share_y(top))
            .unwrap();
        assert_eq!(figure.graph().share_leader(Axis::X, top), bottom);
        assert_eq!(figure.graph().share_leader(Axis::Y, right), top);
    }

    #[test]
    fn test_figure_panel_order_from_edge() {
        let mut figure = figure_2x2();
        let panel = figure
            .add_figure_panel(Side::Right, PanelSize::new(0.25, 0.15))
            .unwrap();
        let panel_box = figure.axes_box(panel).unwrap().scaled(6.0, 4.0);
        let block = figure.block_box().unwrap();
        assert!((6.0 - panel_box.right() - 0.15).abs() < 1e-9);
        assert!((panel_box.x - block.right() - 0.5).abs() < 1e-9);
        assert_eq!(figure.edge_slot(Side::Right), EdgeSlot::PanelSpace);
        assert!((figure.edge_whitespace().right - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_move_axes_carries_panels() {
        let mut figure = figure_2x2();
        let axes = figure.add_subplot(SubplotRequest::at(0, 0)).unwrap();
        let panel = figure.add_panel(axes, Side::Top, PanelSize::default()).unwrap();
        figure.move_axes(axes, CellSpan::at(1, 1)).unwrap();
        let host = figure.cell_box(&figure.axes(axes).unwrap().host).unwrap();
        let panel_box = figure.axes_box(panel).unwrap();
        assert!((panel_box.y - host.y).abs() < 1e-9);
        assert!(host.x > 0.5);
    }
}
