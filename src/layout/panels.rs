//! Panel factory: carve side panels out of a rectangle
//!
//! A target rectangle is split into a nested grid with one main cell and one
//! cell per requested side. Panels keep their requested physical thickness;
//! the main cell receives whatever remains. Corner positions, where a
//! vertical and a horizontal panel would meet, stay unallocated.
//!
//! ```text
//!          +-----+---------+-----+
//!          |     |   top   |     |
//!          +-----+---------+-----+
//!          |left |  main   |right|
//!          +-----+---------+-----+
//!          |     | bottom  |     |
//!          +-----+---------+-----+
//! ```

use super::error::LayoutError;
use super::gridspec::GridParams;
use super::types::{Axis, CellSpan, Margins, Side, Size};

/// Requested thickness of one side panel and its gap to the main region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRequest {
    pub side: Side,
    /// Panel thickness (inches)
    pub width: f64,
    /// Gap between the panel and the main region (inches)
    pub space: f64,
}

impl PanelRequest {
    pub fn new(side: Side, width: f64, space: f64) -> Self {
        Self { side, width, space }
    }
}

/// A solved panel arrangement: grid parameters plus the allocated cells
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    pub params: GridParams,
    pub main: CellSpan,
    /// Panel cells in creation order (left, right, top, bottom)
    pub panels: Vec<(Side, CellSpan)>,
}

impl PanelLayout {
    /// Cell allocated to a side panel, if requested
    pub fn panel(&self, side: Side) -> Option<&CellSpan> {
        self.panels
            .iter()
            .find(|(s, _)| *s == side)
            .map(|(_, span)| span)
    }

    /// All allocated cells, main first
    pub fn cells(&self) -> impl Iterator<Item = &CellSpan> {
        std::iter::once(&self.main).chain(self.panels.iter().map(|(_, span)| span))
    }

    /// Grid positions deliberately left without an owner
    pub fn empty_corners(&self) -> Vec<CellSpan> {
        let nrows = self.params.nrows();
        let ncols = self.params.ncols();
        let mut corners = Vec::new();
        for row in 0..nrows {
            for col in 0..ncols {
                let cell = CellSpan::at(row, col);
                if !self.cells().any(|c| *c == cell) {
                    corners.push(cell);
                }
            }
        }
        corners
    }
}

/// Build the nested grid that holds a main region and its side panels.
///
/// `extent` is the physical size of the target rectangle and `margins` the
/// whitespace kept inside it.
pub fn panel_layout(
    extent: Size,
    requests: &[PanelRequest],
    margins: Margins,
) -> Result<PanelLayout, LayoutError> {
    let mut by_side: [Option<PanelRequest>; 4] = [None; 4];
    for request in requests {
        if !(request.width > 0.0) {
            return Err(LayoutError::configuration(format!(
                "{} panel width must be positive, got {}",
                request.side, request.width
            )));
        }
        if !(request.space >= 0.0) {
            return Err(LayoutError::configuration(format!(
                "{} panel space must be non-negative, got {}",
                request.side, request.space
            )));
        }
        let slot = &mut by_side[side_slot(request.side)];
        if slot.is_some() {
            return Err(LayoutError::configuration(format!(
                "{} panel requested twice",
                request.side
            )));
        }
        *slot = Some(*request);
    }
    let get = |side: Side| by_side[side_slot(side)];

    let (width_ratios, wspace) = axis_tracks(
        extent.width,
        margins.along(Axis::X),
        get(Side::Left),
        get(Side::Right),
    )?;
    let (height_ratios, hspace) = axis_tracks(
        extent.height,
        margins.along(Axis::Y),
        get(Side::Top),
        get(Side::Bottom),
    )?;

    let main_row = usize::from(get(Side::Top).is_some());
    let main_col = usize::from(get(Side::Left).is_some());

    let mut panels = Vec::new();
    for side in Side::ALL {
        if get(side).is_none() {
            continue;
        }
        let span = match side {
            Side::Left => CellSpan::at(main_row, 0),
            Side::Right => CellSpan::at(main_row, main_col + 1),
            Side::Top => CellSpan::at(0, main_col),
            Side::Bottom => CellSpan::at(main_row + 1, main_col),
        };
        panels.push((side, span));
    }

    Ok(PanelLayout {
        params: GridParams {
            width_ratios,
            height_ratios,
            wspace,
            hspace,
            margins,
        },
        main: CellSpan::at(main_row, main_col),
        panels,
    })
}

fn side_slot(side: Side) -> usize {
    match side {
        Side::Left => 0,
        Side::Right => 1,
        Side::Top => 2,
        Side::Bottom => 3,
    }
}

/// Ratios and gaps along one axis. Ratios are physical sizes, which the grid
/// solver reproduces exactly because they already sum to the available span.
fn axis_tracks(
    total: f64,
    (margin_lo, margin_hi): (f64, f64),
    leading: Option<PanelRequest>,
    trailing: Option<PanelRequest>,
) -> Result<(Vec<f64>, Vec<f64>), LayoutError> {
    let panels: f64 = [leading, trailing]
        .iter()
        .flatten()
        .map(|p| p.width + p.space)
        .sum();
    let main = total - margin_lo - margin_hi - panels;
    if main <= 0.0 {
        let limit = total - margin_lo - margin_hi;
        return Err(LayoutError::configuration(format!(
            "panels need {:.3}in but only {:.3}in are available; main region would have size {:.3}in",
            panels, limit, main
        )));
    }

    let mut ratios = Vec::with_capacity(3);
    let mut spacing = Vec::with_capacity(2);
    if let Some(p) = leading {
        ratios.push(p.width);
        spacing.push(p.space);
    }
    ratios.push(main);
    if let Some(p) = trailing {
        ratios.push(p.width);
        spacing.push(p.space);
    }
    Ok((ratios, spacing))
}

/// Grid and cell for stacked panel content.
///
/// Panel content `index` of `count` gets its own slot across the panel's
/// thickness, with index 0 next to the parent axes. `length` is the fraction
/// of the panel's long side used by the content, centered.
pub fn stacked_slot(
    side: Side,
    index: usize,
    count: usize,
    length: f64,
) -> Result<(GridParams, CellSpan), LayoutError> {
    if count == 0 || index >= count {
        return Err(LayoutError::configuration(format!(
            "panel slot {} out of range for {} stacked items",
            index, count
        )));
    }
    if !(length > 0.0 && length <= 1.0) {
        return Err(LayoutError::configuration(format!(
            "panel content length must be in (0, 1], got {}",
            length
        )));
    }

    let along: Vec<f64> = if length < 1.0 {
        let rest = (1.0 - length) / 2.0;
        vec![rest, length, rest]
    } else {
        vec![1.0]
    };
    let center = along.len() / 2;
    let slot = if side.is_leading() {
        count - 1 - index
    } else {
        index
    };

    let (params, span) = match side.axis_along() {
        Axis::X => (
            GridParams::uniform(count, along.len()).with_width_ratios(along),
            CellSpan::at(slot, center),
        ),
        Axis::Y => (
            GridParams::uniform(along.len(), count).with_height_ratios(along),
            CellSpan::at(center, slot),
        ),
    };
    Ok((params, span))
}
