//! Grid specification: partition of a rectangle into cells
//!
//! A [`GridSpec`] takes row/column ratios, inter-cell spacing and outer
//! margins expressed in inches, and solves them directly into fractional
//! cell boundaries inside a parent rectangle. Along each axis:
//!
//! ```text
//! cell_i = (span - margin_lo - margin_hi - sum(spacing)) * ratio_i / sum(ratio)
//! ```
//!
//! The parent rectangle is given in canvas fractions together with the
//! physical canvas size, so nested grids keep their physical spacing when the
//! canvas is resized.

use super::error::LayoutError;
use super::types::{Axis, BoundingBox, CellSpan, Margins, Size};

/// Absolute tolerance used when validating solved geometry
pub const GEOMETRY_TOLERANCE: f64 = 1e-9;

/// Sizing parameters of a grid, in physical units
#[derive(Debug, Clone, PartialEq)]
pub struct GridParams {
    /// Relative column widths, one per column
    pub width_ratios: Vec<f64>,
    /// Relative row heights, one per row
    pub height_ratios: Vec<f64>,
    /// Horizontal gaps between columns (inches), one per gap
    pub wspace: Vec<f64>,
    /// Vertical gaps between rows (inches), one per gap
    pub hspace: Vec<f64>,
    /// Outer whitespace inside the parent rectangle (inches)
    pub margins: Margins,
}

impl GridParams {
    /// Equal-ratio grid with no spacing and no margins
    pub fn uniform(nrows: usize, ncols: usize) -> Self {
        Self {
            width_ratios: vec![1.0; ncols],
            height_ratios: vec![1.0; nrows],
            wspace: vec![0.0; ncols.saturating_sub(1)],
            hspace: vec![0.0; nrows.saturating_sub(1)],
            margins: Margins::zero(),
        }
    }

    /// Use the same spacing for every gap
    pub fn with_spacing(mut self, wspace: f64, hspace: f64) -> Self {
        self.wspace = vec![wspace; self.ncols().saturating_sub(1)];
        self.hspace = vec![hspace; self.nrows().saturating_sub(1)];
        self
    }

    /// Set individual column gaps
    pub fn with_wspace_each(mut self, wspace: Vec<f64>) -> Self {
        self.wspace = wspace;
        self
    }

    /// Set individual row gaps
    pub fn with_hspace_each(mut self, hspace: Vec<f64>) -> Self {
        self.hspace = hspace;
        self
    }

    pub fn with_width_ratios(mut self, ratios: Vec<f64>) -> Self {
        self.width_ratios = ratios;
        self
    }

    pub fn with_height_ratios(mut self, ratios: Vec<f64>) -> Self {
        self.height_ratios = ratios;
        self
    }

    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn nrows(&self) -> usize {
        self.height_ratios.len()
    }

    pub fn ncols(&self) -> usize {
        self.width_ratios.len()
    }

    /// Ratios along an axis (column widths for x, row heights for y)
    pub fn ratios(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X => &self.width_ratios,
            Axis::Y => &self.height_ratios,
        }
    }

    /// Gaps along an axis
    pub fn spacing(&self, axis: Axis) -> &[f64] {
        match axis {
            Axis::X => &self.wspace,
            Axis::Y => &self.hspace,
        }
    }
}

/// A solved grid inside a parent rectangle
#[derive(Debug, Clone)]
pub struct GridSpec {
    params: GridParams,
    frame: BoundingBox,
    canvas: Size,
    cols: Vec<(f64, f64)>,
    rows: Vec<(f64, f64)>,
}

impl GridSpec {
    /// Solve a grid inside `frame` (canvas fractions) on a canvas of
    /// physical size `canvas`
    pub fn new(params: GridParams, frame: BoundingBox, canvas: Size) -> Result<Self, LayoutError> {
        let cols = solve_axis(&params, Axis::X, frame, canvas)?;
        let rows = solve_axis(&params, Axis::Y, frame, canvas)?;
        Ok(Self {
            params,
            frame,
            canvas,
            cols,
            rows,
        })
    }

    /// Re-solve the grid in place with new parameters and placement.
    ///
    /// On error the previous boundaries are kept untouched.
    pub fn update(
        &mut self,
        params: GridParams,
        frame: BoundingBox,
        canvas: Size,
    ) -> Result<(), LayoutError> {
        let solved = Self::new(params, frame, canvas)?;
        *self = solved;
        Ok(())
    }

    /// Re-solve with the current parameters inside a new placement
    pub fn relocate(&mut self, frame: BoundingBox, canvas: Size) -> Result<(), LayoutError> {
        self.update(self.params.clone(), frame, canvas)
    }

    pub fn params(&self) -> &GridParams {
        &self.params
    }

    pub fn frame(&self) -> BoundingBox {
        self.frame
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.cols.len()
    }

    /// Column boundaries as (start, end) canvas fractions
    pub fn col_bounds(&self) -> &[(f64, f64)] {
        &self.cols
    }

    /// Row boundaries as (start, end) canvas fractions, top row first
    pub fn row_bounds(&self) -> &[(f64, f64)] {
        &self.rows
    }

    /// Boundaries along an axis
    pub fn bounds(&self, axis: Axis) -> &[(f64, f64)] {
        match axis {
            Axis::X => &self.cols,
            Axis::Y => &self.rows,
        }
    }

    /// Fractional box covered by a cell span
    pub fn cell_box(&self, span: &CellSpan) -> Result<BoundingBox, LayoutError> {
        if span.rows.is_empty()
            || span.cols.is_empty()
            || span.rows.end > self.nrows()
            || span.cols.end > self.ncols()
        {
            return Err(LayoutError::configuration(format!(
                "cell rows {:?} cols {:?} outside a {}x{} grid",
                span.rows,
                span.cols,
                self.nrows(),
                self.ncols()
            )));
        }
        let left = self.cols[span.cols.start].0;
        let right = self.cols[span.cols.end - 1].1;
        let top = self.rows[span.rows.start].0;
        let bottom = self.rows[span.rows.end - 1].1;
        Ok(BoundingBox::from_edges(left, top, right, bottom))
    }

    /// Physical size of a cell span in inches
    pub fn cell_size(&self, span: &CellSpan) -> Result<Size, LayoutError> {
        let cell = self.cell_box(span)?;
        Ok(Size::new(
            cell.width * self.canvas.width,
            cell.height * self.canvas.height,
        ))
    }
}

fn solve_axis(
    params: &GridParams,
    axis: Axis,
    frame: BoundingBox,
    canvas: Size,
) -> Result<Vec<(f64, f64)>, LayoutError> {
    let ratios = params.ratios(axis);
    let spacing = params.spacing(axis);
    let (margin_lo, margin_hi) = params.margins.along(axis);
    let canvas_len = canvas.along(axis);
    let (frame_start, frame_end) = frame.interval(axis);
    let dimension = match axis {
        Axis::X => "column",
        Axis::Y => "row",
    };

    if ratios.is_empty() {
        return Err(LayoutError::configuration(format!(
            "grid needs at least one {}",
            dimension
        )));
    }
    if !(canvas_len > 0.0) || !(frame_end > frame_start) {
        return Err(LayoutError::configuration(format!(
            "parent rectangle has no {} extent",
            axis
        )));
    }
    if spacing.len() != ratios.len() - 1 {
        return Err(LayoutError::configuration(format!(
            "expected {} {} gaps, got {}",
            ratios.len() - 1,
            dimension,
            spacing.len()
        )));
    }
    if let Some(bad) = ratios.iter().find(|r| !(**r > 0.0) || !r.is_finite()) {
        return Err(LayoutError::configuration(format!(
            "{} ratio {} must be positive",
            dimension, bad
        )));
    }
    if spacing.iter().chain([&margin_lo, &margin_hi]).any(|s| !(*s >= 0.0)) {
        return Err(LayoutError::configuration(format!(
            "{} spacing and margins must be non-negative",
            dimension
        )));
    }

    let total = (frame_end - frame_start) * canvas_len;
    let available = total - margin_lo - margin_hi - spacing.iter().sum::<f64>();
    let ratio_sum: f64 = ratios.iter().sum();

    let mut bounds = Vec::with_capacity(ratios.len());
    let mut offset = margin_lo;
    for (i, ratio) in ratios.iter().enumerate() {
        let size = available * ratio / ratio_sum;
        if size <= 0.0 {
            return Err(LayoutError::configuration(format!(
                "{} {} would have size {:.3}in; only {:.3}in of {:.3}in remain after spacing and margins",
                dimension, i, size, available, total
            )));
        }
        let start = frame_start + offset / canvas_len;
        let end = frame_start + (offset + size) / canvas_len;
        bounds.push((start, end));
        offset += size;
        if let Some(gap) = spacing.get(i) {
            offset += gap;
        }
    }
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas_grid(params: GridParams, w: f64, h: f64) -> GridSpec {
        GridSpec::new(params, BoundingBox::unit(), Size::new(w, h)).unwrap()
    }

    #[test]
    fn test_single_cell_with_margins() {
        let grid = canvas_grid(
            GridParams::uniform(1, 1).with_margins(Margins::uniform(1.0)),
            4.0,
            4.0,
        );
        assert_eq!(grid.col_bounds(), &[(0.25, 0.75)]);
        assert_eq!(grid.row_bounds(), &[(0.25, 0.75)]);
    }

    #[test]
    fn test_margins_consuming_span_are_rejected() {
        let result = GridSpec::new(
            GridParams::uniform(1, 1).with_margins(Margins::uniform(1.0)),
            BoundingBox::unit(),
            Size::new(4.0, 2.0),
        );
        assert!(matches!(result, Err(LayoutError::Configuration { .. })));
    }

    #[test]
    fn test_ratios_distribute_available_space() {
        let grid = canvas_grid(
            GridParams::uniform(1, 2)
                .with_width_ratios(vec![1.0, 3.0])
                .with_spacing(1.0, 0.0),
            5.0,
            1.0,
        );
        let cols = grid.col_bounds();
        assert!((cols[0].0 - 0.0).abs() < GEOMETRY_TOLERANCE);
        assert!((cols[0].1 - 0.2).abs() < GEOMETRY_TOLERANCE);
        assert!((cols[1].0 - 0.4).abs() < GEOMETRY_TOLERANCE);
        assert!((cols[1].1 - 1.0).abs() < GEOMETRY_TOLERANCE);
    }

    #[test]
    fn test_per_gap_spacing() {
        let grid = canvas_grid(
            GridParams::uniform(1, 3).with_wspace_each(vec![0.0, 1.0]),
            4.0,
            1.0,
        );
        let cols = grid.col_bounds();
        assert!((cols[0].1 - cols[1].0).abs() < GEOMETRY_TOLERANCE);
        assert!((cols[2].0 - cols[1].1 - 0.25).abs() < GEOMETRY_TOLERANCE);
    }

    #[test]
    fn test_spacing_exceeding_span_is_rejected() {
        let result = GridSpec::new(
            GridParams::uniform(1, 2).with_spacing(3.0, 0.0),
            BoundingBox::unit(),
            Size::new(2.0, 1.0),
        );
        assert!(matches!(result, Err(LayoutError::Configuration { .. })));
    }

    #[test]
    fn test_gap_count_must_match() {
        let result = GridSpec::new(
            GridParams::uniform(2, 2).with_wspace_each(vec![0.1, 0.1]),
            BoundingBox::unit(),
            Size::new(2.0, 2.0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_failed_update_keeps_geometry() {
        let mut grid = canvas_grid(GridParams::uniform(2, 2), 2.0, 2.0);
        let before = grid.col_bounds().to_vec();
        let bad = GridParams::uniform(2, 2).with_width_ratios(vec![1.0, 0.0]);
        assert!(grid.update(bad, BoundingBox::unit(), Size::new(2.0, 2.0)).is_err());
        assert_eq!(grid.col_bounds(), before.as_slice());
    }

    #[test]
    fn test_cell_box_spans_multiple_cells() {
        let grid = canvas_grid(GridParams::uniform(2, 2).with_spacing(0.5, 0.5), 2.5, 2.5);
        let cell = grid.cell_box(&CellSpan::new(0..2, 0..1)).unwrap();
        assert!((cell.y - 0.0).abs() < GEOMETRY_TOLERANCE);
        assert!((cell.bottom() - 1.0).abs() < GEOMETRY_TOLERANCE);
        assert!((cell.width - 0.4).abs() < GEOMETRY_TOLERANCE);
    }

    #[test]
    fn test_cell_box_out_of_range() {
        let grid = canvas_grid(GridParams::uniform(1, 1), 1.0, 1.0);
        assert!(grid.cell_box(&CellSpan::at(1, 0)).is_err());
    }

    #[test]
    fn test_nested_frame_keeps_physical_spacing() {
        let frame = BoundingBox::new(0.5, 0.0, 0.5, 1.0);
        let grid = GridSpec::new(
            GridParams::uniform(1, 2).with_spacing(0.2, 0.0),
            frame,
            Size::new(4.0, 1.0),
        )
        .unwrap();
        let cols = grid.col_bounds();
        // 2in of parent width: 0.2in gap, 0.9in per column
        assert!((cols[0].0 - 0.5).abs() < GEOMETRY_TOLERANCE);
        assert!(((cols[1].0 - cols[0].1) * 4.0 - 0.2).abs() < GEOMETRY_TOLERANCE);
        assert!(((cols[0].1 - cols[0].0) * 4.0 - 0.9).abs() < GEOMETRY_TOLERANCE);
    }
}
