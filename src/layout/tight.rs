//! Tight layout: trim the whitespace border around the drawn content
//!
//! One pass measures the combined extent of everything drawn, moves each
//! canvas edge so that exactly `pad` inches of whitespace remain, and grows
//! or shrinks the canvas by the same amounts. Axes and panel sizes are kept
//! in physical units, so only the border changes.

use tracing::debug;

use super::error::LayoutError;
use super::figure::Figure;
use super::gridspec::GEOMETRY_TOLERANCE;
use super::types::{BoundingBox, Margins, Side, Size};

/// A rendering backend the figure hands itself to
pub trait Backend {
    /// What a paint produces
    type Output;

    /// Combined extent of everything the backend would draw, in inches,
    /// origin at the canvas top-left
    fn measure_bounding_box(&self, figure: &Figure) -> Result<BoundingBox, LayoutError>;

    /// Paint the figure in its current geometry
    fn paint(&mut self, figure: &Figure) -> Self::Output;
}

/// The value that controls the whitespace at one canvas edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSlot {
    /// Figure margin
    Margin,
    /// Outer gap of a figure-level panel occupying the edge
    PanelSpace,
}

/// Outcome of one tight-layout pass
#[derive(Debug, Clone, PartialEq)]
pub struct TightReport {
    /// Whitespace at each edge before and after the pass (inches)
    pub before: Margins,
    pub after: Margins,
    pub canvas_before: Size,
    pub canvas_after: Size,
}

/// Measure the figure and correct its edges in a single pass.
///
/// Panel cells count as content whether or not anything is drawn in them,
/// so empty or partly filled panels keep the space they reserve.
///
/// Fails with [`LayoutError::NotInitialized`] before the subplot grid
/// exists, with the backend's error when measuring fails, and with a
/// configuration error when a corrected edge would be negative. In every
/// case the figure is left untouched.
pub fn tighten<B: Backend + ?Sized>(
    figure: &mut Figure,
    backend: &B,
    pad: f64,
) -> Result<TightReport, LayoutError> {
    if !figure.is_initialized() {
        return Err(LayoutError::NotInitialized);
    }
    if !(pad >= 0.0) {
        return Err(LayoutError::configuration(format!(
            "tight layout pad must be non-negative, got {}",
            pad
        )));
    }

    let canvas = figure.size();
    let content = reserved_extent(figure, backend.measure_bounding_box(figure)?)?;
    let before = figure.edge_whitespace();

    let mut after = before;
    for side in Side::ALL {
        // positive slack is whitespace, negative is content past the edge
        let slack = match side {
            Side::Left => content.x,
            Side::Top => content.y,
            Side::Right => canvas.width - content.right(),
            Side::Bottom => canvas.height - content.bottom(),
        };
        let mut value = before.get(side) - slack + pad;
        if value < 0.0 {
            if value < -GEOMETRY_TOLERANCE {
                return Err(LayoutError::configuration(format!(
                    "tight layout would make the {} {} negative ({:.4}in)",
                    side,
                    slot_name(figure.edge_slot(side)),
                    value
                )));
            }
            value = 0.0;
        }
        after.set(side, value);
    }

    let resized = Size::new(
        canvas.width + (after.left - before.left) + (after.right - before.right),
        canvas.height + (after.top - before.top) + (after.bottom - before.bottom),
    );
    debug!(
        "tight layout: edges l={:.3} r={:.3} t={:.3} b={:.3} -> l={:.3} r={:.3} t={:.3} b={:.3}",
        before.left,
        before.right,
        before.top,
        before.bottom,
        after.left,
        after.right,
        after.top,
        after.bottom
    );
    debug!(
        "tight layout: canvas {:.3}x{:.3}in -> {:.3}x{:.3}in",
        canvas.width, canvas.height, resized.width, resized.height
    );

    figure.set_edge_whitespace(after, resized)?;
    Ok(TightReport {
        before,
        after,
        canvas_before: canvas,
        canvas_after: resized,
    })
}

/// Extend a measured box over every panel cell
fn reserved_extent(figure: &Figure, measured: BoundingBox) -> Result<BoundingBox, LayoutError> {
    let canvas = figure.size();
    let mut extent = measured;
    for node in figure.graph().iter().filter(|node| node.is_panel()) {
        let cell = figure.axes_box(node.id)?.scaled(canvas.width, canvas.height);
        extent = extent.union(&cell);
    }
    Ok(extent)
}

fn slot_name(slot: EdgeSlot) -> &'static str {
    match slot {
        EdgeSlot::Margin => "margin",
        EdgeSlot::PanelSpace => "panel space",
    }
}
