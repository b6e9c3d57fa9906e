//! Row, column and figure title placement

use super::error::LayoutError;
use super::graph::AxesGraph;
use super::types::{AxesId, Axis, BoundingBox, Point, Size};
use crate::style::StyleSource;

/// Top-level axes in the first column, ordered top to bottom
pub fn row_axes(graph: &AxesGraph) -> Vec<AxesId> {
    edge_axes(graph, Axis::Y)
}

/// Top-level axes in the first row, ordered left to right
pub fn col_axes(graph: &AxesGraph) -> Vec<AxesId> {
    edge_axes(graph, Axis::X)
}

fn edge_axes(graph: &AxesGraph, along: Axis) -> Vec<AxesId> {
    let mut matched: Vec<_> = graph
        .iter()
        .filter(|node| !node.is_panel())
        .filter(|node| node.position().range(along.other()).start == 0)
        .collect();
    matched.sort_by(|a, b| {
        let ka = a.position().range(along).start;
        let kb = b.position().range(along).start;
        ka.cmp(&kb).then(a.id.cmp(&b.id))
    });
    matched.into_iter().map(|node| node.id).collect()
}

/// Assign row labels to the first-column axes.
///
/// Returns how many axes received a label.
pub fn place_row_labels(graph: &mut AxesGraph, labels: &[String]) -> Result<usize, LayoutError> {
    let targets = row_axes(graph);
    assign(graph, "row", &targets, labels, |node, text| {
        if node.row_label.is_some() {
            false
        } else {
            node.row_label = Some(text.to_string());
            true
        }
    })
}

/// Assign column labels to the first-row axes
pub fn place_col_labels(graph: &mut AxesGraph, labels: &[String]) -> Result<usize, LayoutError> {
    let targets = col_axes(graph);
    assign(graph, "column", &targets, labels, |node, text| {
        if node.col_label.is_some() {
            false
        } else {
            node.col_label = Some(text.to_string());
            true
        }
    })
}

fn assign<F>(
    graph: &mut AxesGraph,
    kind: &'static str,
    targets: &[AxesId],
    labels: &[String],
    mut apply: F,
) -> Result<usize, LayoutError>
where
    F: FnMut(&mut super::axes::AxesNode, &str) -> bool,
{
    if labels.is_empty() {
        return Ok(0);
    }
    if labels.len() != 1 && labels.len() != targets.len() {
        return Err(LayoutError::count_mismatch(kind, labels.len(), targets.len()));
    }
    let mut placed = 0;
    for (i, id) in targets.iter().enumerate() {
        let text = if labels.len() == 1 { &labels[0] } else { &labels[i] };
        if text.is_empty() {
            continue;
        }
        if apply(graph.node_mut(*id)?, text) {
            placed += 1;
        }
    }
    Ok(placed)
}

/// True when something already occupies the band above the top row
pub fn suptitle_needs_offset(graph: &AxesGraph) -> bool {
    graph
        .iter()
        .filter(|node| !node.is_panel() && node.position().rows.start == 0)
        .any(|node| {
            node.has_outside_title() || node.col_label.as_ref().is_some_and(|l| !l.is_empty())
        })
}

/// Anchor of the figure title in canvas fractions: horizontally centered
/// over `block` (the subplot block, in inches, without figure panels) and
/// sitting above its top edge.
pub fn suptitle_position(
    block: BoundingBox,
    canvas: Size,
    style: &dyn StyleSource,
    offset: bool,
) -> Point {
    let pad = style.number_or("axes.titlepad", 5.0) / 72.0;
    let mut top = block.y - pad;
    if offset {
        let line = style.number_or("text.linespacing", 1.2) * style.number_or("axes.titlesize", 10.0);
        top -= line / 72.0;
    }
    Point::new(block.center().x / canvas.width, top / canvas.height)
}
