//! Grid solving against physical sizes

use panelplot::layout::{Axis, BoundingBox, CellSpan, GridParams, GridSpec, LayoutError, Margins, Size};

const TOL: f64 = 1e-9;

fn solve(params: GridParams, canvas: Size) -> Result<GridSpec, LayoutError> {
    GridSpec::new(params, BoundingBox::unit(), canvas)
}

#[test]
fn test_two_by_two_cells_are_equal_and_symmetric() {
    let canvas = Size::new(6.0, 4.0);
    let grid = solve(
        GridParams::uniform(2, 2)
            .with_spacing(0.1, 0.1)
            .with_margins(Margins::uniform(0.5)),
        canvas,
    )
    .unwrap();

    let cells: Vec<Size> = [(0, 0), (0, 1), (1, 0), (1, 1)]
        .iter()
        .map(|(r, c)| grid.cell_size(&CellSpan::at(*r, *c)).unwrap())
        .collect();
    for cell in &cells {
        assert!((cell.width - 2.45).abs() < TOL, "width {}", cell.width);
        assert!((cell.height - 1.45).abs() < TOL, "height {}", cell.height);
    }

    let cols = grid.col_bounds();
    assert!((cols[0].0 + cols[1].1 - 1.0).abs() < TOL);
    assert!((cols[0].1 + cols[1].0 - 1.0).abs() < TOL);
    let rows = grid.row_bounds();
    assert!((rows[0].0 + rows[1].1 - 1.0).abs() < TOL);
}

#[test]
fn test_boundaries_increase_and_sum_to_span() {
    let canvas = Size::new(7.0, 5.0);
    let params = GridParams::uniform(3, 4)
        .with_width_ratios(vec![1.0, 2.0, 0.5, 3.0])
        .with_height_ratios(vec![2.0, 1.0, 1.0])
        .with_wspace_each(vec![0.2, 0.05, 0.3])
        .with_hspace_each(vec![0.1, 0.4])
        .with_margins(Margins::new(0.6, 0.2, 0.3, 0.5));
    let grid = solve(params.clone(), canvas).unwrap();

    for axis in Axis::BOTH {
        let bounds = grid.bounds(axis);
        let mut previous = f64::NEG_INFINITY;
        for (start, end) in bounds {
            assert!(*start > previous);
            assert!(end > start);
            previous = *end;
        }
        let total = canvas.along(axis);
        let extents: f64 = bounds.iter().map(|(s, e)| (e - s) * total).sum();
        let spacing: f64 = params.spacing(axis).iter().sum();
        let (lo, hi) = params.margins.along(axis);
        assert!((extents + spacing + lo + hi - total).abs() < TOL);
    }
}

#[test]
fn test_ratios_split_available_width() {
    let grid = solve(
        GridParams::uniform(1, 2).with_width_ratios(vec![1.0, 3.0]),
        Size::new(4.0, 1.0),
    )
    .unwrap();
    let left = grid.cell_size(&CellSpan::at(0, 0)).unwrap();
    let right = grid.cell_size(&CellSpan::at(0, 1)).unwrap();
    assert!((left.width - 1.0).abs() < TOL);
    assert!((right.width - 3.0).abs() < TOL);
}

#[test]
fn test_spanning_cell_includes_gap() {
    let grid = solve(
        GridParams::uniform(1, 3).with_spacing(0.5, 0.0),
        Size::new(4.0, 1.0),
    )
    .unwrap();
    let span = grid.cell_size(&CellSpan::new(0..1, 0..2)).unwrap();
    assert!((span.width - 2.5).abs() < TOL);
}

#[test]
fn test_oversized_spacing_is_rejected() {
    let result = solve(
        GridParams::uniform(1, 2)
            .with_spacing(3.0, 0.0)
            .with_margins(Margins::uniform(0.5)),
        Size::new(4.0, 2.0),
    );
    assert!(matches!(result, Err(LayoutError::Configuration { .. })));
}

#[test]
fn test_failed_update_keeps_previous_boundaries() {
    let canvas = Size::new(4.0, 2.0);
    let mut grid = solve(GridParams::uniform(1, 2), canvas).unwrap();
    let before = grid.col_bounds().to_vec();

    let bad = GridParams::uniform(1, 2).with_width_ratios(vec![1.0, -1.0]);
    assert!(grid.update(bad, BoundingBox::unit(), canvas).is_err());
    assert_eq!(grid.col_bounds(), before.as_slice());
}

#[test]
fn test_cell_outside_grid() {
    let grid = solve(GridParams::uniform(2, 2), Size::new(2.0, 2.0)).unwrap();
    assert!(grid.cell_box(&CellSpan::at(2, 0)).is_err());
}
