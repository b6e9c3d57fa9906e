//! Share and span groups across a figure

use pretty_assertions::assert_eq;

use panelplot::layout::{
    create_figure, AxesId, AxesKind, Axis, CellSpan, Figure, GridConfig, LayoutError, Margins,
    PanelSize, PlotCall, Side, Size, SubplotRequest,
};

const TOL: f64 = 1e-9;

fn row_of_three() -> (Figure, [AxesId; 3]) {
    let mut figure = create_figure(
        Size::new(9.0, 3.0),
        GridConfig::new(1, 3)
            .with_spacing(0.3, 0.0)
            .with_margins(Margins::uniform(0.5)),
    )
    .unwrap();
    let ids = [0, 1, 2].map(|col| figure.add_subplot(SubplotRequest::at(0, col)).unwrap());
    (figure, ids)
}

#[test]
fn test_share_is_transitive() {
    let (mut figure, [a, b, c]) = row_of_three();
    figure.link_share_y(a, b).unwrap();
    figure.link_share_y(b, c).unwrap();
    assert!(figure.graph().same_share_group(Axis::Y, a, c));
    assert_eq!(figure.graph().share_group_len(Axis::Y, a), 3);
    // x groups are independent
    assert!(!figure.graph().same_share_group(Axis::X, a, c));
}

#[test]
fn test_relinking_keeps_group_size() {
    let (mut figure, [a, b, c]) = row_of_three();
    figure.link_share_x(a, b).unwrap();
    figure.link_share_x(b, c).unwrap();
    figure.link_share_x(a, c).unwrap();
    figure.link_share_x(c, a).unwrap();
    assert_eq!(figure.graph().share_group_len(Axis::X, b), 3);
}

#[test]
fn test_self_link_is_rejected() {
    let (mut figure, [a, _, _]) = row_of_three();
    let err = figure.link_share_x(a, a).unwrap_err();
    assert!(matches!(err, LayoutError::Link { axis: Axis::X, .. }));
}

#[test]
fn test_share_hint_keeps_left_most_leader() {
    let mut figure = create_figure(Size::new(6.0, 3.0), GridConfig::new(1, 2)).unwrap();
    let left = figure.add_subplot(SubplotRequest::at(0, 0)).unwrap();
    let right = figure
        .add_subplot(SubplotRequest::at(0, 1).with_share_y(left))
        .unwrap();
    assert_eq!(figure.graph().share_leader(Axis::Y, right), left);
    assert!(figure.graph().tick_labels_visible(Axis::Y, left));
    assert!(!figure.graph().tick_labels_visible(Axis::Y, right));
}

#[test]
fn test_shared_limits_cover_all_members() {
    let (mut figure, [a, b, _]) = row_of_three();
    figure.link_share_y(a, b).unwrap();
    figure
        .plot(a, PlotCall::line(vec![0.0, 1.0], vec![0.0, 2.0]))
        .unwrap();
    figure
        .plot(b, PlotCall::line(vec![0.0, 1.0], vec![-3.0, 1.0]))
        .unwrap();
    let mut backend = panelplot::SvgBackend::default();
    figure.draw(&mut backend).unwrap().unwrap();
    assert_eq!(figure.axes(a).unwrap().limits(Axis::Y), (-3.0, 2.0));
    assert_eq!(figure.axes(b).unwrap().limits(Axis::Y), (-3.0, 2.0));
}

#[test]
fn test_span_group_owner_draws_centered_label() {
    let (mut figure, [a, b, c]) = row_of_three();
    for id in [a, b, c] {
        figure.set_axis_label(id, Axis::X, "distance").unwrap();
    }
    figure.link_span_x(&[a, b, c], b).unwrap();
    figure.refresh_spans().unwrap();

    let graph = figure.graph();
    assert!(!graph.axis_label_visible(Axis::X, a));
    assert!(graph.axis_label_visible(Axis::X, b));
    assert!(!graph.axis_label_visible(Axis::X, c));

    let left = figure.axes_box(a).unwrap().x;
    let right = figure.axes_box(c).unwrap().right();
    let at = figure.axes(b).unwrap().axis(Axis::X).span_label_at.unwrap();
    assert!((at - (left + right) / 2.0).abs() < TOL);
}

#[test]
fn test_span_owner_borrows_member_label() {
    let (mut figure, [a, b, _]) = row_of_three();
    figure.set_axis_label(a, Axis::X, "time").unwrap();
    figure.link_span_x(&[a, b], b).unwrap();
    assert_eq!(figure.graph().axis_label_text(Axis::X, b), Some("time"));
    assert_eq!(figure.graph().axis_label_text(Axis::X, a), None);
}

#[test]
fn test_span_conflicts() {
    let (mut figure, [a, b, c]) = row_of_three();
    let first = figure.link_span_x(&[a, b], a).unwrap();
    assert_eq!(figure.link_span_x(&[b, a], a).unwrap(), first);
    assert!(figure.link_span_x(&[b, c], c).is_err());
    assert!(figure.link_span_y(&[a, b], c).is_err());
}

#[test]
fn test_span_refresh_follows_moved_axes() {
    let mut figure = create_figure(
        Size::new(6.0, 6.0),
        GridConfig::new(2, 3).with_margins(Margins::uniform(0.5)),
    )
    .unwrap();
    let a = figure.add_subplot(SubplotRequest::at(0, 0)).unwrap();
    let b = figure.add_subplot(SubplotRequest::at(0, 1)).unwrap();
    figure.link_span_x(&[a, b], a).unwrap();
    figure.refresh_spans().unwrap();
    let before = figure.axes(a).unwrap().axis(Axis::X).span_label_at.unwrap();

    figure.move_axes(b, CellSpan::at(1, 2)).unwrap();
    figure.refresh_spans().unwrap();
    let after = figure.axes(a).unwrap().axis(Axis::X).span_label_at.unwrap();

    let left = figure.axes_box(a).unwrap().x;
    let right = figure.axes_box(b).unwrap().right();
    assert!(after > before);
    assert!((after - (left + right) / 2.0).abs() < TOL);
}

#[test]
fn test_panels_join_parent_share_groups() {
    let mut figure = create_figure(Size::new(6.0, 3.0), GridConfig::new(1, 2)).unwrap();
    let left = figure
        .add_subplot(SubplotRequest::at(0, 0).with_panel(Side::Bottom, PanelSize::default()))
        .unwrap();
    let right = figure
        .add_subplot(
            SubplotRequest::at(0, 1)
                .with_panel(Side::Bottom, PanelSize::default())
                .with_share_y(left),
        )
        .unwrap();
    let left_panel = figure.axes(left).unwrap().panel(Side::Bottom).unwrap();
    let right_panel = figure.axes(right).unwrap().panel(Side::Bottom).unwrap();

    // a bottom panel runs along x with its parent
    assert!(figure.graph().same_share_group(Axis::X, left, left_panel));
    // parents share y, so their bottom panels line up on y
    assert!(figure.graph().same_share_group(Axis::Y, left_panel, right_panel));
}

#[test]
fn test_geographic_axes_cannot_share() {
    let mut figure = create_figure(Size::new(6.0, 3.0), GridConfig::new(1, 2)).unwrap();
    let map = figure
        .add_subplot(SubplotRequest::at(0, 0).with_kind(AxesKind::GeoLatLon))
        .unwrap();
    let result = figure.add_subplot(SubplotRequest::at(0, 1).with_share_x(map));
    assert!(matches!(result, Err(LayoutError::Link { .. })));
    // nothing was created by the failed request
    assert_eq!(figure.graph().len(), 1);
}
