//! End-to-end rendering of figure descriptions

use panelplot::style::StyleValue;
use panelplot::{render, render_with_config, DescriptionError, LayoutConfig, RenderConfig, RenderError, Style, SvgConfig};

const FULL: &str = r##"
[figure]
size = [8.0, 5.0]
suptitle = "Station records"
row_labels = ["north", "south"]
margins = { left = 0.6, right = 0.4, top = 0.5, bottom = 0.5 }

[grid]
nrows = 2
ncols = 2
width_ratios = [2.0, 1.0]
wspace = 0.4
hspace = [0.5]

[[panel]]
side = "right"
width = 0.15

[[axes]]
name = "temp"
title = "Temperature"
title_loc = "l"
ylabel = "degC"
panels = "b"

[[axes.plot]]
x = [0.0, 1.0, 2.0, 3.0]
y = [12.0, 15.0, 11.0, 9.0]
label = "daily"

[[axes.plot]]
kind = "scatter"
x = [0.5, 2.5]
y = [13.0, 10.0]
color = "#aa0000"
label = "spot"

[[axes]]
name = "map"
col = 1
kind = "latlon"
title = "Sites"

[[axes.plot]]
kind = "scatter"
x = [350.0, 10.0]
y = [50.0, 45.0]

[[axes]]
name = "rain"
row = 1
share_x = "temp"
xlabel = "day"

[[axes.plot]]
kind = "fill_between"
x = [0.0, 1.0, 2.0]
y = [1.0, 3.0, 2.0]
y2 = [0.0, 0.0, 0.0]

[[axes]]
name = "wind"
row = 1
col = 1
xlabel = "day"

[[span]]
axis = "x"
members = ["rain", "wind"]
owner = "rain"

[[legend]]
axes = "temp"
side = "bottom"

[[colorbar]]
side = "right"
label = "mm"
colors = ["#f7fbff", "#6baed6", "#08306b"]
ticks = ["0", "5", "10"]
"##;

#[test]
fn test_full_description_renders() {
    let svg = render(FULL).unwrap();
    for text in [
        "Station records",
        "north",
        "south",
        "Temperature",
        "Sites",
        "degC",
        "daily",
        "spot",
        "mm",
        "30°N",
    ] {
        assert!(svg.contains(text), "missing {:?}", text);
    }
    assert!(svg.contains("pp-colorbar-segment"));
    assert!(svg.contains("pp-legend-label"));
    assert!(svg.contains("pp-gridline"));
    // the span group draws one "day" label for both bottom axes
    assert_eq!(svg.matches(">day<").count(), 1);
}

#[test]
fn test_abc_labels_from_style() {
    let style = Style::default()
        .with_value("abc.enabled", StyleValue::Bool(true))
        .with_value("abc.style", StyleValue::Text("(a)".to_string()));
    let config = RenderConfig::new().with_style(style);
    let svg = render_with_config(FULL, config).unwrap();
    assert!(svg.contains(">(a)<"));
    assert!(svg.contains(">(d)<"));
}

#[test]
fn test_tight_layout_changes_canvas() {
    let loose = RenderConfig::new()
        .with_layout(LayoutConfig::default().with_tight(false))
        .with_svg(SvgConfig::default().with_pretty_print(false));
    let svg = render_with_config("[figure]\nsize = [4.0, 3.0]\n\n[[axes]]\n", loose).unwrap();
    assert!(svg.contains(r#"width="288" height="216""#));

    let tight = render("[figure]\nsize = [4.0, 3.0]\n\n[[axes]]\n").unwrap();
    assert!(!tight.contains(r#"width="288" height="216""#));
}

#[test]
fn test_overlapping_axes_error() {
    let err = render(
        r#"
[grid]
ncols = 2

[[axes]]
colspan = 2

[[axes]]
col = 1
"#,
    )
    .unwrap_err();
    assert!(matches!(err, RenderError::Layout(_)));
}

#[test]
fn test_unknown_side_reports_field() {
    let err = render(
        r#"
[[axes]]
name = "a"
panels = "q"
"#,
    )
    .unwrap_err();
    match err {
        RenderError::Description(DescriptionError::InvalidValue { field, .. }) => {
            assert_eq!(field, "axes.panels")
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_description_error_formats_with_context() {
    let source = "[[axes]]\nname = \"a\"\n\n[[span]]\naxis = \"x\"\nmembers = [\"a\", \"b\"]\nowner = \"a\"\n";
    let err = render(source).unwrap_err();
    let RenderError::Description(err) = err else {
        panic!("expected a description error");
    };
    let report = err.format(source, "figure.toml");
    assert!(report.contains("unknown axes 'b'"));
    assert!(report.contains("figure.toml"));
}

#[test]
fn test_empty_panels_render_with_tight_layout() {
    let svg = render(
        r#"
[figure]
size = [6.0, 4.0]

[[panel]]
side = "bottom"

[[axes]]
title = "pressure"
panels = "r"

[[axes.plot]]
x = [0.0, 1.0]
y = [1.0, 2.0]
"#,
    )
    .unwrap();
    assert!(svg.contains("pressure"));
    // neither panel holds content, so neither paints anything
    assert!(!svg.contains("pp-legend"));
    assert!(!svg.contains("pp-colorbar"));
}
