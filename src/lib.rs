//! panelplot - multi-panel figure layout with SVG output
//!
//! This library lays out figures made of a grid of plot regions with side
//! panels, shared axes and spanning labels, trims their whitespace border
//! after measuring what was drawn, and renders them as SVG. Figures are
//! built through the [`layout`] API or from a TOML description.
//!
//! # Example
//!
//! ```rust
//! use panelplot::render;
//!
//! let svg = render(r#"
//! [[axes]]
//! title = "signal"
//! "#).unwrap();
//! assert!(svg.contains("<svg"));
//! ```

pub mod description;
pub mod error;
pub mod layout;
pub mod renderer;
pub mod style;

pub use description::{build_figure, FigureDescription};
pub use error::DescriptionError;
pub use layout::{create_figure, Figure, LayoutConfig, LayoutError};
pub use renderer::{SvgBackend, SvgConfig};
pub use style::{Style, StyleError, StyleSource};

use thiserror::Error;
use tracing::debug;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error in the figure description
    #[error("{0}")]
    Description(#[from] DescriptionError),

    /// Error during layout
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Error loading a style file
    #[error("style error: {0}")]
    Style(#[from] StyleError),
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Layout configuration
    pub layout: LayoutConfig,
    /// SVG output configuration
    pub svg: SvgConfig,
    /// Style parameters
    pub style: Style,
    /// Debug mode: log the resolved geometry of every axes
    pub debug: bool,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout configuration
    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    /// Set the SVG configuration
    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    /// Set the style parameters
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Render a TOML figure description to SVG with default configuration
///
/// This is the main entry point for the library. It parses the
/// description, builds the figure, draws it and returns the SVG output.
///
/// # Example
///
/// ```rust
/// use panelplot::render;
///
/// let svg = render(r#"
/// [grid]
/// ncols = 2
///
/// [[axes]]
/// name = "left"
/// xlabel = "time"
///
/// [[axes]]
/// col = 1
/// share_y = "left"
/// "#).unwrap();
///
/// assert!(svg.contains("<svg"));
/// assert!(svg.contains("time"));
/// ```
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, RenderConfig::default())
}

/// Render a TOML figure description to SVG with custom configuration
///
/// # Example
///
/// ```rust
/// use panelplot::{render_with_config, LayoutConfig, RenderConfig, SvgConfig};
///
/// let config = RenderConfig::new()
///     .with_layout(LayoutConfig::default().with_tight(false))
///     .with_svg(SvgConfig::default().with_standalone(false));
///
/// let svg = render_with_config("[[axes]]", config).unwrap();
/// assert!(svg.starts_with("<svg"));
/// ```
pub fn render_with_config(source: &str, config: RenderConfig) -> Result<String, RenderError> {
    let desc = FigureDescription::from_toml(source)?;
    let mut figure = build_figure(&desc, config.layout, config.style)?;

    let mut backend = SvgBackend::new(config.svg);
    let svg = figure.draw(&mut backend)??;

    if config.debug {
        log_geometry(&figure)?;
    }
    Ok(svg)
}

fn log_geometry(figure: &Figure) -> Result<(), LayoutError> {
    let size = figure.size();
    let margins = figure.margins();
    debug!(
        "canvas {:.3}x{:.3}in, margins l={:.3} r={:.3} t={:.3} b={:.3}",
        size.width, size.height, margins.left, margins.right, margins.top, margins.bottom
    );
    for node in figure.graph().iter() {
        let bbox = figure.axes_box(node.id)?;
        debug!(
            "{} x={:.3} y={:.3} w={:.3} h={:.3}",
            node, bbox.x, bbox.y, bbox.width, bbox.height
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_axes() {
        let svg = render("[[axes]]\ntitle = \"hello\"\n").unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
        assert!(svg.contains("hello"));
    }

    #[test]
    fn test_render_suptitle_and_labels() {
        let svg = render(
            r#"
[figure]
suptitle = "Overview"
col_labels = ["first", "second"]

[grid]
ncols = 2

[[axes]]

[[axes]]
col = 1
"#,
        )
        .unwrap();
        assert!(svg.contains("Overview"));
        assert!(svg.contains("first"));
        assert!(svg.contains("second"));
        assert!(svg.contains("pp-col-label"));
    }

    #[test]
    fn test_render_label_count_mismatch() {
        let err = render(
            r#"
[figure]
row_labels = ["a", "b"]

[[axes]]
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RenderError::Layout(LayoutError::CountMismatch { .. })
        ));
    }

    #[test]
    fn test_render_syntax_error() {
        let err = render("[[axes]\n").unwrap_err();
        assert!(matches!(err, RenderError::Description(_)));
    }

    #[test]
    fn test_render_without_tight() {
        let config = RenderConfig::new().with_layout(LayoutConfig::default().with_tight(false));
        let svg = render_with_config("[figure]\nsize = [3.0, 2.0]\n\n[[axes]]\n", config).unwrap();
        assert!(svg.contains(r#"width="216" height="144""#));
    }
}
