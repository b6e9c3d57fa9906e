//! SVG output options
//!
//! Geometry reaches the SVG writer in inches and font sizes in points. The
//! config decides how both map to SVG user units and how elements are
//! classed for external stylesheets.

use super::artists::POINTS_PER_INCH;

#[derive(Debug, Clone)]
pub struct SvgConfig {
    /// User units per inch. 72 makes one unit one point.
    pub pixels_per_inch: f64,
    /// Emit the XML declaration ahead of the root element
    pub standalone: bool,
    pub pretty_print: bool,
    /// Prepended to every class name, `None` for bare names
    pub class_prefix: Option<String>,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            pixels_per_inch: POINTS_PER_INCH,
            standalone: true,
            pretty_print: true,
            class_prefix: Some("pp-".to_string()),
        }
    }
}

impl SvgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pixels_per_inch(mut self, ppi: f64) -> Self {
        self.pixels_per_inch = ppi;
        self
    }

    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = Some(prefix.into());
        self
    }

    pub fn without_class_prefix(mut self) -> Self {
        self.class_prefix = None;
        self
    }

    /// Canvas inches to SVG user units
    pub fn user_units(&self, inches: f64) -> f64 {
        inches * self.pixels_per_inch
    }

    /// Font points to SVG user units
    pub fn font_units(&self, points: f64) -> f64 {
        self.user_units(points / POINTS_PER_INCH)
    }

    /// Class name with the configured prefix
    pub fn class(&self, name: &str) -> String {
        match &self.class_prefix {
            Some(prefix) => format!("{prefix}{name}"),
            None => name.to_string(),
        }
    }
}
