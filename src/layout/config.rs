//! Configuration for the layout engine

use super::types::Margins;

/// Configuration options for figure layout
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Run the tight-layout pass on every draw
    pub tight: bool,

    /// Whitespace kept around the measured content by tight layout (inches)
    pub tight_pad: f64,

    /// Default thickness of an axes side panel (inches)
    pub panel_width: f64,

    /// Default gap between an axes and its side panel (inches)
    pub panel_space: f64,

    /// Default outer margins of a new figure (inches)
    pub margins: Margins,

    /// Default horizontal spacing between subplot columns (inches)
    pub wspace: f64,

    /// Default vertical spacing between subplot rows (inches)
    pub hspace: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            tight: true,
            tight_pad: 0.1,
            panel_width: 0.3,
            panel_space: 0.13,
            margins: Margins::uniform(0.5),
            wspace: 0.3,
            hspace: 0.3,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the tight-layout pass
    pub fn with_tight(mut self, tight: bool) -> Self {
        self.tight = tight;
        self
    }

    /// Set the padding kept by tight layout
    pub fn with_tight_pad(mut self, pad: f64) -> Self {
        self.tight_pad = pad;
        self
    }

    /// Set the default panel thickness and gap
    pub fn with_panel_size(mut self, width: f64, space: f64) -> Self {
        self.panel_width = width;
        self.panel_space = space;
        self
    }

    /// Set the default figure margins
    pub fn with_margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    /// Set the default subplot spacing
    pub fn with_spacing(mut self, wspace: f64, hspace: f64) -> Self {
        self.wspace = wspace;
        self.hspace = hspace;
        self
    }
}
