//! Layout engine for multi-panel figures
//!
//! This module partitions a canvas into a grid of plot regions, carves side
//! panels out of their cells, links regions into share and span groups, and
//! trims the whitespace border after measuring what was drawn.

pub mod axes;
pub mod config;
pub mod error;
pub mod figure;
pub mod geo;
pub mod graph;
pub mod gridspec;
pub mod labels;
pub mod panels;
pub mod plotting;
pub mod tight;
pub mod types;

pub use axes::{
    ArtistHandle, ArtistKind, AxesKind, AxesNode, Capability, HAlign, LegendEntry, PanelContent,
    PanelFill, PanelSlot, TitleLoc,
};
pub use config::LayoutConfig;
pub use error::LayoutError;
pub use figure::{create_figure, Figure, FigurePanel, GridConfig, PanelSize, SubplotRequest};
pub use graph::{AxesGraph, SpanGroup};
pub use gridspec::{GridParams, GridSpec};
pub use panels::{panel_layout, stacked_slot, PanelLayout, PanelRequest};
pub use plotting::{PlotCall, PlotKind};
pub use tight::{tighten, Backend, EdgeSlot, TightReport};
pub use types::*;
