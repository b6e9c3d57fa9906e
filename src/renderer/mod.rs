//! SVG renderer for drawn figures
//!
//! The renderer turns a figure into a flat list of artists, measures their
//! combined extent for tight layout and writes them out as SVG with
//! prefixed CSS classes for styling.

pub mod artists;
pub mod config;
pub mod svg;
pub mod ticks;

pub use artists::{collect_artists, union_extent, Artist, TextMetrics};
pub use config::SvgConfig;
pub use svg::{render_svg, SvgBackend, SvgBuilder};
