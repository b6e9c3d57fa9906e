//! Error types for the layout engine

use thiserror::Error;

use super::types::{AxesId, Axis};

/// Errors that can occur while building or relaying out a figure
#[derive(Debug, Error)]
pub enum LayoutError {
    /// A ratio, size or spacing request that cannot produce a valid grid
    #[error("invalid layout configuration: {reason}")]
    Configuration { reason: String },

    /// Row or column label count does not match the number of axes
    #[error("got {labels} {kind} labels, but there are {axes} {kind}s")]
    CountMismatch {
        kind: &'static str,
        labels: usize,
        axes: usize,
    },

    /// Tight layout requested before any geometry was built
    #[error("figure geometry has not been initialized; create the grid before tightening")]
    NotInitialized,

    /// A relationship link that would corrupt the share/span groups
    #[error("cannot link {axis} axis: {reason}")]
    Link { axis: Axis, reason: String },

    /// Reference to an axes that does not exist in the figure
    #[error("unknown axes {0}")]
    UnknownAxes(AxesId),

    /// Plot data with inconsistent shapes
    #[error("invalid plot data: {reason}")]
    InvalidData { reason: String },
}

impl LayoutError {
    /// Create a configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Create a configuration error for an unrecognized side token
    pub fn unknown_side(token: impl AsRef<str>) -> Self {
        Self::configuration(format!(
            "unknown side '{}' (expected left, right, bottom or top)",
            token.as_ref()
        ))
    }

    /// Create a label count mismatch error
    pub fn count_mismatch(kind: &'static str, labels: usize, axes: usize) -> Self {
        Self::CountMismatch { kind, labels, axes }
    }

    /// Create a link error
    pub fn link(axis: Axis, reason: impl Into<String>) -> Self {
        Self::Link {
            axis,
            reason: reason.into(),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data(reason: impl Into<String>) -> Self {
        Self::InvalidData {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_mismatch_display() {
        let err = LayoutError::count_mismatch("row", 3, 2);
        assert_eq!(err.to_string(), "got 3 row labels, but there are 2 rows");
    }

    #[test]
    fn test_link_display() {
        let err = LayoutError::link(Axis::X, "axes cannot be linked to itself");
        assert!(err.to_string().contains("x axis"));
    }

    #[test]
    fn test_unknown_side_display() {
        let err = LayoutError::unknown_side("q");
        insta::assert_snapshot!(
            err.to_string(),
            @"invalid layout configuration: unknown side 'q' (expected left, right, bottom or top)"
        );
    }
}
