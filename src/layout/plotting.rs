//! Plot call processing
//!
//! Every plot call passes through an ordered list of stages chosen from a
//! static table keyed by plot kind and axes kind. Each axes assembles its
//! table once at construction; the stages run exactly once per call before
//! the resulting series is stored.

use std::collections::HashMap;

use super::axes::AxesKind;
use super::error::LayoutError;
use super::geo::wrap_longitude;

/// Kind of data plot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotKind {
    Line,
    Scatter,
    FillBetween,
}

impl PlotKind {
    pub const ALL: [PlotKind; 3] = [PlotKind::Line, PlotKind::Scatter, PlotKind::FillBetween];
}

/// One processing step applied to a plot call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// x, y (and y2) lengths agree and are non-empty
    ShapeCheck,
    /// Longitudes wrapped into (-180, 180]
    WrapLongitude,
    /// Points with non-finite coordinates dropped
    Normalize,
    /// Next color of the property cycle assigned when none was given
    ApplyCycle,
}

use Stage::*;

const CARTESIAN_STAGES: &[Stage] = &[ShapeCheck, Normalize, ApplyCycle];
const LATLON_STAGES: &[Stage] = &[ShapeCheck, WrapLongitude, Normalize, ApplyCycle];

/// Static stage table
pub fn stages_for(plot: PlotKind, axes: AxesKind) -> &'static [Stage] {
    match (axes, plot) {
        (AxesKind::Panel { .. }, _) => &[],
        (AxesKind::GeoLatLon, _) => LATLON_STAGES,
        (AxesKind::Cartesian | AxesKind::GeoTransform, _) => CARTESIAN_STAGES,
    }
}

/// Stage lists of one axes, assembled once
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: HashMap<PlotKind, &'static [Stage]>,
}

impl Pipeline {
    pub fn for_axes(kind: AxesKind) -> Self {
        let stages = PlotKind::ALL
            .iter()
            .map(|plot| (*plot, stages_for(*plot, kind)))
            .collect();
        Self { stages }
    }

    pub fn stages(&self, plot: PlotKind) -> &'static [Stage] {
        self.stages.get(&plot).copied().unwrap_or(&[])
    }

    /// Run all stages for the call's kind
    pub fn run(
        &self,
        mut call: PlotCall,
        cycle: &[String],
        cycle_index: usize,
    ) -> Result<PlotCall, LayoutError> {
        for stage in self.stages(call.kind) {
            match stage {
                ShapeCheck => check_shape(&call)?,
                WrapLongitude => {
                    for x in &mut call.x {
                        *x = wrap_longitude(*x);
                    }
                }
                Normalize => normalize(&mut call),
                ApplyCycle => {
                    if call.color.is_none() && !cycle.is_empty() {
                        call.color = Some(cycle[cycle_index % cycle.len()].clone());
                    }
                }
            }
        }
        Ok(call)
    }
}

/// A request to plot data on an axes
#[derive(Debug, Clone, PartialEq)]
pub struct PlotCall {
    pub kind: PlotKind,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Lower bound for fills
    pub y2: Option<Vec<f64>>,
    pub color: Option<String>,
    pub label: Option<String>,
}

impl PlotCall {
    pub fn new(kind: PlotKind, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            kind,
            x,
            y,
            y2: None,
            color: None,
            label: None,
        }
    }

    pub fn line(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self::new(PlotKind::Line, x, y)
    }

    pub fn with_y2(mut self, y2: Vec<f64>) -> Self {
        self.y2 = Some(y2);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

fn check_shape(call: &PlotCall) -> Result<(), LayoutError> {
    if call.x.is_empty() {
        return Err(LayoutError::invalid_data("no data points"));
    }
    if call.x.len() != call.y.len() {
        return Err(LayoutError::invalid_data(format!(
            "x has {} values but y has {}",
            call.x.len(),
            call.y.len()
        )));
    }
    match (&call.y2, call.kind) {
        (None, PlotKind::FillBetween) => Err(LayoutError::invalid_data(
            "fill between needs a second y series",
        )),
        (Some(y2), _) if y2.len() != call.x.len() => Err(LayoutError::invalid_data(format!(
            "x has {} values but y2 has {}",
            call.x.len(),
            y2.len()
        ))),
        _ => Ok(()),
    }
}

fn normalize(call: &mut PlotCall) {
    let keep: Vec<bool> = (0..call.x.len())
        .map(|i| {
            call.x[i].is_finite()
                && call.y[i].is_finite()
                && call.y2.as_ref().map_or(true, |y2| y2[i].is_finite())
        })
        .collect();
    let filter = |values: &mut Vec<f64>| {
        let mut flags = keep.iter();
        values.retain(|_| *flags.next().unwrap_or(&false));
    };
    filter(&mut call.x);
    filter(&mut call.y);
    if let Some(y2) = call.y2.as_mut() {
        filter(y2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle() -> Vec<String> {
        vec!["red".to_string(), "blue".to_string()]
    }

    #[test]
    fn test_table_per_axes_kind() {
        assert_eq!(stages_for(PlotKind::Line, AxesKind::Cartesian), CARTESIAN_STAGES);
        assert_eq!(stages_for(PlotKind::Line, AxesKind::GeoLatLon)[1], WrapLongitude);
        assert!(stages_for(PlotKind::Scatter, AxesKind::GeoTransform)
            .iter()
            .all(|s| *s != WrapLongitude));
    }

    #[test]
    fn test_shape_mismatch() {
        let pipeline = Pipeline::for_axes(AxesKind::Cartesian);
        let result = pipeline.run(PlotCall::line(vec![1.0, 2.0], vec![1.0]), &cycle(), 0);
        assert!(matches!(result, Err(LayoutError::InvalidData { .. })));
    }

    #[test]
    fn test_fill_requires_y2() {
        let pipeline = Pipeline::for_axes(AxesKind::Cartesian);
        let call = PlotCall::new(PlotKind::FillBetween, vec![1.0], vec![1.0]);
        assert!(pipeline.run(call, &cycle(), 0).is_err());
    }

    #[test]
    fn test_normalize_drops_nan_points() {
        let pipeline = Pipeline::for_axes(AxesKind::Cartesian);
        let call = PlotCall::line(vec![0.0, 1.0, 2.0], vec![1.0, f64::NAN, 3.0]);
        let out = pipeline.run(call, &cycle(), 0).unwrap();
        assert_eq!(out.x, vec![0.0, 2.0]);
        assert_eq!(out.y, vec![1.0, 3.0]);
    }

    #[test]
    fn test_cycle_applies_only_without_color() {
        let pipeline = Pipeline::for_axes(AxesKind::Cartesian);
        let auto = pipeline
            .run(PlotCall::line(vec![0.0], vec![0.0]), &cycle(), 3)
            .unwrap();
        assert_eq!(auto.color.as_deref(), Some("blue"));
        let fixed = pipeline
            .run(PlotCall::line(vec![0.0], vec![0.0]).with_color("green"), &cycle(), 3)
            .unwrap();
        assert_eq!(fixed.color.as_deref(), Some("green"));
    }

    #[test]
    fn test_latlon_wraps_longitudes() {
        let pipeline = Pipeline::for_axes(AxesKind::GeoLatLon);
        let out = pipeline
            .run(PlotCall::line(vec![190.0, 350.0], vec![0.0, 10.0]), &cycle(), 0)
            .unwrap();
        assert_eq!(out.x, vec![-170.0, -10.0]);
    }
}
