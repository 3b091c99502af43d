//! Chart descriptions handed to the browser renderer.

use common::Pollutant;
use serde::Serialize;

use crate::aggregate::Series;
use crate::pivot::Pivot;

pub const LINE_COLOUR: &str = "#800016";
pub const PLOT_BACKGROUND: &str = "#FFFBFB";
pub const GRID_COLOUR: &str = "#C46B6B";
pub const HEATMAP_SCALE: [&str; 3] = ["#F2EEEE", "#A13A49", "#800016"];

/// Dashed horizontal line marking the "poor" concentration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Threshold {
    pub value: f64,
    pub annotation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub x_label: &'static str,
    pub y_label: String,
    pub colour: &'static str,
    pub background: &'static str,
    pub grid_colour: &'static str,
    pub threshold: Threshold,
    pub series: Series,
}

impl LineChart {
    pub fn new(series: Series) -> Self {
        let p = series.pollutant;
        Self {
            x_label: series.x_label,
            y_label: format!("Concentration of {p} (μg/m3)"),
            colour: LINE_COLOUR,
            background: PLOT_BACKGROUND,
            grid_colour: GRID_COLOUR,
            threshold: threshold(p),
            series,
        }
    }
}

pub fn threshold(pollutant: Pollutant) -> Threshold {
    let value = pollutant.poor_limit();
    Threshold {
        value,
        annotation: format!("Poor limit of {pollutant} = {value} μg/m3"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub title: String,
    pub colour_scale: [&'static str; 3],
    pub pivot: Pivot,
}

impl Heatmap {
    pub fn new(pivot: Pivot) -> Self {
        Self {
            title: format!(
                "Average Concentration of {} Grouped by Hour and Day",
                pivot.pollutant
            ),
            colour_scale: HEATMAP_SCALE,
            pivot,
        }
    }
}
