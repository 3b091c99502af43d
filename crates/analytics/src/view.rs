//! One render pass: filter, aggregate, summarize and pivot.

use common::Pollutant;
use serde::Serialize;
use tracing::debug;

use crate::aggregate::{aggregate, Frequency};
use crate::chart::{Heatmap, LineChart};
use crate::metrics::{summarize, Summary};
use crate::pivot::pivot;
use crate::table::{DateRange, MeasurementTable};

/// Everything the dashboard page draws for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: String,
    pub location: String,
    /// Span of the whole dataset, for the date picker limits.
    pub bounds: Option<DateRange>,
    pub range: DateRange,
    pub pollutant: Pollutant,
    pub frequency: Frequency,
    pub summary: Option<Summary>,
    pub line_chart: LineChart,
    pub heatmap: Heatmap,
}

pub fn build_view(
    table: &MeasurementTable,
    location: &str,
    range: DateRange,
    pollutant: Pollutant,
    frequency: Frequency,
) -> DashboardView {
    let filtered = table.filter_dates(range);
    debug!(
        "Rendering {} {} over {}..{}: {} of {} rows",
        pollutant,
        frequency.slug(),
        range.start,
        range.end,
        filtered.len(),
        table.len()
    );

    DashboardView {
        title: format!("{location} Air Quality Dashboard"),
        location: location.to_string(),
        bounds: table.date_bounds(),
        range,
        pollutant,
        frequency,
        summary: summarize(&filtered),
        line_chart: LineChart::new(aggregate(&filtered, pollutant, frequency)),
        heatmap: Heatmap::new(pivot(&filtered, pollutant)),
    }
}
