//! Dataset reshaping for the air-quality dashboard.
//!
//! Everything here is a pure transformation over one in-memory
//! `MeasurementTable`, except `cache`, which memoizes the fetched table.

pub mod aggregate;
pub mod cache;
pub mod chart;
pub mod export;
pub mod metrics;
pub mod pivot;
pub mod table;
pub mod view;

pub use aggregate::{aggregate, Frequency, Series, SeriesPoint};
pub use cache::DatasetCache;
pub use chart::{Heatmap, LineChart, Threshold};
pub use export::to_csv;
pub use metrics::{summarize, PollutantMetric, Summary};
pub use pivot::{pivot, Pivot};
pub use table::{DateRange, MeasurementTable, Row};
pub use view::{build_view, DashboardView};

/// Round to two decimals. Ties on the scaled value go to the even
/// neighbour, so `0.125` becomes `0.12`.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
