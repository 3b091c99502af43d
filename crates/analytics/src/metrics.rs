//! Summary metric tiles: latest reading and change per pollutant.

use common::{AqiCategory, Pollutant};
use serde::Serialize;

use crate::round2;
use crate::table::MeasurementTable;

const LAST_UPDATE_FORMAT: &str = "%a %d/%m/%Y %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollutantMetric {
    pub pollutant: Pollutant,
    /// Latest raw reading (μg/m3).
    pub value: f64,
    /// Latest minus previous reading, rounded. `None` with fewer than two rows.
    pub delta: Option<f64>,
    pub poor_limit: f64,
}

impl PollutantMetric {
    /// Rising concentrations are bad, so an increase is rendered in red.
    pub fn is_worsening(&self) -> bool {
        self.delta.is_some_and(|d| d > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub last_update: String,
    pub aqi_category: AqiCategory,
    pub rows: usize,
    pub pollutants: Vec<PollutantMetric>,
}

/// Metrics for the (already filtered) table. `None` when it is empty.
pub fn summarize(table: &MeasurementTable) -> Option<Summary> {
    let rows = table.rows();
    let last = rows.last()?;
    let previous = rows.len().checked_sub(2).map(|i| &rows[i]);

    let last_update = rows
        .iter()
        .map(|r| r.record.timestamp)
        .max()?
        .format(LAST_UPDATE_FORMAT)
        .to_string();

    let pollutants = Pollutant::DISPLAY_ORDER
        .into_iter()
        .map(|p| {
            let value = last.record.value(p);
            PollutantMetric {
                pollutant: p,
                value,
                delta: previous.map(|prev| round2(value - prev.record.value(p))),
                poor_limit: p.poor_limit(),
            }
        })
        .collect();

    Some(Summary {
        last_update,
        aqi_category: last.record.category(),
        rows: rows.len(),
        pollutants,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::record;

    #[test]
    fn test_summary_reports_last_row_and_delta() {
        let mut first = record("2024-02-09 22:00", 10.0);
        first.pm2_5 = 40.0;
        let mut second = record("2024-02-09 23:00", 12.35);
        second.pm2_5 = 35.5;
        second.aqi = 4;
        let t = MeasurementTable::from_records(vec![first, second]);

        let summary = summarize(&t).expect("non-empty table");

        assert_eq!(summary.last_update, "Fri 09/02/2024 23:00:00");
        assert_eq!(summary.aqi_category, AqiCategory::Poor);
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.pollutants[0].pollutant, Pollutant::Pm25);
        assert_eq!(summary.pollutants[0].value, 35.5);
        assert_eq!(summary.pollutants[0].delta, Some(-4.5));
        assert!(!summary.pollutants[0].is_worsening());

        let co = summary
            .pollutants
            .iter()
            .find(|m| m.pollutant == Pollutant::Co)
            .unwrap();
        assert_eq!(co.delta, Some(2.35));
        assert!(co.is_worsening());
        assert_eq!(co.poor_limit, 12400.0);
    }

    #[test]
    fn test_single_row_has_no_delta() {
        let t = MeasurementTable::from_records(vec![record("2024-02-09 22:00", 1.0)]);

        let summary = summarize(&t).expect("non-empty table");
        assert!(summary.pollutants.iter().all(|m| m.delta.is_none()));
    }

    #[test]
    fn test_empty_table_has_no_summary() {
        assert!(summarize(&MeasurementTable::default()).is_none());
    }
}
