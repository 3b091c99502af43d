//! Time-aggregation strategies for the line chart.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Timelike, Weekday};
use common::{Error, Pollutant};
use serde::Serialize;

use crate::round2;
use crate::table::MeasurementTable;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How rows are collapsed before charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    /// Every sample, unaggregated.
    Realtime,
    /// Samples from the last calendar day present in the range.
    #[serde(rename = "last-24h")]
    Last24Hours,
    /// Mean per hour of day.
    Hourly,
    /// Mean per calendar day, with gaps for days without samples.
    Daily,
    /// Mean per weekday.
    #[serde(rename = "weekly")]
    DayOfWeek,
    /// Mean per calendar month.
    Monthly,
}

impl Frequency {
    pub const ALL: [Frequency; 6] = [
        Frequency::Realtime,
        Frequency::Last24Hours,
        Frequency::Hourly,
        Frequency::Daily,
        Frequency::DayOfWeek,
        Frequency::Monthly,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Frequency::Realtime => "realtime",
            Frequency::Last24Hours => "last-24h",
            Frequency::Hourly => "hourly",
            Frequency::Daily => "daily",
            Frequency::DayOfWeek => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// Label shown in the frequency selector.
    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Realtime => "Realtime",
            Frequency::Last24Hours => "Last 24 Hours",
            Frequency::Hourly => "Hourly Grouped",
            Frequency::Daily => "Daily Grouped",
            Frequency::DayOfWeek => "Day of Week Grouped",
            Frequency::Monthly => "Monthly Grouped",
        }
    }

    /// X-axis title for this view.
    pub fn axis_label(&self) -> &'static str {
        match self {
            Frequency::Realtime => "Datetime",
            Frequency::Last24Hours => "Hour",
            Frequency::Hourly => "Hour",
            Frequency::Daily => "Date",
            Frequency::DayOfWeek => "Day of Week",
            Frequency::Monthly => "Year Month",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace(|c: char| c == '_' || c == ' ', "-");
        match normalized.as_str() {
            "realtime" | "none" => Ok(Frequency::Realtime),
            "last-24h" | "last-24-hours" => Ok(Frequency::Last24Hours),
            "hourly" | "hourly-grouped" => Ok(Frequency::Hourly),
            "daily" | "daily-grouped" => Ok(Frequency::Daily),
            "weekly" | "day-of-week" | "day-of-week-grouped" => Ok(Frequency::DayOfWeek),
            "monthly" | "monthly-grouped" => Ok(Frequency::Monthly),
            _ => Err(Error::InvalidQuery(format!(
                "unknown frequency '{}'",
                raw.trim()
            ))),
        }
    }
}

/// One x/y pair of a chart series. `value` is `None` for an empty bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub pollutant: Pollutant,
    pub frequency: Frequency,
    pub x_label: &'static str,
    pub points: Vec<SeriesPoint>,
}

/// Full weekday name, as used on chart axes.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Default, Clone, Copy)]
struct Bucket {
    sum: f64,
    count: usize,
}

impl Bucket {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| round2(self.sum / self.count as f64))
    }
}

/// Reshape one pollutant column of `table` according to `frequency`.
///
/// Negative values are clamped to zero before any grouping.
pub fn aggregate(table: &MeasurementTable, pollutant: Pollutant, frequency: Frequency) -> Series {
    let column = table.clamped(pollutant);

    let points = match frequency {
        Frequency::Realtime => column
            .iter()
            .map(|(ts, v)| SeriesPoint {
                x: ts.format(TIMESTAMP_FORMAT).to_string(),
                value: Some(*v),
            })
            .collect(),
        Frequency::Last24Hours => match table.last_date() {
            Some(last_day) => column
                .iter()
                .filter(|(ts, _)| ts.date_naive() == last_day)
                .map(|(ts, v)| SeriesPoint {
                    x: ts.format(TIMESTAMP_FORMAT).to_string(),
                    value: Some(*v),
                })
                .collect(),
            None => Vec::new(),
        },
        Frequency::Hourly => {
            let mut buckets: BTreeMap<u32, Bucket> = BTreeMap::new();
            for (ts, v) in &column {
                buckets.entry(ts.hour()).or_default().push(*v);
            }
            buckets
                .into_iter()
                .map(|(hour, b)| SeriesPoint {
                    x: hour.to_string(),
                    value: b.mean(),
                })
                .collect()
        }
        Frequency::Daily => {
            let mut buckets = BTreeMap::new();
            for (ts, v) in &column {
                buckets
                    .entry(ts.date_naive())
                    .or_insert_with(Bucket::default)
                    .push(*v);
            }
            match (table.first_date(), table.last_date()) {
                (Some(first), Some(last)) => first
                    .iter_days()
                    .take_while(|day| *day <= last)
                    .map(|day| SeriesPoint {
                        x: day.format("%Y-%m-%d").to_string(),
                        value: buckets.get(&day).and_then(Bucket::mean),
                    })
                    .collect(),
                _ => Vec::new(),
            }
        }
        Frequency::DayOfWeek => {
            let mut buckets: BTreeMap<u32, (Weekday, Bucket)> = BTreeMap::new();
            for (ts, v) in &column {
                let day = ts.weekday();
                buckets
                    .entry(day.num_days_from_monday())
                    .or_insert((day, Bucket::default()))
                    .1
                    .push(*v);
            }
            buckets
                .into_values()
                .map(|(day, b)| SeriesPoint {
                    x: day_name(day).to_string(),
                    value: b.mean(),
                })
                .collect()
        }
        Frequency::Monthly => {
            let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();
            for (ts, v) in &column {
                buckets
                    .entry(ts.format("%Y-%m").to_string())
                    .or_default()
                    .push(*v);
            }
            buckets
                .into_iter()
                .map(|(month, b)| SeriesPoint {
                    x: month,
                    value: b.mean(),
                })
                .collect()
        }
    };

    Series {
        pollutant,
        frequency,
        x_label: frequency.axis_label(),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::table;

    fn values(series: &Series) -> Vec<Option<f64>> {
        series.points.iter().map(|p| p.value).collect()
    }

    fn xs(series: &Series) -> Vec<&str> {
        series.points.iter().map(|p| p.x.as_str()).collect()
    }

    #[test]
    fn test_frequency_parses_slugs_and_labels() {
        for f in Frequency::ALL {
            assert_eq!(f.slug().parse::<Frequency>().unwrap(), f);
            assert_eq!(f.label().parse::<Frequency>().unwrap(), f);
        }
        assert_eq!("day_of_week".parse::<Frequency>().unwrap(), Frequency::DayOfWeek);
        assert!("fortnightly".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_realtime_keeps_every_row_and_clamps() {
        let t = table(&[("2024-05-01 00:00", -3.0), ("2024-05-01 01:00", 7.5)]);

        let s = aggregate(&t, Pollutant::O3, Frequency::Realtime);

        assert_eq!(xs(&s), vec!["2024-05-01 00:00:00", "2024-05-01 01:00:00"]);
        assert_eq!(values(&s), vec![Some(0.0), Some(7.5)]);
        assert_eq!(s.x_label, "Datetime");
    }

    #[test]
    fn test_last_24_hours_uses_last_calendar_day() {
        let t = table(&[
            ("2024-05-01 22:00", 1.0),
            ("2024-05-01 23:00", 2.0),
            ("2024-05-02 00:00", 3.0),
            ("2024-05-02 01:00", 4.0),
        ]);

        let s = aggregate(&t, Pollutant::Co, Frequency::Last24Hours);

        assert_eq!(xs(&s), vec!["2024-05-02 00:00:00", "2024-05-02 01:00:00"]);
        assert_eq!(s.x_label, "Hour");
    }

    #[test]
    fn test_hourly_means_are_rounded() {
        let t = table(&[
            ("2024-05-01 03:00", 1.0),
            ("2024-05-02 03:00", 2.0),
            ("2024-05-03 03:00", 2.0),
            ("2024-05-01 01:00", 10.0),
        ]);

        let s = aggregate(&t, Pollutant::Pm10, Frequency::Hourly);

        assert_eq!(xs(&s), vec!["1", "3"]);
        assert_eq!(values(&s), vec![Some(10.0), Some(1.67)]);
    }

    #[test]
    fn test_daily_fills_gaps_with_none() {
        let t = table(&[
            ("2024-05-01 00:00", 4.0),
            ("2024-05-01 12:00", 6.0),
            ("2024-05-03 08:00", 9.0),
        ]);

        let s = aggregate(&t, Pollutant::So2, Frequency::Daily);

        assert_eq!(xs(&s), vec!["2024-05-01", "2024-05-02", "2024-05-03"]);
        assert_eq!(values(&s), vec![Some(5.0), None, Some(9.0)]);
    }

    #[test]
    fn test_day_of_week_ordered_from_monday() {
        // 2024-05-05 is a Sunday, 2024-05-06 a Monday.
        let t = table(&[
            ("2024-05-05 10:00", 8.0),
            ("2024-05-06 10:00", 2.0),
            ("2024-05-13 10:00", 4.0),
        ]);

        let s = aggregate(&t, Pollutant::Nh3, Frequency::DayOfWeek);

        assert_eq!(xs(&s), vec!["Monday", "Sunday"]);
        assert_eq!(values(&s), vec![Some(3.0), Some(8.0)]);
    }

    #[test]
    fn test_monthly_groups_by_year_month() {
        let t = table(&[
            ("2023-12-31 23:00", 1.0),
            ("2024-01-01 00:00", 3.0),
            ("2024-01-15 00:00", 5.0),
        ]);

        let s = aggregate(&t, Pollutant::No2, Frequency::Monthly);

        assert_eq!(xs(&s), vec!["2023-12", "2024-01"]);
        assert_eq!(values(&s), vec![Some(1.0), Some(4.0)]);
        assert_eq!(s.x_label, "Year Month");
    }

    #[test]
    fn test_group_means_preserve_column_sum() {
        let rows: Vec<(String, f64)> = (0..96)
            .map(|i| {
                let day = 1 + i / 24;
                let hour = i % 24;
                (format!("2024-06-{day:02} {hour:02}:00"), (i as f64) * 1.37 - 5.0)
            })
            .collect();
        let borrowed: Vec<(&str, f64)> = rows.iter().map(|(s, v)| (s.as_str(), *v)).collect();
        let t = table(&borrowed);
        let expected: f64 = t.clamped(Pollutant::Pm25).iter().map(|(_, v)| v).sum();

        for (frequency, group_size) in [(Frequency::Hourly, 4.0), (Frequency::Daily, 24.0)] {
            let s = aggregate(&t, Pollutant::Pm25, frequency);
            let total: f64 = s.points.iter().filter_map(|p| p.value).sum::<f64>() * group_size;
            let tolerance = 0.005 * group_size * s.points.len() as f64;
            assert!(
                (total - expected).abs() <= tolerance,
                "{frequency}: {total} vs {expected}"
            );
        }
    }

    #[test]
    fn test_empty_table_yields_empty_series() {
        let t = MeasurementTable::default();
        for f in Frequency::ALL {
            assert!(aggregate(&t, Pollutant::Co, f).points.is_empty());
        }
    }
}
