//! The in-memory measurement table and date-range filtering.

use chrono::{DateTime, NaiveDate, Utc};
use common::{Error, MeasurementRecord, Pollutant};
use serde::Serialize;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A table row. `index` is the row's position in the full fetched table and
/// survives filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub index: usize,
    pub record: MeasurementRecord,
}

/// Ordered measurement rows, non-decreasing by timestamp as delivered by the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementTable {
    rows: Vec<Row>,
}

impl MeasurementTable {
    pub fn from_records(records: Vec<MeasurementRecord>) -> Self {
        let rows = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| Row { index, record })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&Row> {
        self.rows.last()
    }

    /// Calendar date (UTC) of the first row.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.record.timestamp.date_naive())
    }

    /// Calendar date (UTC) of the last row.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.record.timestamp.date_naive())
    }

    /// The full span of the table, if it has any rows.
    pub fn date_bounds(&self) -> Option<DateRange> {
        Some(DateRange {
            start: self.first_date()?,
            end: self.last_date()?,
        })
    }

    /// Rows whose date lies inside `range`, both ends inclusive.
    pub fn filter_dates(&self, range: DateRange) -> MeasurementTable {
        let rows = self
            .rows
            .iter()
            .filter(|r| range.contains(r.record.timestamp.date_naive()))
            .cloned()
            .collect();
        MeasurementTable { rows }
    }

    /// One pollutant column with negative outliers replaced by zero.
    pub fn clamped(&self, pollutant: Pollutant) -> Vec<(DateTime<Utc>, f64)> {
        self.rows
            .iter()
            .map(|r| (r.record.timestamp, r.record.value(pollutant).max(0.0)))
            .collect()
    }
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidRange(format!(
                "start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Build a range from optional `YYYY-MM-DD` strings, defaulting each
    /// missing end to the table's own bounds.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        table: &MeasurementTable,
    ) -> Result<Self, Error> {
        let start = match start.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_date(raw)?,
            None => table
                .first_date()
                .ok_or_else(|| Error::InvalidRange("dataset is empty".into()))?,
        };
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_date(raw)?,
            None => table
                .last_date()
                .ok_or_else(|| Error::InvalidRange("dataset is empty".into()))?,
        };
        Self::new(start, end)
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| Error::InvalidRange(format!("'{raw}' is not a YYYY-MM-DD date: {e}")))
}
