//! Weekday × hour-of-day pivot for the heatmap.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Timelike, Weekday};
use common::Pollutant;
use serde::Serialize;

use crate::aggregate::day_name;
use crate::round2;
use crate::table::MeasurementTable;

/// Mean concentration per (weekday, hour). Rows run Sunday..Saturday and
/// columns by ascending hour; only weekdays and hours that occur are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pivot {
    pub pollutant: Pollutant,
    pub hours: Vec<u32>,
    pub days: Vec<&'static str>,
    /// `cells[day][hour]`, `None` where no sample falls.
    pub cells: Vec<Vec<Option<f64>>>,
}

impl Pivot {
    pub fn shape(&self) -> (usize, usize) {
        (self.days.len(), self.hours.len())
    }
}

pub fn pivot(table: &MeasurementTable, pollutant: Pollutant) -> Pivot {
    let mut sums: BTreeMap<(u32, u32), (f64, usize)> = BTreeMap::new();
    let mut days: BTreeMap<u32, Weekday> = BTreeMap::new();
    let mut hours: BTreeSet<u32> = BTreeSet::new();

    for (ts, value) in table.clamped(pollutant) {
        let day = ts.weekday();
        let day_key = day.num_days_from_sunday();
        days.insert(day_key, day);
        hours.insert(ts.hour());
        let slot = sums.entry((day_key, ts.hour())).or_insert((0.0, 0));
        slot.0 += value;
        slot.1 += 1;
    }

    let hours: Vec<u32> = hours.into_iter().collect();
    let cells = days
        .keys()
        .map(|day_key| {
            hours
                .iter()
                .map(|hour| {
                    sums.get(&(*day_key, *hour))
                        .map(|(sum, count)| round2(sum / *count as f64))
                })
                .collect()
        })
        .collect();

    Pivot {
        pollutant,
        hours,
        days: days.into_values().map(day_name).collect(),
        cells,
    }
}
