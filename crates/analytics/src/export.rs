//! CSV export of the filtered table.

use common::{AqiCategory, Error, Pollutant};

use crate::table::MeasurementTable;

pub const EXPORT_FILE_NAME: &str = "file.csv";
pub const EXPORT_CONTENT_TYPE: &str = "text/csv";

/// Render `table` as CSV. The first, unnamed column is the row's index in the
/// full dataset.
pub fn to_csv(table: &MeasurementTable) -> Result<Vec<u8>, Error> {
    let mut wrt = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["", "datetime", "AQI_category"];
    header.extend(Pollutant::ALL.iter().map(|p| p.label()));
    wrt.write_record(&header)?;

    for row in table.rows() {
        let r = &row.record;
        let mut fields = vec![
            row.index.to_string(),
            r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            category_field(r.category()),
        ];
        fields.extend(Pollutant::ALL.iter().map(|p| number_field(r.value(*p))));
        wrt.write_record(&fields)?;
    }

    wrt.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// Unmapped AQI indices are left blank.
fn category_field(category: AqiCategory) -> String {
    match category {
        AqiCategory::Unknown(_) => String::new(),
        known => known.label().to_string(),
    }
}

/// Shortest round-trip form, always with a fractional part (`1.0`, not `1`).
fn number_field(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
