// Series normalizer - raw feed rows to a zone-naive local table
use crate::application::feed_repository::RawRecord;
use crate::domain::channel::{FieldValues, Slot};
use crate::domain::series::{LocalTable, Reading};
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use std::collections::BTreeSet;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Build the local table for `timezone`.
///
/// Rows whose timestamp does not parse are dropped; a field that does not
/// parse is missing for that row only. Instants are converted to local wall
/// clock time and the zone is then discarded so bucketing never sees an
/// offset change.
pub fn normalize(records: &[RawRecord], timezone: Tz) -> LocalTable {
    if records.is_empty() {
        return LocalTable::empty();
    }

    let columns: BTreeSet<Slot> = records
        .iter()
        .flat_map(|record| record.fields.keys().copied())
        .collect();

    let rows: Vec<Reading> = records
        .iter()
        .filter_map(|record| {
            let instant = record.created_at.as_deref().and_then(parse_instant)?;
            let local = instant.with_timezone(&timezone).naive_local();

            let mut values = FieldValues::default();
            for (slot, raw) in &record.fields {
                values.set(*slot, raw.as_deref().and_then(coerce_number));
            }
            Some(Reading::new(local, values))
        })
        .collect();

    let dropped = records.len() - rows.len();
    if dropped > 0 {
        tracing::warn!("Dropped {} of {} rows with unparseable timestamps", dropped, records.len());
    }

    LocalTable::new(rows, columns)
}

/// Offsets are honored; timestamps without one are taken as UTC.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z") {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Finite number or missing.
pub fn coerce_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}
