// Time-indexed feed table and the per-field derivations drawn from it
use super::channel::{FieldValues, Slot, SLOT_COUNT};
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use serde::Serialize;
use std::collections::BTreeMap;
use std::num::NonZeroU32;

/// One normalized row: zone-naive local timestamp plus its field values.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub values: FieldValues,
}

impl Reading {
    pub fn new(timestamp: NaiveDateTime, values: FieldValues) -> Self {
        Self { timestamp, values }
    }
}

/// Rows ordered by local timestamp, plus which field slots the source carried.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalTable {
    rows: Vec<Reading>,
    columns: [bool; SLOT_COUNT],
}

impl LocalTable {
    pub fn new(mut rows: Vec<Reading>, columns: impl IntoIterator<Item = Slot>) -> Self {
        // Stable: rows sharing an instant keep their feed order.
        rows.sort_by_key(|row| row.timestamp);
        let mut present = [false; SLOT_COUNT];
        for slot in columns {
            present[slot.index()] = true;
        }
        Self {
            rows,
            columns: present,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Reading] {
        &self.rows
    }

    pub fn has_field(&self, slot: Slot) -> bool {
        self.columns[slot.index()]
    }

    /// Non-missing `(timestamp, value)` pairs of one field in index order.
    pub fn field_values(&self, slot: Slot) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.rows
            .iter()
            .filter_map(move |row| row.values.get(slot).map(|value| (row.timestamp, value)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl Point {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Bucket means labeled by each bucket's closing boundary; empty buckets are absent.
pub type ResampledSeries = Vec<Point>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatestValue {
    pub value: Option<f64>,
    pub timestamp: Option<NaiveDateTime>,
}

/// Most recent non-missing entry of `slot`, or an all-`None` value.
pub fn latest(table: &LocalTable, slot: Slot) -> LatestValue {
    if table.is_empty() || !table.has_field(slot) {
        return LatestValue::default();
    }

    table
        .field_values(slot)
        .last()
        .map(|(timestamp, value)| LatestValue {
            value: Some(value),
            timestamp: Some(timestamp),
        })
        .unwrap_or_default()
}

/// Mean-resample one field into fixed-width, right-labeled buckets.
///
/// Buckets are closed on the left and aligned to local midnight of the first
/// row's day. Only buckets with at least one non-missing value are emitted.
pub fn resample(table: &LocalTable, slot: Slot, bucket_minutes: NonZeroU32) -> ResampledSeries {
    let Some(first) = table.rows().first() else {
        return Vec::new();
    };
    if !table.has_field(slot) {
        return Vec::new();
    }

    let width = TimeDelta::minutes(i64::from(bucket_minutes.get()));
    let width_ms = width.num_milliseconds();
    let origin = first.timestamp.date().and_time(NaiveTime::MIN);

    let mut buckets: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
    for (timestamp, value) in table.field_values(slot) {
        let offset_ms = (timestamp - origin).num_milliseconds();
        let bucket = offset_ms.div_euclid(width_ms);
        let entry = buckets.entry(bucket).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(bucket, (sum, count))| {
            let label = origin + TimeDelta::milliseconds((bucket + 1) * width_ms);
            Point::new(label, sum / count as f64)
        })
        .collect()
}
