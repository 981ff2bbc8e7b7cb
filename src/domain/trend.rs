// Linear trend projection from an upstream (slope, intercept) model
use super::channel::Slot;
use super::series::{latest, resample, LocalTable, Point};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// Which feed fields carry the model and how far to project it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrendParams {
    pub slope_field: Slot,
    pub intercept_field: Slot,
    pub correlation_field: Slot,
    pub window_size: usize,
    pub future_steps: usize,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            slope_field: Slot::Field5,
            intercept_field: Slot::Field6,
            correlation_field: Slot::Field7,
            window_size: 30,
            future_steps: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendModel {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendModel {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// Latest reported model; `None` unless both fields have a value.
    pub fn from_table(table: &LocalTable, slope_field: Slot, intercept_field: Slot) -> Option<Self> {
        let slope = latest(table, slope_field).value?;
        let intercept = latest(table, intercept_field).value?;
        Some(Self::new(slope, intercept))
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendProjection {
    pub model: TrendModel,
    pub points: Vec<Point>,
}

/// Resample the temperature field and project the latest model over it.
pub fn project(
    table: &LocalTable,
    temperature_field: Slot,
    params: &TrendParams,
    bucket_minutes: NonZeroU32,
) -> Option<TrendProjection> {
    let model = TrendModel::from_table(table, params.slope_field, params.intercept_field)?;
    let series = resample(table, temperature_field, bucket_minutes);
    project_series(&series, model, params, bucket_minutes)
}

/// Evaluate `model` at x = 0..window_size + future_steps on a time axis that
/// starts at the trailing window's first timestamp.
///
/// The step is the gap between the window's first two points, or the bucket
/// width when the window holds a single point. Returns `None` when the axis
/// would run past the representable date range.
pub fn project_series(
    series: &[Point],
    model: TrendModel,
    params: &TrendParams,
    bucket_minutes: NonZeroU32,
) -> Option<TrendProjection> {
    if series.is_empty() {
        return None;
    }

    let anchor_len = params.window_size.clamp(1, series.len());
    let window = &series[series.len() - anchor_len..];
    let start = window[0].timestamp;
    let step = match window {
        [first, second, ..] => second.timestamp - first.timestamp,
        _ => TimeDelta::minutes(i64::from(bucket_minutes.get())),
    };

    let total = params.window_size + params.future_steps;
    let mut points = Vec::with_capacity(total);
    let mut timestamp = start;
    for x in 0..total {
        if x > 0 {
            timestamp = timestamp.checked_add_signed(step)?;
        }
        points.push(Point::new(timestamp, model.evaluate(x as f64)));
    }

    Some(TrendProjection { model, points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::channel::FieldValues;
    use crate::domain::series::tests::at;
    use crate::domain::series::Reading;

    fn minutes(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn ten_minute_series(len: u32) -> Vec<Point> {
        (0..len)
            .map(|i| Point::new(at(12, 0) + TimeDelta::minutes(i64::from(i) * 10), 25.0))
            .collect()
    }

    #[test]
    fn test_projection_length_and_axis() {
        let series = ten_minute_series(5);
        let params = TrendParams::default();

        let projection = project_series(&series, TrendModel::new(0.5, 20.0), &params, minutes(1)).unwrap();
        assert_eq!(projection.points.len(), 130);
        assert_eq!(projection.points[0], Point::new(at(12, 0), 20.0));
        assert_eq!(projection.points[1], Point::new(at(12, 10), 20.5));
        assert_eq!(
            projection.points[129].timestamp,
            at(12, 0) + TimeDelta::minutes(10 * 129)
        );
        assert_eq!(projection.points[129].value, 0.5 * 129.0 + 20.0);
    }

    #[test]
    fn test_window_anchors_on_trailing_points() {
        let series = ten_minute_series(40);
        let params = TrendParams {
            window_size: 30,
            future_steps: 10,
            ..TrendParams::default()
        };

        let projection = project_series(&series, TrendModel::new(1.0, 0.0), &params, minutes(10)).unwrap();
        assert_eq!(projection.points.len(), 40);
        assert_eq!(projection.points[0].timestamp, series[10].timestamp);
    }

    #[test]
    fn test_single_point_uses_bucket_width() {
        let series = ten_minute_series(1);
        let params = TrendParams {
            window_size: 3,
            future_steps: 2,
            ..TrendParams::default()
        };

        let projection = project_series(&series, TrendModel::new(0.0, 21.0), &params, minutes(15)).unwrap();
        let stamps: Vec<_> = projection.points.iter().map(|p| p.timestamp).collect();
        assert_eq!(
            stamps,
            vec![at(12, 0), at(12, 15), at(12, 30), at(12, 45), at(13, 0)]
        );
    }

    #[test]
    fn test_axis_past_date_range_has_no_trend() {
        let series = ten_minute_series(1);
        let params = TrendParams::default();

        let projection = project_series(&series, TrendModel::new(0.5, 20.0), &params, minutes(2_000_000_000));
        assert!(projection.is_none());
    }

    #[test]
    fn test_empty_series_has_no_trend() {
        let params = TrendParams::default();
        assert!(project_series(&[], TrendModel::new(1.0, 1.0), &params, minutes(10)).is_none());
    }

    #[test]
    fn test_project_needs_both_model_fields() {
        let rows = vec![
            Reading::new(at(12, 0), FieldValues::default().with(Slot::Field1, 24.0).with(Slot::Field5, 0.1)),
            Reading::new(at(12, 10), FieldValues::default().with(Slot::Field1, 25.0)),
        ];
        let table = LocalTable::new(rows, [Slot::Field1, Slot::Field5, Slot::Field6]);
        let params = TrendParams::default();

        assert!(project(&table, Slot::Field1, &params, minutes(10)).is_none());
    }

    #[test]
    fn test_project_reads_latest_model() {
        let rows = vec![
            Reading::new(
                at(12, 0),
                FieldValues::default()
                    .with(Slot::Field1, 24.0)
                    .with(Slot::Field5, 0.1)
                    .with(Slot::Field6, 19.0),
            ),
            Reading::new(
                at(12, 10),
                FieldValues::default()
                    .with(Slot::Field1, 25.0)
                    .with(Slot::Field5, 0.5)
                    .with(Slot::Field6, 20.0),
            ),
        ];
        let table = LocalTable::new(rows, [Slot::Field1, Slot::Field5, Slot::Field6]);
        let params = TrendParams::default();

        let projection = project(&table, Slot::Field1, &params, minutes(10)).unwrap();
        assert_eq!(projection.model, TrendModel::new(0.5, 20.0));
        // Resampled buckets close at 12:10 and 12:20.
        assert_eq!(projection.points[0].timestamp, at(12, 10));
        assert_eq!(projection.points[1].timestamp, at(12, 20));
        assert_eq!(projection.points.len(), 130);
    }
}
