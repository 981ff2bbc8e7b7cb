// Dashboard view models handed to the presentation layer
use super::metric::Metric;
use super::series::{LatestValue, Point};
use super::threshold::{RangeStatus, DEFAULT_BACKGROUND};
use super::trend::TrendModel;
use chrono::NaiveDateTime;
use serde::Serialize;

pub const FIELD_UNAVAILABLE: &str = "Field not available.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub title: String,
    pub unit: String,
    pub icon: String,
    pub value: Option<f64>,
    pub display: String,
    pub timestamp: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RangeStatus>,
    pub background: String,
}

impl KpiCard {
    pub fn new(metric: Metric, title: &str, latest: LatestValue) -> Self {
        Self {
            title: title.to_string(),
            unit: metric.unit().to_string(),
            icon: metric.icon().to_string(),
            value: latest.value,
            display: display_value(latest.value, metric.unit()),
            timestamp: latest.timestamp,
            status: None,
            background: DEFAULT_BACKGROUND.to_string(),
        }
    }

    pub fn with_status(mut self, status: RangeStatus) -> Self {
        self.status = Some(status);
        self.background = status.background().to_string();
        self
    }
}

/// Value as the dashboard prints it, e.g. `24.50 °C`, or an em dash.
fn display_value(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(value) => format!("{:.2} {}", value, unit).trim().to_string(),
        None => "—".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub cards: Vec<KpiCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationLegend {
    pub name: String,
    pub value: f64,
    pub anchor: Point,
}

impl CorrelationLegend {
    pub fn new(value: f64, anchor: Point) -> Self {
        Self {
            name: format!("r = {:.3}", value),
            value,
            anchor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendOverlay {
    pub name: String,
    pub model: TrendModel,
    pub points: Vec<Point>,
    pub correlation: Option<CorrelationLegend>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricView {
    pub metric: Metric,
    pub y_label: String,
    pub card: KpiCard,
    pub series: Vec<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendOverlay>,
}
