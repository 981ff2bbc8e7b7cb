// Threshold bands for the summary metrics
use serde::Serialize;

pub const DEFAULT_BACKGROUND: &str = "#3F4F61";
pub const ALERT_BACKGROUND: &str = "red";

/// Metrics that carry a fixed acceptable band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdKey {
    SoilMoist,
    AirTemp,
    AirHum,
    SoilPh,
}

impl ThresholdKey {
    pub const ALL: [ThresholdKey; 4] = [
        ThresholdKey::SoilMoist,
        ThresholdKey::AirTemp,
        ThresholdKey::AirHum,
        ThresholdKey::SoilPh,
    ];

    pub fn band(self) -> ThresholdBand {
        match self {
            ThresholdKey::SoilMoist => ThresholdBand::new(25.0, 50.0),
            ThresholdKey::AirTemp => ThresholdBand::new(20.0, 30.0),
            ThresholdKey::AirHum => ThresholdBand::new(40.0, 60.0),
            ThresholdKey::SoilPh => ThresholdBand::new(5.5, 6.8),
        }
    }
}

/// Inclusive `[low, high]` band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdBand {
    pub low: f64,
    pub high: f64,
}

impl ThresholdBand {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeStatus {
    InRange,
    OutOfRange,
    NoData,
}

impl RangeStatus {
    /// Card background used by the dashboard for this status.
    pub fn background(self) -> &'static str {
        match self {
            RangeStatus::OutOfRange => ALERT_BACKGROUND,
            RangeStatus::InRange | RangeStatus::NoData => DEFAULT_BACKGROUND,
        }
    }
}

pub fn classify(key: ThresholdKey, value: Option<f64>) -> RangeStatus {
    match value {
        None => RangeStatus::NoData,
        Some(v) if key.band().contains(v) => RangeStatus::InRange,
        Some(_) => RangeStatus::OutOfRange,
    }
}
