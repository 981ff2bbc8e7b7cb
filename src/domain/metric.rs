// Metric catalog - one entry per chart page
use super::channel::{ChannelKind, Slot};
use super::threshold::ThresholdKey;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    SoilTemperature,
    SoilMoisture,
    SoilConductivity,
    SoilPh,
    SoilNitrogen,
    SoilPhosphorus,
    SoilPotassium,
    AirTemperature,
    AirHumidity,
    Luminosity,
    Co2,
}

impl Metric {
    pub const ALL: [Metric; 11] = [
        Metric::SoilTemperature,
        Metric::SoilMoisture,
        Metric::SoilConductivity,
        Metric::SoilPh,
        Metric::SoilNitrogen,
        Metric::SoilPhosphorus,
        Metric::SoilPotassium,
        Metric::AirTemperature,
        Metric::AirHumidity,
        Metric::Luminosity,
        Metric::Co2,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Metric::SoilTemperature => "soil-temperature",
            Metric::SoilMoisture => "soil-moisture",
            Metric::SoilConductivity => "soil-conductivity",
            Metric::SoilPh => "soil-ph",
            Metric::SoilNitrogen => "soil-nitrogen",
            Metric::SoilPhosphorus => "soil-phosphorus",
            Metric::SoilPotassium => "soil-potassium",
            Metric::AirTemperature => "air-temperature",
            Metric::AirHumidity => "air-humidity",
            Metric::Luminosity => "luminosity",
            Metric::Co2 => "co2",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Metric::SoilTemperature => "Soil Temperature",
            Metric::SoilMoisture => "Soil Moisture",
            Metric::SoilConductivity => "Soil Conductivity",
            Metric::SoilPh => "Soil pH",
            Metric::SoilNitrogen => "Soil N concentration",
            Metric::SoilPhosphorus => "Soil P concentration",
            Metric::SoilPotassium => "Soil K concentration",
            Metric::AirTemperature => "Air Temperature",
            Metric::AirHumidity => "Air Humidity",
            Metric::Luminosity => "Luminosity",
            Metric::Co2 => "CO2 concentration",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Metric::SoilTemperature | Metric::AirTemperature => "°C",
            Metric::SoilMoisture | Metric::AirHumidity => "%",
            Metric::SoilConductivity => "µS/cm",
            Metric::SoilPh => "pH",
            Metric::SoilNitrogen | Metric::SoilPhosphorus | Metric::SoilPotassium => "mg/kg",
            Metric::Luminosity => "lux",
            Metric::Co2 => "ppm",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Metric::SoilTemperature | Metric::AirTemperature => "🌡️",
            Metric::SoilMoisture => "💧",
            Metric::SoilConductivity => "🧲",
            Metric::SoilPh => "🧪",
            Metric::SoilNitrogen | Metric::SoilPhosphorus | Metric::SoilPotassium => "🧬",
            Metric::AirHumidity => "💦",
            Metric::Luminosity => "💡",
            Metric::Co2 => "🟢",
        }
    }

    pub fn channel(self) -> ChannelKind {
        match self {
            Metric::SoilTemperature
            | Metric::SoilMoisture
            | Metric::SoilConductivity
            | Metric::SoilPh
            | Metric::SoilNitrogen
            | Metric::SoilPhosphorus
            | Metric::SoilPotassium => ChannelKind::Soil,
            Metric::AirTemperature | Metric::AirHumidity | Metric::Luminosity | Metric::Co2 => {
                ChannelKind::Environment
            }
        }
    }

    pub fn slot(self) -> Slot {
        match self {
            Metric::SoilTemperature | Metric::AirTemperature => Slot::Field1,
            Metric::SoilMoisture | Metric::AirHumidity => Slot::Field2,
            Metric::SoilConductivity | Metric::Luminosity => Slot::Field3,
            Metric::SoilPh | Metric::Co2 => Slot::Field4,
            Metric::SoilNitrogen => Slot::Field5,
            Metric::SoilPhosphorus => Slot::Field6,
            Metric::SoilPotassium => Slot::Field7,
        }
    }

    /// Only the air temperature page overlays the projected trend.
    pub fn has_trend(self) -> bool {
        self == Metric::AirTemperature
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|metric| metric.slug() == s)
            .ok_or_else(|| format!("unknown metric '{}'", s))
    }
}

/// A card on the summary page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryCard {
    pub title: &'static str,
    pub metric: Metric,
    pub threshold: ThresholdKey,
}

pub const SUMMARY_CARDS: [SummaryCard; 4] = [
    SummaryCard {
        title: "Soil Moisture",
        metric: Metric::SoilMoisture,
        threshold: ThresholdKey::SoilMoist,
    },
    SummaryCard {
        title: "Air Temp",
        metric: Metric::AirTemperature,
        threshold: ThresholdKey::AirTemp,
    },
    SummaryCard {
        title: "Air Humidity",
        metric: Metric::AirHumidity,
        threshold: ThresholdKey::AirHum,
    },
    SummaryCard {
        title: "Soil pH",
        metric: Metric::SoilPh,
        threshold: ThresholdKey::SoilPh,
    },
];
