// Dashboard configuration - file + defaults, and per-request view settings
use crate::domain::channel::ChannelKind;
use crate::domain::trend::TrendParams;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;

/// Widest accepted resampling interval (one week).
pub const MAX_RESAMPLE_MINUTES: u32 = 7 * 24 * 60;

/// Environment variable holding the channel read API key.
pub const READ_KEY_ENV: &str = "TS_READ";

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub server: ServerSettings,
    pub feed: FeedSettings,
    pub channels: ChannelSettings,
    pub view: ViewDefaults,
    #[serde(default)]
    pub trend: TrendParams,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_points: u32,
    pub cache_ttl_secs: u64,
}

impl FeedSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSettings {
    pub soil: u64,
    pub environment: u64,
}

impl ChannelSettings {
    pub fn id(&self, kind: ChannelKind) -> u64 {
        match kind {
            ChannelKind::Soil => self.soil,
            ChannelKind::Environment => self.environment,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewDefaults {
    pub timezone: String,
    pub resample_minutes: NonZeroU32,
}

/// Per-request overrides of the view defaults.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ViewOverrides {
    pub tz: Option<String>,
    pub resample: Option<u32>,
    pub range: Option<bool>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSelection {
    Latest,
    Dates { start: NaiveDate, end: NaiveDate },
}

/// Everything a pipeline run needs to know about the current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    pub timezone: Tz,
    pub resample_minutes: NonZeroU32,
    pub range: RangeSelection,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("unknown time zone '{0}'")]
    UnknownTimezone(String),
    #[error("resampling interval must be at least one minute")]
    ZeroResample,
    #[error("resampling interval of {0} minutes exceeds the 10080 minute limit")]
    ResampleTooLarge(u32),
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

impl ViewDefaults {
    /// Apply `overrides`; date bounds default to yesterday..today in the chosen zone.
    pub fn resolve(&self, overrides: &ViewOverrides, now: DateTime<Utc>) -> Result<ViewSettings, SettingsError> {
        let tz_name = overrides.tz.as_deref().unwrap_or(&self.timezone).trim();
        let timezone: Tz = tz_name
            .parse()
            .map_err(|_| SettingsError::UnknownTimezone(tz_name.to_string()))?;

        let resample_minutes = match overrides.resample {
            Some(minutes) if minutes > MAX_RESAMPLE_MINUTES => {
                return Err(SettingsError::ResampleTooLarge(minutes));
            }
            Some(minutes) => NonZeroU32::new(minutes).ok_or(SettingsError::ZeroResample)?,
            None => self.resample_minutes,
        };

        let use_range = overrides
            .range
            .unwrap_or(overrides.start.is_some() || overrides.end.is_some());
        let range = if use_range {
            let today = now.with_timezone(&timezone).date_naive();
            let start = overrides.start.unwrap_or(today - TimeDelta::days(1));
            let end = overrides.end.unwrap_or(today);
            if start > end {
                return Err(SettingsError::InvertedRange { start, end });
            }
            RangeSelection::Dates { start, end }
        } else {
            RangeSelection::Latest
        };

        Ok(ViewSettings {
            timezone,
            resample_minutes,
            range,
        })
    }
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    load_from_source(config::File::with_name("config/dashboard").required(false))
}

fn load_from_source<S>(source: S) -> anyhow::Result<DashboardConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("feed.base_url", "https://api.thingspeak.com")?
        .set_default("feed.timeout_secs", 30_i64)?
        .set_default("feed.max_points", 8000_i64)?
        .set_default("feed.cache_ttl_secs", 300_i64)?
        .set_default("channels.soil", 2869579_i64)?
        .set_default("channels.environment", 2913085_i64)?
        .set_default("view.timezone", "America/Monterrey")?
        .set_default("view.resample_minutes", 10_i64)?
        .add_source(source)
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Read key from the environment; blank counts as unset.
pub fn read_key_from_env() -> Option<String> {
    std::env::var(READ_KEY_ENV)
        .ok()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::channel::Slot;
    use chrono::TimeZone;
    use config::{File, FileFormat};

    fn defaults() -> ViewDefaults {
        ViewDefaults {
            timezone: "America/Monterrey".to_string(),
            resample_minutes: NonZeroU32::new(10).unwrap(),
        }
    }

    fn now() -> DateTime<Utc> {
        // 02:00 UTC is still the previous evening in Monterrey.
        Utc.with_ymd_and_hms(2025, 3, 14, 2, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn test_builtin_defaults() {
        let config = load_from_source(File::from_str("", FileFormat::Toml)).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.feed.max_points, 8000);
        assert_eq!(config.feed.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.channels.id(ChannelKind::Soil), 2869579);
        assert_eq!(config.channels.id(ChannelKind::Environment), 2913085);
        assert_eq!(config.view.resample_minutes.get(), 10);
        assert_eq!(config.trend, TrendParams::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let toml = r#"
            [channels]
            soil = 1
            environment = 2

            [view]
            timezone = "UTC"
            resample_minutes = 5

            [trend]
            slope_field = 3
            window_size = 12
        "#;
        let config = load_from_source(File::from_str(toml, FileFormat::Toml)).unwrap();
        assert_eq!(config.channels, ChannelSettings { soil: 1, environment: 2 });
        assert_eq!(config.view.timezone, "UTC");
        assert_eq!(config.trend.slope_field, Slot::Field3);
        assert_eq!(config.trend.window_size, 12);
        assert_eq!(config.trend.intercept_field, Slot::Field6);
    }

    #[test]
    fn test_resolve_uses_defaults() {
        let settings = defaults().resolve(&ViewOverrides::default(), now()).unwrap();
        assert_eq!(settings.timezone, chrono_tz::America::Monterrey);
        assert_eq!(settings.resample_minutes.get(), 10);
        assert_eq!(settings.range, RangeSelection::Latest);
    }

    #[test]
    fn test_range_defaults_to_local_yesterday_and_today() {
        let overrides = ViewOverrides {
            range: Some(true),
            ..ViewOverrides::default()
        };
        let settings = defaults().resolve(&overrides, now()).unwrap();
        assert_eq!(
            settings.range,
            RangeSelection::Dates {
                start: date(12),
                end: date(13)
            }
        );
    }

    #[test]
    fn test_explicit_dates_imply_range() {
        let overrides = ViewOverrides {
            start: Some(date(1)),
            end: Some(date(3)),
            ..ViewOverrides::default()
        };
        let settings = defaults().resolve(&overrides, now()).unwrap();
        assert_eq!(
            settings.range,
            RangeSelection::Dates {
                start: date(1),
                end: date(3)
            }
        );
    }

    #[test]
    fn test_invalid_overrides_are_rejected() {
        let bad_tz = ViewOverrides {
            tz: Some("Mars/Olympus".to_string()),
            ..ViewOverrides::default()
        };
        assert_eq!(
            defaults().resolve(&bad_tz, now()),
            Err(SettingsError::UnknownTimezone("Mars/Olympus".to_string()))
        );

        let zero = ViewOverrides {
            resample: Some(0),
            ..ViewOverrides::default()
        };
        assert_eq!(defaults().resolve(&zero, now()), Err(SettingsError::ZeroResample));

        let huge = ViewOverrides {
            resample: Some(2_000_000_000),
            ..ViewOverrides::default()
        };
        assert_eq!(
            defaults().resolve(&huge, now()),
            Err(SettingsError::ResampleTooLarge(2_000_000_000))
        );

        let week = ViewOverrides {
            resample: Some(MAX_RESAMPLE_MINUTES),
            ..ViewOverrides::default()
        };
        assert!(defaults().resolve(&week, now()).is_ok());

        let inverted = ViewOverrides {
            start: Some(date(5)),
            end: Some(date(4)),
            ..ViewOverrides::default()
        };
        assert!(matches!(
            defaults().resolve(&inverted, now()),
            Err(SettingsError::InvertedRange { .. })
        ));
    }
}
