// Dashboard service - summary, metric and label use cases over cached snapshots
use crate::application::feed_repository::{FeedError, FeedRepository, FeedRequest, FetchMode};
use crate::application::normalizer::normalize;
use crate::application::snapshot_cache::{ChannelSnapshot, SnapshotCache};
use crate::domain::channel::{ChannelKind, Slot};
use crate::domain::dashboard::{CorrelationLegend, KpiCard, MetricView, SummaryView, TrendOverlay, FIELD_UNAVAILABLE};
use crate::domain::labels::ChannelLabels;
use crate::domain::metric::{Metric, SUMMARY_CARDS};
use crate::domain::series::{latest, resample, LocalTable, Point};
use crate::domain::threshold::classify;
use crate::domain::trend::{project, TrendParams};
use crate::infrastructure::config::{ChannelSettings, RangeSelection, ViewSettings};
use std::num::NonZeroU32;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn FeedRepository>,
    cache: Arc<SnapshotCache>,
    channels: ChannelSettings,
    trend: TrendParams,
    max_points: u32,
    read_key: Option<String>,
}

impl DashboardService {
    pub fn new(
        repository: Arc<dyn FeedRepository>,
        cache: Arc<SnapshotCache>,
        channels: ChannelSettings,
        trend: TrendParams,
        max_points: u32,
        read_key: Option<String>,
    ) -> Self {
        Self {
            repository,
            cache,
            channels,
            trend,
            max_points,
            read_key,
        }
    }

    fn feed_request(&self, kind: ChannelKind, settings: &ViewSettings) -> FeedRequest {
        let mode = match settings.range {
            RangeSelection::Latest => FetchMode::Latest {
                results: self.max_points,
            },
            RangeSelection::Dates { start, end } => FetchMode::DateRange { start, end },
        };

        FeedRequest {
            channel_id: self.channels.id(kind),
            timezone: settings.timezone,
            mode,
            api_key: self.read_key.clone(),
        }
    }

    /// Cached snapshot of one channel, fetched and normalized on a miss.
    pub async fn snapshot(
        &self,
        kind: ChannelKind,
        settings: &ViewSettings,
    ) -> Result<Arc<ChannelSnapshot>, FeedError> {
        let request = self.feed_request(kind, settings);
        if let Some(snapshot) = self.cache.get(&request).await {
            tracing::debug!("Cache hit for {} channel {}", kind.as_str(), request.channel_id);
            return Ok(snapshot);
        }

        let feed = self.repository.fetch(&request).await.inspect_err(|e| {
            tracing::error!("Fetching {} channel failed: {}", kind.as_str(), e);
        })?;
        let table = normalize(&feed.records, settings.timezone);
        tracing::info!(
            "Loaded {} rows for {} channel {}",
            table.len(),
            kind.as_str(),
            request.channel_id
        );

        let snapshot = Arc::new(ChannelSnapshot {
            metadata: feed.metadata,
            table,
        });
        self.cache.insert(request, snapshot.clone()).await;
        Ok(snapshot)
    }

    /// Latest value and band status of the four headline metrics.
    pub async fn summary(&self, settings: &ViewSettings) -> Result<SummaryView, FeedError> {
        let soil = self.snapshot(ChannelKind::Soil, settings).await?;
        let environment = self.snapshot(ChannelKind::Environment, settings).await?;

        let cards = SUMMARY_CARDS
            .iter()
            .map(|card| {
                let snapshot = match card.metric.channel() {
                    ChannelKind::Soil => &soil,
                    ChannelKind::Environment => &environment,
                };
                let latest = latest(&snapshot.table, card.metric.slot());
                KpiCard::new(card.metric, card.title, latest).with_status(classify(card.threshold, latest.value))
            })
            .collect();

        Ok(SummaryView { cards })
    }

    pub async fn metric_view(&self, metric: Metric, settings: &ViewSettings) -> Result<MetricView, FeedError> {
        let snapshot = self.snapshot(metric.channel(), settings).await?;
        let table = &snapshot.table;
        let slot = metric.slot();

        let mut view = MetricView {
            metric,
            y_label: metric.unit().to_string(),
            card: KpiCard::new(metric, metric.title(), latest(table, slot)),
            series: Vec::new(),
            notice: None,
            trend: None,
        };

        if table.is_empty() || !table.has_field(slot) {
            tracing::warn!("{} has no {} data in this view", metric.slug(), slot);
            view.notice = Some(FIELD_UNAVAILABLE.to_string());
            return Ok(view);
        }

        view.series = resample(table, slot, settings.resample_minutes);
        if metric.has_trend() {
            view.trend = self.trend_overlay(table, slot, &view.series, settings.resample_minutes);
        }
        Ok(view)
    }

    fn trend_overlay(
        &self,
        table: &LocalTable,
        slot: Slot,
        series: &[Point],
        bucket_minutes: NonZeroU32,
    ) -> Option<TrendOverlay> {
        let Some(projection) = project(table, slot, &self.trend, bucket_minutes) else {
            tracing::debug!("No trend model available for {}", slot);
            return None;
        };

        let correlation = latest(table, self.trend.correlation_field)
            .value
            .zip(series.last().copied())
            .map(|(r, anchor)| CorrelationLegend::new(r, anchor));

        Some(TrendOverlay {
            name: format!("Trend (last {} + proj)", self.trend.window_size),
            model: projection.model,
            points: projection.points,
            correlation,
        })
    }

    pub async fn labels(&self, kind: ChannelKind, settings: &ViewSettings) -> Result<ChannelLabels, FeedError> {
        let snapshot = self.snapshot(kind, settings).await?;
        Ok(ChannelLabels::from_metadata(&snapshot.metadata))
    }

    /// Forget every cached snapshot so the next request refetches.
    pub async fn refresh(&self) -> usize {
        let dropped = self.cache.invalidate().await;
        tracing::info!("Refresh requested, dropped {} cached snapshots", dropped);
        dropped
    }
}
