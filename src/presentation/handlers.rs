// HTTP request handlers
use crate::application::feed_repository::FeedError;
use crate::domain::channel::{ChannelKind, Slot};
use crate::domain::dashboard::{MetricView, SummaryView};
use crate::domain::metric::Metric;
use crate::domain::threshold::ThresholdKey;
use crate::infrastructure::config::{SettingsError, ViewOverrides, ViewSettings};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Settings(SettingsError),
    NotFound(String),
    Feed(FeedError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Settings(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Feed(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<SettingsError> for ApiError {
    fn from(e: SettingsError) -> Self {
        ApiError::Settings(e)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<FeedError> for ApiError {
    fn from(e: FeedError) -> Self {
        ApiError::Feed(e)
    }
}

#[derive(Serialize)]
pub struct CatalogEntry {
    metric: Metric,
    title: &'static str,
    unit: &'static str,
    channel: ChannelKind,
    field: Slot,
}

#[derive(Serialize)]
pub struct LabelsResponse {
    channel: ChannelKind,
    channel_id: Option<u64>,
    name: Option<String>,
    labels: BTreeMap<&'static str, String>,
}

#[derive(Serialize)]
pub struct ThresholdEntry {
    metric: ThresholdKey,
    low: f64,
    high: f64,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    dropped: usize,
}

fn view_settings(
    state: &AppState,
    overrides: Result<Query<ViewOverrides>, QueryRejection>,
) -> Result<ViewSettings, ApiError> {
    let Query(overrides) = overrides?;
    Ok(state.view_defaults.resolve(&overrides, Utc::now())?)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Headline cards with threshold status
pub async fn summary(
    overrides: Result<Query<ViewOverrides>, QueryRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<SummaryView>, ApiError> {
    let settings = view_settings(&state, overrides)?;
    Ok(Json(state.dashboard_service.summary(&settings).await?))
}

/// Every metric page the dashboard offers
pub async fn list_metrics() -> Json<Vec<CatalogEntry>> {
    let entries = Metric::ALL
        .into_iter()
        .map(|metric| CatalogEntry {
            metric,
            title: metric.title(),
            unit: metric.unit(),
            channel: metric.channel(),
            field: metric.slot(),
        })
        .collect();
    Json(entries)
}

/// Fixed bands used to color the summary cards
pub async fn list_thresholds() -> Json<Vec<ThresholdEntry>> {
    let entries = ThresholdKey::ALL
        .into_iter()
        .map(|metric| {
            let band = metric.band();
            ThresholdEntry {
                metric,
                low: band.low,
                high: band.high,
            }
        })
        .collect();
    Json(entries)
}

/// Card, resampled series and (for air temperature) the trend overlay
pub async fn metric_view(
    Path(slug): Path<String>,
    overrides: Result<Query<ViewOverrides>, QueryRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MetricView>, ApiError> {
    let metric: Metric = slug.parse().map_err(ApiError::NotFound)?;
    let settings = view_settings(&state, overrides)?;
    Ok(Json(state.dashboard_service.metric_view(metric, &settings).await?))
}

pub async fn channel_labels(
    Path(channel): Path<String>,
    overrides: Result<Query<ViewOverrides>, QueryRejection>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<LabelsResponse>, ApiError> {
    let kind: ChannelKind = channel.parse().map_err(ApiError::NotFound)?;
    let settings = view_settings(&state, overrides)?;
    let labels = state.dashboard_service.labels(kind, &settings).await?;

    Ok(Json(LabelsResponse {
        channel: kind,
        channel_id: labels.channel_id,
        name: labels.name,
        labels: labels
            .fields
            .iter()
            .map(|(slot, name)| (slot.ident(), name.to_string()))
            .collect(),
    }))
}

/// Drop cached snapshots so the next read refetches
pub async fn refresh(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    let dropped = state.dashboard_service.refresh().await;
    Json(RefreshResponse { dropped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::Uri;

    #[tokio::test]
    async fn test_error_status_codes() {
        let bad = ApiError::Settings(SettingsError::ZeroResample).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let missing = ApiError::NotFound("unknown metric 'x'".to_string()).into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let upstream = ApiError::Feed(FeedError::Status {
            channel_id: 7,
            status: 500,
            body: "oops".to_string(),
        })
        .into_response();
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);

        let body = to_bytes(upstream.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "channel 7 feed returned status 500: oops");
    }

    async fn query_error(uri: &str) -> (StatusCode, serde_json::Value) {
        let uri: Uri = uri.parse().unwrap();
        let rejection = Query::<ViewOverrides>::try_from_uri(&uri).unwrap_err();
        let response = ApiError::from(rejection).into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_malformed_query_is_json_bad_request() {
        let (status, json) = query_error("/metrics/air-temperature?resample=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());

        let (status, json) = query_error("/summary?start=2025-13-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }

    #[test]
    fn test_well_formed_query_parses() {
        let uri: Uri = "/summary?tz=UTC&resample=5&start=2025-03-01".parse().unwrap();
        let Query(overrides) = Query::<ViewOverrides>::try_from_uri(&uri).unwrap();
        assert_eq!(overrides.tz.as_deref(), Some("UTC"));
        assert_eq!(overrides.resample, Some(5));
        assert!(overrides.start.is_some());
    }

    #[tokio::test]
    async fn test_catalog_lists_every_metric() {
        let Json(entries) = list_metrics().await;
        assert_eq!(entries.len(), Metric::ALL.len());

        let json = serde_json::to_value(&entries[0]).unwrap();
        assert_eq!(json["metric"], "soil-temperature");
        assert_eq!(json["channel"], "soil");
        assert_eq!(json["field"], 1);
    }

    #[tokio::test]
    async fn test_threshold_listing() {
        let Json(entries) = list_thresholds().await;
        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(json[1]["metric"], "air_temp");
        assert_eq!(json[1]["low"], 20.0);
        assert_eq!(json[1]["high"], 30.0);
    }
}
