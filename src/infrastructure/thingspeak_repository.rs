// ThingSpeak feed repository implementation
use crate::application::feed_repository::{FeedError, FeedRepository, FeedRequest, FetchMode, RawFeed, RawRecord};
use crate::domain::channel::{ChannelMetadata, Slot};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ThingSpeakRepository {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct FeedPayload {
    #[serde(default)]
    channel: Option<Map<String, Value>>,
    #[serde(default)]
    feeds: Option<Vec<Map<String, Value>>>,
}

impl ThingSpeakRepository {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_feed_url(&self, request: &FeedRequest) -> String {
        let mut url = format!(
            "{}/channels/{}/feeds.json?timezone={}",
            self.base_url,
            request.channel_id,
            urlencoding::encode(request.timezone.name())
        );

        match request.mode {
            FetchMode::Latest { results } => {
                url.push_str(&format!("&results={}", results));
            }
            FetchMode::DateRange { start, end } => {
                let start = format!("{} 00:00:00", start.format("%Y-%m-%d"));
                let end = format!("{} 23:59:59", end.format("%Y-%m-%d"));
                url.push_str(&format!(
                    "&start={}&end={}",
                    urlencoding::encode(&start),
                    urlencoding::encode(&end)
                ));
            }
        }

        if let Some(key) = &request.api_key {
            url.push_str(&format!("&api_key={}", urlencoding::encode(key)));
        }
        url
    }
}

#[async_trait]
impl FeedRepository for ThingSpeakRepository {
    async fn fetch(&self, request: &FeedRequest) -> Result<RawFeed, FeedError> {
        let url = self.build_feed_url(request);
        let channel_id = request.channel_id;
        tracing::debug!("Fetching feed: {:?}", request);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FeedError::Request {
                channel_id,
                source: Box::new(e.without_url()),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| FeedError::Request {
            channel_id,
            source: Box::new(e.without_url()),
        })?;

        if !status.is_success() {
            return Err(FeedError::Status {
                channel_id,
                status: status.as_u16(),
                body,
            });
        }

        let feed = parse_payload(&body).map_err(|source| FeedError::Parse { channel_id, source })?;
        tracing::debug!("Channel {} returned {} rows", channel_id, feed.records.len());
        Ok(feed)
    }
}

/// Decode a feed body. Missing `channel` or `feeds` members mean an empty
/// dataset; a body that is not a JSON object is an error.
fn parse_payload(body: &str) -> Result<RawFeed, serde_json::Error> {
    let payload: FeedPayload = serde_json::from_str(body)?;

    let metadata = payload.channel.as_ref().map(channel_metadata).unwrap_or_default();
    let records = payload
        .feeds
        .unwrap_or_default()
        .iter()
        .map(raw_record)
        .collect();

    Ok(RawFeed { metadata, records })
}

fn channel_metadata(channel: &Map<String, Value>) -> ChannelMetadata {
    let mut metadata = ChannelMetadata::new(
        channel.get("id").and_then(Value::as_u64),
        channel.get("name").and_then(Value::as_str).map(str::to_string),
    );
    for slot in Slot::ALL {
        metadata.set_label(slot, channel.get(slot.ident()).and_then(raw_text));
    }
    metadata
}

fn raw_record(row: &Map<String, Value>) -> RawRecord {
    let fields = row
        .iter()
        .filter_map(|(key, value)| Slot::from_ident(key).map(|slot| (slot, raw_text(value))))
        .collect();

    RawRecord {
        created_at: row.get("created_at").and_then(Value::as_str).map(str::to_string),
        fields,
    }
}

fn raw_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
