// Repository trait for reading channel feeds
use crate::domain::channel::{ChannelMetadata, Slot};
use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Which rows to ask the feed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// The most recent `results` rows.
    Latest { results: u32 },
    /// Every row from `start` 00:00:00 through `end` 23:59:59 in the request zone.
    DateRange { start: NaiveDate, end: NaiveDate },
}

/// A single feed read; also the cache key for its snapshot.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FeedRequest {
    pub channel_id: u64,
    pub timezone: Tz,
    pub mode: FetchMode,
    pub api_key: Option<String>,
}

impl fmt::Debug for FeedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedRequest")
            .field("channel_id", &self.channel_id)
            .field("timezone", &self.timezone.name())
            .field("mode", &self.mode)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// One feed row as delivered: the creation time and the raw text of each
/// field key the row carried (`None` for an explicit null).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub created_at: Option<String>,
    pub fields: BTreeMap<Slot, Option<String>>,
}

#[cfg(test)]
impl RawRecord {
    pub fn new(created_at: &str) -> Self {
        Self {
            created_at: Some(created_at.to_string()),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, slot: Slot, raw: Option<&str>) -> Self {
        self.fields.insert(slot, raw.map(str::to_string));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeed {
    pub metadata: ChannelMetadata,
    pub records: Vec<RawRecord>,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request for channel {channel_id} failed: {source}")]
    Request {
        channel_id: u64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("channel {channel_id} feed returned status {status}: {body}")]
    Status {
        channel_id: u64,
        status: u16,
        body: String,
    },

    #[error("channel {channel_id} feed body could not be parsed: {source}")]
    Parse {
        channel_id: u64,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait FeedRepository: Send + Sync {
    /// Read channel metadata and rows. Never retries.
    async fn fetch(&self, request: &FeedRequest) -> Result<RawFeed, FeedError>;
}
