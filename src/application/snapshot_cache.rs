// Snapshot cache - short-lived normalized feed snapshots keyed by request
use crate::application::feed_repository::FeedRequest;
use crate::domain::channel::ChannelMetadata;
use crate::domain::series::LocalTable;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Metadata plus the normalized table from one fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelSnapshot {
    pub metadata: ChannelMetadata,
    pub table: LocalTable,
}

struct CachedSnapshot {
    fetched_at: Instant,
    snapshot: Arc<ChannelSnapshot>,
}

pub struct SnapshotCache {
    ttl: Duration,
    entries: Mutex<HashMap<FeedRequest, CachedSnapshot>>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh snapshot for `request`, evicting it if it has expired.
    pub async fn get(&self, request: &FeedRequest) -> Option<Arc<ChannelSnapshot>> {
        let mut entries = self.entries.lock().await;
        if let Some(cached) = entries.get(request) {
            if cached.fetched_at.elapsed() < self.ttl {
                return Some(cached.snapshot.clone());
            }
            entries.remove(request);
        }
        None
    }

    pub async fn insert(&self, request: FeedRequest, snapshot: Arc<ChannelSnapshot>) {
        let cached = CachedSnapshot {
            fetched_at: Instant::now(),
            snapshot,
        };
        let mut entries = self.entries.lock().await;
        entries.retain(|_, cached| cached.fetched_at.elapsed() < self.ttl);
        entries.insert(request, cached);
    }

    /// Drop every snapshot; returns how many were held.
    pub async fn invalidate(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let dropped = entries.len();
        entries.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::feed_repository::FetchMode;
    use chrono::NaiveDate;

    fn request(channel_id: u64) -> FeedRequest {
        FeedRequest {
            channel_id,
            timezone: chrono_tz::America::Monterrey,
            mode: FetchMode::Latest { results: 100 },
            api_key: None,
        }
    }

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let cache = SnapshotCache::new(Duration::from_secs(300));
        cache.insert(request(1), Arc::new(ChannelSnapshot::default())).await;

        assert!(cache.get(&request(1)).await.is_some());
        assert!(cache.get(&request(2)).await.is_none());
    }

    #[tokio::test]
    async fn test_key_includes_mode_and_key() {
        let cache = SnapshotCache::new(Duration::from_secs(300));
        cache.insert(request(1), Arc::new(ChannelSnapshot::default())).await;

        let mut other_mode = request(1);
        other_mode.mode = FetchMode::Latest { results: 50 };
        assert!(cache.get(&other_mode).await.is_none());

        let mut keyed = request(1);
        keyed.api_key = Some("KEY".to_string());
        assert!(cache.get(&keyed).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted() {
        let cache = SnapshotCache::new(Duration::ZERO);
        cache.insert(request(1), Arc::new(ChannelSnapshot::default())).await;

        assert!(cache.get(&request(1)).await.is_none());
        assert_eq!(cache.invalidate().await, 0);
    }

    #[tokio::test]
    async fn test_insert_evicts_expired_entries_for_other_keys() {
        let cache = SnapshotCache::new(Duration::ZERO);
        for day in 1..=20 {
            let mut ranged = request(1);
            ranged.mode = FetchMode::DateRange {
                start: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
                end: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            };
            cache.insert(ranged, Arc::new(ChannelSnapshot::default())).await;
        }

        // Only the entry inserted last survives the sweep.
        assert_eq!(cache.entries.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_clears_everything() {
        let cache = SnapshotCache::new(Duration::from_secs(300));
        cache.insert(request(1), Arc::new(ChannelSnapshot::default())).await;
        cache.insert(request(2), Arc::new(ChannelSnapshot::default())).await;

        assert_eq!(cache.invalidate().await, 2);
        assert!(cache.get(&request(1)).await.is_none());
    }
}
