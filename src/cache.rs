//! Single-entry snapshot cache in front of the feed.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::fetch::{HttpClient, fetch_vehicles};
use crate::model::Snapshot;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Upper bound on how early an entry counts as expired, so a refresh timer
/// running at the TTL period never lands just inside the window.
const MAX_EXPIRY_SLACK: Duration = Duration::from_secs(1);

struct Entry {
    stored_at: Instant,
    snapshot: Arc<Snapshot>,
}

/// Holds the last good snapshot for `ttl`, counted from when its request
/// was sent.
///
/// The slot stays locked while a fetch is in flight, so callers arriving in
/// the meantime wait for that fetch and get its snapshot. Failed fetches are
/// not stored.
pub struct SnapshotCache<C> {
    client: C,
    url: String,
    ttl: Duration,
    slot: Mutex<Option<Entry>>,
}

impl<C: HttpClient> SnapshotCache<C> {
    pub fn new(client: C, url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn is_fresh(&self, age: Duration) -> bool {
        let slack = (self.ttl / 10).min(MAX_EXPIRY_SLACK);
        age + slack < self.ttl
    }

    /// Returns the cached snapshot, fetching a new one once it has expired.
    pub async fn get(&self) -> Result<Arc<Snapshot>, FetchError> {
        let mut slot = self.slot.lock().await;

        if let Some(entry) = slot.as_ref() {
            let age = entry.stored_at.elapsed();
            if self.is_fresh(age) {
                debug!(age_ms = age.as_millis() as u64, "Serving cached snapshot");
                return Ok(entry.snapshot.clone());
            }
        }

        let requested_at = Instant::now();
        match fetch_vehicles(&self.client, &self.url).await {
            Ok(vehicles) => {
                info!(vehicles = vehicles.len(), "Fetched new snapshot");
                let snapshot = Arc::new(Snapshot::new(vehicles));
                *slot = Some(Entry {
                    stored_at: requested_at,
                    snapshot: snapshot.clone(),
                });
                Ok(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "Feed fetch failed");
                Err(e)
            }
        }
    }

    /// Forgets the stored snapshot so the next [`get`](Self::get) fetches.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubClient;
    use tokio::time::MissedTickBehavior;

    const BODY: &str = r#"[{"lineLabel": "6", "trip": "1/01", "id": "1_1"}]"#;

    #[tokio::test]
    async fn test_second_get_within_ttl_is_cached() {
        let cache = SnapshotCache::new(StubClient::ok(BODY), "http://feed.test/", DEFAULT_TTL);

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.client.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_gets_share_one_fetch() {
        let client = StubClient::ok(BODY).delayed(Duration::from_millis(50));
        let cache = SnapshotCache::new(client, "http://feed.test/", DEFAULT_TTL);

        let (a, b) = tokio::join!(cache.get(), cache.get());

        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(cache.client.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let cache = SnapshotCache::new(StubClient::ok(BODY), "http://feed.test/", Duration::ZERO);

        cache.get().await.unwrap();
        cache.get().await.unwrap();

        assert_eq!(cache.client.calls(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let cache = SnapshotCache::new(
            StubClient::with_status(500, "oops"),
            "http://feed.test/",
            DEFAULT_TTL,
        );

        assert!(cache.get().await.is_err());
        assert!(cache.get().await.is_err());
        assert_eq!(cache.client.calls(), 2);
    }

    #[tokio::test]
    async fn test_refresh_every_ttl_fetches_every_time() {
        let ttl = Duration::from_millis(200);
        let client = StubClient::ok(BODY).delayed(Duration::from_millis(20));
        let cache = SnapshotCache::new(client, "http://feed.test/", ttl);

        let mut ticker = tokio::time::interval(ttl);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut previous: Option<Arc<Snapshot>> = None;
        for tick in 1..=6 {
            ticker.tick().await;
            let snapshot = cache.get().await.unwrap();
            if let Some(prev) = &previous {
                assert!(!Arc::ptr_eq(prev, &snapshot), "tick {tick} reused the snapshot");
            }
            previous = Some(snapshot);
        }

        assert_eq!(cache.client.calls(), 6);
    }

    #[test]
    fn test_entry_expires_slightly_before_ttl() {
        let cache = SnapshotCache::new(StubClient::ok(BODY), "http://feed.test/", DEFAULT_TTL);

        assert!(cache.is_fresh(Duration::from_secs(30)));
        assert!(cache.is_fresh(Duration::from_millis(58_900)));
        assert!(!cache.is_fresh(Duration::from_millis(59_500)));
        assert!(!cache.is_fresh(DEFAULT_TTL));
    }

    #[tokio::test]
    async fn test_invalidate_forces_fetch() {
        let cache = SnapshotCache::new(StubClient::ok(BODY), "http://feed.test/", DEFAULT_TTL);

        cache.get().await.unwrap();
        cache.invalidate().await;
        let snapshot = cache.get().await.unwrap();

        assert_eq!(snapshot.vehicles.len(), 1);
        assert_eq!(cache.client.calls(), 2);
    }
}
