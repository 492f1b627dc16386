//! Lookup caches over the remote trip dataset.
//!
//! Two caches sit in front of a `TripSource`:
//!
//! - **Trip shards**, keyed by trip-id prefix. Each entry is a whole chunk,
//!   fetched once. A failed fetch caches an empty shard that is never
//!   retried, and the prefix is recorded as degraded.
//! - **Stop → trips index**, keyed by stop id. Built on first request by
//!   scanning resident shards plus a catalogue of prefixes, or read from a
//!   published index.
//!
//! Both are append-only for the lifetime of the cache: no TTL, no capacity
//! bound. `moka`'s `get_with` coalesces concurrent first requests for the
//! same key into one in-flight initialisation.

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::join_all;
use moka::future::Cache as MokaCache;
use tracing::{debug, warn};

use crate::domain::{StopId, Trip, TripId};
use crate::feed::{StopTripIndex, TripChunk, TripSource};

/// Cached shard: every trip in one chunk. Empty when the fetch failed.
type ShardEntry = Arc<TripChunk>;

/// Cached stop index entry: trips visiting a stop, ascending by id.
type StopEntry = Arc<Vec<TripId>>;

/// Default trip-id prefix length used to shard the dataset.
pub const DEFAULT_SHARD_PREFIX_LEN: usize = 3;

/// How the stop → trips index is built.
#[derive(Debug, Clone)]
pub enum StopIndexStrategy {
    /// Scan resident shards, then force-fetch each listed prefix and scan it.
    ///
    /// Only as complete as the prefix list.
    Catalogue(Vec<String>),

    /// Look stops up in an index precomputed when the dataset was built.
    Published(Arc<StopTripIndex>),
}

/// Every zero-padded numeric prefix of length `len` ("000" to "999" for 3).
///
/// Covers the whole dataset when trip ids are numeric; prefixes with no
/// chunk behind them cost one not-found fetch each, once.
pub fn numeric_catalogue(len: usize) -> Vec<String> {
    let Some(count) = 10usize.checked_pow(len as u32) else {
        return Vec::new();
    };
    (0..count).map(|n| format!("{n:0len$}")).collect()
}

/// Configuration for the trip cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Number of leading trip-id characters that select a shard.
    pub shard_prefix_len: usize,

    /// How stop lookups find their trips.
    pub stop_index: StopIndexStrategy,

    /// Maximum catalogue shards fetched concurrently while indexing a stop.
    pub catalogue_concurrency: usize,
}

impl CacheConfig {
    pub fn new(shard_prefix_len: usize, stop_index: StopIndexStrategy) -> Self {
        Self {
            shard_prefix_len,
            stop_index,
            ..Self::default()
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            shard_prefix_len: DEFAULT_SHARD_PREFIX_LEN,
            stop_index: StopIndexStrategy::Catalogue(Vec::new()),
            catalogue_concurrency: 8,
        }
    }
}

/// Trip and stop-index caches in front of a trip source.
///
/// Constructed empty; share it behind an `Arc` for the session.
pub struct TripCache<S> {
    source: S,
    shards: MokaCache<String, ShardEntry>,
    stop_trips: MokaCache<StopId, StopEntry>,
    degraded: Mutex<BTreeSet<String>>,
    fetches: AtomicUsize,
    known_shards: HashSet<String>,
    config: CacheConfig,
}

impl<S: TripSource> TripCache<S> {
    /// Create an empty cache over `source`.
    pub fn new(source: S, config: CacheConfig) -> Self {
        Self {
            source,
            shards: MokaCache::builder().build(),
            stop_trips: MokaCache::builder().build(),
            degraded: Mutex::new(BTreeSet::new()),
            fetches: AtomicUsize::new(0),
            known_shards: known_shards(&config),
            config,
        }
    }

    /// The underlying trip source.
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// The shard key (prefix) owning a trip id.
    pub fn shard_key<'a>(&self, trip: &'a TripId) -> &'a str {
        trip.shard_prefix(self.config.shard_prefix_len)
    }

    /// Whether `prefix` names a shard the dataset is known to have: listed
    /// in the catalogue, or owning some trip in the published index.
    ///
    /// Lets callers refuse ids from untrusted input before they reach
    /// [`TripCache::get_trip`], which caches every prefix it is asked for.
    pub fn is_known_shard(&self, prefix: &str) -> bool {
        self.known_shards.contains(prefix)
    }

    /// Look up a trip, fetching its shard on first use.
    ///
    /// Returns `None` if the trip is not in its shard, including when the
    /// shard failed to load. That answer is permanent for this cache.
    pub async fn get_trip(&self, id: &TripId) -> Option<Arc<Trip>> {
        let shard = self.shard(self.shard_key(id)).await;
        shard.get(id).cloned()
    }

    /// Trips known to visit `stop`, ascending by trip id.
    ///
    /// Computed once per stop and cached permanently, including when empty.
    pub async fn get_stop_trips(&self, stop: &StopId) -> Arc<Vec<TripId>> {
        self.stop_trips
            .get_with(stop.clone(), self.build_stop_trips(stop))
            .await
    }

    /// Prefixes whose fetch failed and whose trips are therefore missing.
    pub fn degraded_shards(&self) -> Vec<String> {
        self.degraded
            .lock()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of remote chunk fetches issued since construction.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of shards currently resident.
    pub fn shard_count(&self) -> usize {
        self.shards.iter().count()
    }

    /// Drop every cached shard and stop entry, and forget degraded shards.
    pub fn clear(&self) {
        self.shards.invalidate_all();
        self.stop_trips.invalidate_all();
        if let Ok(mut set) = self.degraded.lock() {
            set.clear();
        }
    }

    async fn shard(&self, prefix: &str) -> ShardEntry {
        self.shards
            .get_with(prefix.to_string(), self.load_shard(prefix))
            .await
    }

    async fn load_shard(&self, prefix: &str) -> ShardEntry {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        match self.source.fetch_chunk(prefix).await {
            Ok(chunk) => {
                debug!(prefix, trips = chunk.len(), "Loaded trip shard");
                Arc::new(chunk)
            }
            Err(e) if e.is_not_found() => {
                debug!(prefix, "No chunk for prefix, caching empty shard");
                Arc::new(TripChunk::new())
            }
            Err(e) => {
                warn!(prefix, error = %e, "Failed to fetch trip shard, caching empty shard");
                if let Ok(mut set) = self.degraded.lock() {
                    set.insert(prefix.to_string());
                }
                Arc::new(TripChunk::new())
            }
        }
    }

    async fn build_stop_trips(&self, stop: &StopId) -> StopEntry {
        let trips = match &self.config.stop_index {
            StopIndexStrategy::Published(index) => index.get(stop).cloned().unwrap_or_default(),
            StopIndexStrategy::Catalogue(prefixes) => self.scan_for_stop(stop, prefixes).await,
        };

        debug!(stop = %stop, trips = trips.len(), "Indexed stop");
        Arc::new(trips)
    }

    async fn scan_for_stop(&self, stop: &StopId, prefixes: &[String]) -> Vec<TripId> {
        let mut found = BTreeSet::new();

        for (_, shard) in self.shards.iter() {
            collect_visiting(&shard, stop, &mut found);
        }

        let batch_size = self.config.catalogue_concurrency.max(1);
        for batch in prefixes.chunks(batch_size) {
            let shards = join_all(batch.iter().map(|prefix| self.shard(prefix))).await;
            for shard in &shards {
                collect_visiting(shard, stop, &mut found);
            }
        }

        found.into_iter().collect()
    }
}

fn known_shards(config: &CacheConfig) -> HashSet<String> {
    match &config.stop_index {
        StopIndexStrategy::Catalogue(prefixes) => prefixes.iter().cloned().collect(),
        StopIndexStrategy::Published(index) => index
            .values()
            .flatten()
            .map(|trip| trip.shard_prefix(config.shard_prefix_len).to_string())
            .collect(),
    }
}

fn collect_visiting(shard: &TripChunk, stop: &StopId, found: &mut BTreeSet<TripId>) {
    found.extend(
        shard
            .values()
            .filter(|trip| trip.visits(stop))
            .map(|trip| trip.id.clone()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopTime;
    use crate::feed::MockTripSource;
    use std::collections::HashMap;
    use std::time::Duration;

    fn trip(id: &str, stops: &[&str]) -> Arc<Trip> {
        Arc::new(Trip {
            id: TripId::parse(id).unwrap(),
            shape_id: None,
            route_id: None,
            headsign: None,
            stops: stops
                .iter()
                .map(|s| StopTime::new(StopId::parse(s).unwrap(), None, None))
                .collect(),
        })
    }

    fn chunk(trips: &[Arc<Trip>]) -> TripChunk {
        trips.iter().map(|t| (t.id.clone(), t.clone())).collect()
    }

    fn tid(s: &str) -> TripId {
        TripId::parse(s).unwrap()
    }

    fn sid(s: &str) -> StopId {
        StopId::parse(s).unwrap()
    }

    fn catalogue(prefixes: &[&str]) -> CacheConfig {
        CacheConfig::new(
            2,
            StopIndexStrategy::Catalogue(prefixes.iter().map(|p| p.to_string()).collect()),
        )
    }

    fn source() -> MockTripSource {
        MockTripSource::new()
            .with_chunk("T0", chunk(&[trip("T01", &["A", "B"]), trip("T02", &["B", "C"])]))
            .with_chunk("T1", chunk(&[trip("T11", &["C", "A"])]))
            .with_chunk("U0", chunk(&[trip("U01", &["B", "D"])]))
    }

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.shard_prefix_len, 3);
        assert_eq!(config.catalogue_concurrency, 8);
        assert!(matches!(config.stop_index, StopIndexStrategy::Catalogue(ref p) if p.is_empty()));
    }

    #[test]
    fn numeric_catalogue_pads() {
        let prefixes = numeric_catalogue(2);
        assert_eq!(prefixes.len(), 100);
        assert_eq!(prefixes[0], "00");
        assert_eq!(prefixes[7], "07");
        assert_eq!(prefixes[99], "99");
        assert_eq!(numeric_catalogue(3)[42], "042");
    }

    #[tokio::test]
    async fn same_shard_fetched_once() {
        let cache = TripCache::new(source(), catalogue(&[]));

        let a = cache.get_trip(&tid("T01")).await.unwrap();
        let b = cache.get_trip(&tid("T02")).await.unwrap();

        assert_eq!(a.id, tid("T01"));
        assert_eq!(b.id, tid("T02"));
        assert_eq!(cache.source().fetch_count_for("T0"), 1);
        assert_eq!(cache.fetch_count(), 1);
    }

    #[tokio::test]
    async fn unknown_trip_in_loaded_shard_is_absent() {
        let cache = TripCache::new(source(), catalogue(&[]));
        assert!(cache.get_trip(&tid("T09")).await.is_none());
        assert!(cache.get_trip(&tid("T01")).await.is_some());
        assert_eq!(cache.fetch_count(), 1);
    }

    #[tokio::test]
    async fn failed_shard_is_sticky() {
        let cache = TripCache::new(source().with_failure("T0"), catalogue(&[]));

        assert!(cache.get_trip(&tid("T01")).await.is_none());
        assert!(cache.get_trip(&tid("T01")).await.is_none());
        assert!(cache.get_trip(&tid("T02")).await.is_none());

        assert_eq!(cache.source().fetch_count_for("T0"), 1);
        assert_eq!(cache.degraded_shards(), vec!["T0".to_string()]);
    }

    #[tokio::test]
    async fn missing_shard_is_not_degraded() {
        let cache = TripCache::new(source(), catalogue(&[]));
        assert!(cache.get_trip(&tid("Z99")).await.is_none());
        assert!(cache.get_trip(&tid("Z98")).await.is_none());
        assert_eq!(cache.source().fetch_count_for("Z9"), 1);
        assert!(cache.degraded_shards().is_empty());
    }

    #[tokio::test]
    async fn concurrent_first_requests_share_one_fetch() {
        let source = source().with_latency(Duration::from_millis(20));
        let cache = TripCache::new(source, catalogue(&[]));

        let (t1, t2) = (tid("T01"), tid("T02"));
        let (a, b, c) = tokio::join!(cache.get_trip(&t1), cache.get_trip(&t2), cache.get_trip(&t1));

        assert!(a.is_some() && b.is_some() && c.is_some());
        assert_eq!(cache.source().fetch_count_for("T0"), 1);
    }

    #[tokio::test]
    async fn stop_trips_scan_catalogue() {
        let cache = TripCache::new(source(), catalogue(&["T0", "T1"]));

        let trips = cache.get_stop_trips(&sid("A")).await;
        assert_eq!(*trips, vec![tid("T01"), tid("T11")]);

        // U0 is not in the catalogue and not resident.
        let trips = cache.get_stop_trips(&sid("D")).await;
        assert!(trips.is_empty());
        assert_eq!(cache.source().fetch_count_for("U0"), 0);
    }

    #[tokio::test]
    async fn stop_trips_include_resident_shards() {
        let cache = TripCache::new(source(), catalogue(&["T0"]));

        cache.get_trip(&tid("U01")).await;
        let trips = cache.get_stop_trips(&sid("B")).await;
        assert_eq!(*trips, vec![tid("T01"), tid("T02"), tid("U01")]);
    }

    #[tokio::test]
    async fn stop_trips_memoized_even_when_empty() {
        let cache = TripCache::new(source(), catalogue(&["T0", "T1"]));

        assert!(cache.get_stop_trips(&sid("nowhere")).await.is_empty());
        let after_first = cache.fetch_count();
        assert!(cache.get_stop_trips(&sid("nowhere")).await.is_empty());
        assert_eq!(cache.fetch_count(), after_first);
        assert_eq!(after_first, 2);
    }

    #[tokio::test]
    async fn stop_trips_reuse_resident_catalogue_shards() {
        let cache = TripCache::new(source(), catalogue(&["T0", "T1"]));

        cache.get_stop_trips(&sid("A")).await;
        cache.get_stop_trips(&sid("B")).await;
        cache.get_trip(&tid("T11")).await;

        assert_eq!(cache.source().fetch_count_for("T0"), 1);
        assert_eq!(cache.source().fetch_count_for("T1"), 1);
    }

    #[tokio::test]
    async fn stop_trips_tolerate_failed_catalogue_shard() {
        let cache = TripCache::new(source().with_failure("T1"), catalogue(&["T0", "T1"]));

        let trips = cache.get_stop_trips(&sid("A")).await;
        assert_eq!(*trips, vec![tid("T01")]);
        assert_eq!(cache.degraded_shards(), vec!["T1".to_string()]);
    }

    #[tokio::test]
    async fn published_index_needs_no_fetch() {
        let mut index = HashMap::new();
        index.insert(sid("A"), vec![tid("T01"), tid("T11")]);
        let config = CacheConfig::new(2, StopIndexStrategy::Published(Arc::new(index)));
        let cache = TripCache::new(source(), config);

        assert_eq!(*cache.get_stop_trips(&sid("A")).await, vec![tid("T01"), tid("T11")]);
        assert!(cache.get_stop_trips(&sid("B")).await.is_empty());
        assert_eq!(cache.fetch_count(), 0);
    }

    #[test]
    fn known_shards_follow_index_strategy() {
        let cache = TripCache::new(source(), catalogue(&["T0", "T1"]));
        assert!(cache.is_known_shard("T1"));
        assert!(!cache.is_known_shard("U0"));

        let mut index = HashMap::new();
        index.insert(sid("B"), vec![tid("T02"), tid("U01")]);
        let config = CacheConfig::new(2, StopIndexStrategy::Published(Arc::new(index)));
        let cache = TripCache::new(source(), config);
        assert!(cache.is_known_shard("T0"));
        assert!(cache.is_known_shard("U0"));
        assert!(!cache.is_known_shard("T1"));
        assert_eq!(cache.fetch_count(), 0);
    }

    #[tokio::test]
    async fn clear_empties_caches() {
        let cache = TripCache::new(source().with_failure("T1"), catalogue(&[]));

        cache.get_trip(&tid("T01")).await;
        cache.get_trip(&tid("T11")).await;
        assert_eq!(cache.shard_count(), 2);
        assert_eq!(cache.degraded_shards().len(), 1);

        cache.clear();
        assert!(cache.degraded_shards().is_empty());

        cache.get_trip(&tid("T01")).await;
        assert_eq!(cache.source().fetch_count_for("T0"), 2);
    }
}
