//! Search configuration for the itinerary resolver.

/// Configuration parameters for itinerary search.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Maximum number of transfers allowed.
    /// An itinerary has at most `max_transfers + 1` legs.
    pub max_transfers: usize,

    /// A stop closer than this to the destination ends the search (metres).
    pub proximity_threshold_m: f64,

    /// Number of nearest stops to the origin used as start stops.
    pub start_stops: usize,

    /// Maximum number of trips fetched concurrently while expanding a stop.
    pub prefetch_concurrency: usize,
}

impl ResolverConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        max_transfers: usize,
        proximity_threshold_m: f64,
        start_stops: usize,
        prefetch_concurrency: usize,
    ) -> Self {
        Self {
            max_transfers,
            proximity_threshold_m,
            start_stops,
            prefetch_concurrency,
        }
    }

    /// Same configuration with a different transfer bound.
    pub fn with_max_transfers(mut self, max_transfers: usize) -> Self {
        self.max_transfers = max_transfers;
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_transfers: 2,
            proximity_threshold_m: 500.0,
            start_stops: 5,
            prefetch_concurrency: 8,
        }
    }
}
