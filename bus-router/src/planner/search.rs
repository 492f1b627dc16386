//! Bounded-transfer BFS itinerary search.
//!
//! Nodes are stops; edges are "stay on the same trip to a later stop in its
//! sequence". The search starts at the given stops, expands them in FIFO
//! order, and stops at the first stop found within the proximity threshold
//! of the destination. That is the first hit in BFS order, not a globally
//! shortest or fastest itinerary.
//!
//! Each stop and each trip is expanded at most once per search, so the
//! search terminates on cyclic networks. Trips of a stop are fetched in
//! concurrent batches but processed one at a time in ascending trip-id
//! order, which keeps the result deterministic.

use std::collections::{HashSet, VecDeque};

use futures::future::join_all;
use tracing::{debug, trace};

use crate::cache::TripCache;
use crate::datasets::StopCatalog;
use crate::domain::{Itinerary, LatLon, Leg, Stop, StopId, Trip, TripId};
use crate::feed::TripSource;

use super::config::ResolverConfig;

/// Result of an itinerary search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The first itinerary found, if any.
    pub itinerary: Option<Itinerary>,

    /// Number of stops expanded.
    pub stops_expanded: usize,

    /// Number of trips expanded.
    pub trips_expanded: usize,

    /// Shards that failed to load. When non-empty, "no itinerary" may mean
    /// "data incomplete" rather than "no route exists".
    pub degraded_shards: Vec<String>,
}

impl SearchOutcome {
    /// An outcome for a search that never started.
    pub fn empty() -> Self {
        Self {
            itinerary: None,
            stops_expanded: 0,
            trips_expanded: 0,
            degraded_shards: Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.itinerary.is_some()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded_shards.is_empty()
    }
}

/// BFS queue entry.
#[derive(Debug, Clone)]
struct SearchState {
    /// Stop reached.
    stop: StopId,

    /// Legs ridden to get here.
    path: Vec<Leg>,
}

/// Itinerary resolver over a trip cache and the stop catalog.
pub struct Resolver<'a, S> {
    cache: &'a TripCache<S>,
    stops: &'a StopCatalog,
    config: &'a ResolverConfig,
}

impl<'a, S: TripSource> Resolver<'a, S> {
    /// Create a new resolver.
    pub fn new(cache: &'a TripCache<S>, stops: &'a StopCatalog, config: &'a ResolverConfig) -> Self {
        Self {
            cache,
            stops,
            config,
        }
    }

    /// Find an itinerary from one of `start_stops` to a stop near `destination`.
    ///
    /// Returns `None` if there are no start stops, no destination, or no
    /// route within `max_transfers` transfers.
    pub async fn resolve(
        &self,
        start_stops: &[Stop],
        destination: Option<LatLon>,
        max_transfers: usize,
    ) -> Option<Itinerary> {
        self.search(start_stops, destination, max_transfers)
            .await
            .itinerary
    }

    /// Like [`Resolver::resolve`], but also reports search statistics and
    /// degraded shards.
    pub async fn search(
        &self,
        start_stops: &[Stop],
        destination: Option<LatLon>,
        max_transfers: usize,
    ) -> SearchOutcome {
        let Some(destination) = destination else {
            return SearchOutcome::empty();
        };
        if start_stops.is_empty() {
            return SearchOutcome::empty();
        }

        let mut queue: VecDeque<SearchState> = start_stops
            .iter()
            .map(|stop| SearchState {
                stop: stop.id.clone(),
                path: Vec::new(),
            })
            .collect();

        let mut visited_stops: HashSet<StopId> = HashSet::new();
        let mut visited_trips: HashSet<TripId> = HashSet::new();
        let mut stops_expanded = 0;
        let mut trips_expanded = 0;
        let batch_size = self.config.prefetch_concurrency.max(1);

        while let Some(state) = queue.pop_front() {
            if !visited_stops.insert(state.stop.clone()) {
                continue;
            }
            stops_expanded += 1;
            trace!(stop = %state.stop, depth = state.path.len(), "Expanding stop");

            let trip_ids = self.cache.get_stop_trips(&state.stop).await;

            // Dead ends stay visited too.
            let fresh: Vec<&TripId> = trip_ids
                .iter()
                .filter(|id| visited_trips.insert((*id).clone()))
                .collect();

            for batch in fresh.chunks(batch_size) {
                let trips = join_all(batch.iter().map(|id| self.cache.get_trip(id))).await;

                for (id, trip) in batch.iter().zip(trips) {
                    trips_expanded += 1;

                    let Some(trip) = trip else {
                        debug!(trip = %id, "Trip not found in its shard, skipping");
                        continue;
                    };

                    if let Some(itinerary) =
                        self.ride(&trip, &state, destination, max_transfers, &mut queue, &visited_stops)
                    {
                        debug!(
                            legs = itinerary.legs().len(),
                            final_stop = %itinerary.final_stop().id,
                            stops_expanded,
                            trips_expanded,
                            "Itinerary found"
                        );
                        return SearchOutcome {
                            itinerary: Some(itinerary),
                            stops_expanded,
                            trips_expanded,
                            degraded_shards: self.cache.degraded_shards(),
                        };
                    }
                }
            }
        }

        debug!(stops_expanded, trips_expanded, "No itinerary found");
        SearchOutcome {
            itinerary: None,
            stops_expanded,
            trips_expanded,
            degraded_shards: self.cache.degraded_shards(),
        }
    }

    /// Ride `trip` from the state's stop, checking every later stop.
    ///
    /// Returns the itinerary if a later stop is near the destination;
    /// otherwise enqueues each later stop for a further transfer while the
    /// path is short enough.
    fn ride(
        &self,
        trip: &Trip,
        state: &SearchState,
        destination: LatLon,
        max_transfers: usize,
        queue: &mut VecDeque<SearchState>,
        visited_stops: &HashSet<StopId>,
    ) -> Option<Itinerary> {
        let board_idx = trip.position_of(&state.stop)?;

        for (idx, stop_time) in trip.stops_after(board_idx) {
            let leg = match Leg::new(trip, board_idx, idx) {
                Ok(leg) => leg,
                Err(e) => {
                    debug!(trip = %trip.id, error = %e, "Skipping invalid leg");
                    continue;
                }
            };

            // A stop without coordinates can still be a transfer point.
            let near = match self.stops.get(&stop_time.stop_id) {
                Some(stop) if stop.distance_to(&destination) < self.config.proximity_threshold_m => {
                    Some(stop)
                }
                Some(_) => None,
                None => {
                    trace!(trip = %trip.id, stop = %stop_time.stop_id, "Stop not in catalog");
                    None
                }
            };

            if let Some(stop) = near {
                let mut legs = state.path.clone();
                legs.push(leg);
                match Itinerary::new(legs, stop.clone()) {
                    Ok(itinerary) => return Some(itinerary),
                    Err(e) => {
                        debug!(trip = %trip.id, error = %e, "Discarding inconsistent itinerary");
                        continue;
                    }
                }
            }

            if state.path.len() < max_transfers && !visited_stops.contains(&stop_time.stop_id) {
                let mut path = state.path.clone();
                path.push(leg);
                queue.push_back(SearchState {
                    stop: stop_time.stop_id.clone(),
                    path,
                });
            }
        }

        None
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
