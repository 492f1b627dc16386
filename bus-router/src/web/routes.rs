//! HTTP route handlers.

use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::domain::{LatLon, Trip, TripId};
use crate::feed::TripSource;
use crate::geocode::{GeocodeError, Geocoder, first_match};
use crate::overlay::assemble;
use crate::planner::Resolver;

use super::dto::*;
use super::state::AppState;

/// Upper bound on stops returned by `/stops/nearest`.
const MAX_NEAREST: usize = 50;

/// Upper bound on start stops for one plan.
const MAX_START_STOPS: usize = 20;

/// Upper bound on transfers a client may ask for.
const MAX_TRANSFERS_LIMIT: usize = 5;

/// Create the application router.
pub fn create_router<S: TripSource, G: Geocoder>(state: AppState<S, G>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stops/nearest", get(nearest_stops::<S, G>))
        .route("/trips/:id", get(get_trip::<S, G>))
        .route("/itinerary/plan", post(plan_itinerary::<S, G>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Stops nearest to a point.
async fn nearest_stops<S: TripSource, G: Geocoder>(
    State(state): State<AppState<S, G>>,
    Query(req): Query<NearestStopsRequest>,
) -> Result<Json<NearestStopsResponse>, AppError> {
    let point = valid_point(LatLon::new(req.lat, req.lon), "point")?;
    let k = req.k.unwrap_or(state.config.start_stops).min(MAX_NEAREST);

    let stops = state
        .stops
        .nearest(point, k)
        .iter()
        .map(|stop| NearbyStop::new(stop, &point))
        .collect();

    Ok(Json(NearestStopsResponse { stops }))
}

/// Look up one trip.
async fn get_trip<S: TripSource, G: Geocoder>(
    State(state): State<AppState<S, G>>,
    Path(id): Path<String>,
) -> Result<Json<Trip>, AppError> {
    let trip_id = TripId::parse(&id).map_err(|e| AppError::BadRequest {
        message: format!("Invalid trip id: {e}"),
    })?;

    // Unknown prefixes would each cost a fetch and a permanent cache entry.
    if !state.cache.is_known_shard(state.cache.shard_key(&trip_id)) {
        return Err(AppError::NotFound {
            message: format!("Trip {trip_id} not found"),
        });
    }

    let trip = state
        .cache
        .get_trip(&trip_id)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("Trip {trip_id} not found"),
        })?;

    Ok(Json(Trip::clone(&trip)))
}

/// Plan an itinerary from the origin to a destination.
async fn plan_itinerary<S: TripSource, G: Geocoder>(
    State(state): State<AppState<S, G>>,
    body: Bytes,
) -> Result<Json<PlanItineraryResponse>, AppError> {
    // Parse JSON manually so we can log the body on failure
    let req: PlanItineraryRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(&body), "Invalid plan request");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;

    let origin = valid_point(req.origin, "origin")?;

    let destination = match (req.destination, req.query.as_deref()) {
        (Some(destination), _) => valid_point(destination, "destination")?,
        (None, Some(query)) => first_match(&*state.geocoder, query).await?,
        (None, None) => {
            return Err(AppError::BadRequest {
                message: "Either destination or query is required".to_string(),
            });
        }
    };

    let start_count = req
        .start_stops
        .unwrap_or(state.config.start_stops)
        .clamp(1, MAX_START_STOPS);
    let max_transfers = req
        .max_transfers
        .unwrap_or(state.config.max_transfers)
        .min(MAX_TRANSFERS_LIMIT);

    let start_stops = state.stops.nearest(origin, start_count);
    let resolver = Resolver::new(&*state.cache, &*state.stops, &*state.config);
    let outcome = resolver
        .search(&start_stops, Some(destination), max_transfers)
        .await;

    let overlay = match &outcome.itinerary {
        Some(itinerary) => Some(
            assemble(
                itinerary,
                &*state.cache,
                &*state.shapes,
                &*state.stops,
                &*state.palette,
            )
            .await,
        ),
        None => None,
    };

    info!(
        found = outcome.is_found(),
        legs = outcome.itinerary.as_ref().map_or(0, |i| i.legs().len()),
        stops_expanded = outcome.stops_expanded,
        degraded = outcome.degraded_shards.len(),
        "Planned itinerary"
    );

    Ok(Json(PlanItineraryResponse::new(destination, outcome, overlay)))
}

fn valid_point(point: LatLon, what: &str) -> Result<LatLon, AppError> {
    if point.is_valid() {
        Ok(point)
    } else {
        Err(AppError::BadRequest {
            message: format!("Invalid {what} coordinates: {}, {}", point.lat, point.lon),
        })
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<GeocodeError> for AppError {
    fn from(e: GeocodeError) -> Self {
        match e {
            GeocodeError::NotFound { .. } => AppError::NotFound {
                message: e.to_string(),
            },
            GeocodeError::EmptyQuery => AppError::BadRequest {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: format!("Geocoding failed: {e}"),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, reason = %message, "Request failed");
        } else {
            warn!(%status, reason = %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, StopIndexStrategy, TripCache};
    use crate::datasets::{ShapeCatalog, StopCatalog};
    use crate::feed::MockTripSource;
    use crate::geocode::StaticGeocoder;
    use crate::planner::ResolverConfig;
    use std::sync::Arc;

    const DOWNTOWN: LatLon = LatLon {
        lat: 21.3069,
        lon: -157.8583,
    };
    const DIAMOND_HEAD: LatLon = LatLon {
        lat: 21.2680,
        lon: -157.7600,
    };

    async fn state() -> AppState<MockTripSource, StaticGeocoder> {
        let source = MockTripSource::from_dir("data/mock_chunks").unwrap();
        let index = source.fetch_stop_index().await.unwrap();
        let cache = TripCache::new(
            source,
            CacheConfig::new(3, StopIndexStrategy::Published(Arc::new(index))),
        );
        let geocoder = StaticGeocoder::new()
            .with_place("Diamond Head", vec![DIAMOND_HEAD])
            .with_place("Atlantis", Vec::new());

        AppState::new(
            cache,
            StopCatalog::load("data/stops.json").unwrap(),
            ShapeCatalog::load("data/shapes.json").unwrap(),
            geocoder,
            ResolverConfig::default(),
        )
    }

    async fn plan(body: serde_json::Value) -> Result<PlanItineraryResponse, AppError> {
        let body = Bytes::from(body.to_string());
        plan_itinerary(State(state().await), body)
            .await
            .map(|Json(response)| response)
    }

    fn origin() -> serde_json::Value {
        serde_json::json!({"lat": DOWNTOWN.lat, "lon": DOWNTOWN.lon})
    }

    #[tokio::test]
    async fn plan_with_coordinates() {
        let response = plan(serde_json::json!({
            "origin": origin(),
            "destination": {"lat": DIAMOND_HEAD.lat, "lon": DIAMOND_HEAD.lon},
            "start_stops": 1
        }))
        .await
        .unwrap();

        assert_eq!(response.status, PlanStatus::Found);
        let itinerary = response.itinerary.unwrap();
        assert_eq!(itinerary.legs.len(), 3);
        assert_eq!(itinerary.final_stop.id.as_str(), "6");

        let overlay = response.overlay.unwrap();
        assert_eq!(overlay.segments.len(), 3);
        assert_eq!(overlay.transfer_stops.len(), 2);
        assert!(response.degraded_shards.is_empty());
    }

    #[tokio::test]
    async fn plan_with_query() {
        let response = plan(serde_json::json!({
            "origin": origin(),
            "query": "diamond head"
        }))
        .await
        .unwrap();

        assert_eq!(response.destination, DIAMOND_HEAD);
        assert_eq!(response.status, PlanStatus::Found);
    }

    #[tokio::test]
    async fn plan_without_route() {
        let response = plan(serde_json::json!({
            "origin": origin(),
            "destination": {"lat": DIAMOND_HEAD.lat, "lon": DIAMOND_HEAD.lon},
            "max_transfers": 1,
            "start_stops": 1
        }))
        .await
        .unwrap();

        assert_eq!(response.status, PlanStatus::NoRoute);
        assert!(response.itinerary.is_none());
        assert!(response.overlay.is_none());
    }

    #[tokio::test]
    async fn plan_unknown_place_is_not_found() {
        let err = plan(serde_json::json!({"origin": origin(), "query": "Atlantis"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn plan_needs_a_destination() {
        let err = plan(serde_json::json!({"origin": origin()}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));

        let err = plan(serde_json::json!({"origin": {"lat": 91.0, "lon": 0.0}, "query": "x"}))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn plan_rejects_bad_json() {
        let err = plan_itinerary(State(state().await), Bytes::from_static(b"{not json"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn nearest_stops_sorted() {
        let Json(response) = nearest_stops(
            State(state().await),
            Query(NearestStopsRequest {
                lat: DOWNTOWN.lat,
                lon: DOWNTOWN.lon,
                k: Some(3),
            }),
        )
        .await
        .unwrap();

        let ids: Vec<_> = response.stops.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert!(response.stops[0].distance_m < 1.0);
    }

    #[tokio::test]
    async fn trip_lookup() {
        let state = state().await;

        let Json(trip) = get_trip(State(state.clone()), Path("2001".to_string()))
            .await
            .unwrap();
        assert_eq!(trip.stops.len(), 3);
        assert_eq!(trip.shape_id.as_deref(), Some("S200"));

        let err = get_trip(State(state), Path("9999".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn trip_lookup_with_unknown_prefix_fetches_nothing() {
        let state = state().await;

        for n in 0..50 {
            let err = get_trip(State(state.clone()), Path(format!("{n:03x}9")))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::NotFound { .. }));
        }

        assert_eq!(state.cache.fetch_count(), 0);
        assert_eq!(state.cache.shard_count(), 0);
    }

    #[test]
    fn error_status_codes() {
        let response = AppError::NotFound {
            message: "gone".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::from(GeocodeError::EmptyQuery).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
