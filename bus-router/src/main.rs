use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bus_router::cache::{CacheConfig, StopIndexStrategy, TripCache};
use bus_router::config::AppConfig;
use bus_router::datasets::{ShapeCatalog, StopCatalog};
use bus_router::feed::{FeedClient, FeedConfig, MockTripSource, TripSource};
use bus_router::geocode::{GeocoderConfig, NominatimClient};
use bus_router::planner::ResolverConfig;
use bus_router::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Static datasets (fail fast if unavailable)
    let stops = StopCatalog::load(&config.stops_path).expect("Failed to load stop dataset");
    let shapes = ShapeCatalog::load(&config.shapes_path).expect("Failed to load shape dataset");
    tracing::info!(stops = stops.len(), shapes = shapes.len(), "Loaded static datasets");

    match &config.mock_data_dir {
        Some(dir) => {
            let source = MockTripSource::from_dir(dir).expect("Failed to load mock trip data");
            tracing::info!(dir = %dir.display(), shards = source.prefixes().len(), "Using mock trip data");
            serve(source, &config, stops, shapes).await;
        }
        None => {
            let source = FeedClient::new(FeedConfig::new(&config.feed_base_url))
                .expect("Failed to create feed client");
            tracing::info!(base_url = %config.feed_base_url, "Using remote trip data");
            serve(source, &config, stops, shapes).await;
        }
    }
}

async fn serve<S: TripSource>(
    source: S,
    config: &AppConfig,
    stops: StopCatalog,
    shapes: ShapeCatalog,
) {
    let stop_index = match config.shard_catalogue.prefixes(config.shard_prefix_len) {
        Some(prefixes) => {
            tracing::info!(prefixes = prefixes.len(), "Indexing stops from shard catalogue");
            StopIndexStrategy::Catalogue(prefixes)
        }
        None => {
            let index = source
                .fetch_stop_index()
                .await
                .expect("Failed to fetch published stop index");
            tracing::info!(stops = index.len(), "Loaded published stop index");
            StopIndexStrategy::Published(Arc::new(index))
        }
    };

    let cache = TripCache::new(
        source,
        CacheConfig::new(config.shard_prefix_len, stop_index),
    );

    let geocoder = NominatimClient::new(GeocoderConfig::new(&config.geocoder_url))
        .expect("Failed to create geocoder client");

    let resolver_config = ResolverConfig::default().with_max_transfers(config.max_transfers);

    let state = AppState::new(cache, stops, shapes, geocoder, resolver_config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!(addr = %config.listen_addr, "Bus itinerary resolver listening");
    tracing::info!("  GET  /health            - Health check");
    tracing::info!("  GET  /stops/nearest     - Nearest stops to a point");
    tracing::info!("  GET  /trips/:id         - Trip lookup");
    tracing::info!("  POST /itinerary/plan    - Plan an itinerary");

    axum::serve(listener, app).await.expect("Server error");
}
