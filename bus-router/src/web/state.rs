//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::TripCache;
use crate::datasets::{ShapeCatalog, StopCatalog};
use crate::overlay::Palette;
use crate::planner::ResolverConfig;

/// Shared application state.
///
/// Contains all the services needed to handle requests. Generic over the
/// trip source and geocoder so tests can run the handlers against mocks.
pub struct AppState<S, G> {
    /// Trip and stop-index caches
    pub cache: Arc<TripCache<S>>,

    /// Static stop dataset
    pub stops: Arc<StopCatalog>,

    /// Static shape dataset
    pub shapes: Arc<ShapeCatalog>,

    /// Free-text destination lookup
    pub geocoder: Arc<G>,

    /// Resolver configuration
    pub config: Arc<ResolverConfig>,

    /// Overlay leg colors
    pub palette: Arc<Palette>,
}

impl<S, G> AppState<S, G> {
    /// Create a new app state.
    pub fn new(
        cache: TripCache<S>,
        stops: StopCatalog,
        shapes: ShapeCatalog,
        geocoder: G,
        config: ResolverConfig,
    ) -> Self {
        Self {
            cache: Arc::new(cache),
            stops: Arc::new(stops),
            shapes: Arc::new(shapes),
            geocoder: Arc::new(geocoder),
            config: Arc::new(config),
            palette: Arc::new(Palette::default()),
        }
    }
}

// Manual impl: `derive` would require `S: Clone` and `G: Clone`.
impl<S, G> Clone for AppState<S, G> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            stops: self.stops.clone(),
            shapes: self.shapes.clone(),
            geocoder: self.geocoder.clone(),
            config: self.config.clone(),
            palette: self.palette.clone(),
        }
    }
}
