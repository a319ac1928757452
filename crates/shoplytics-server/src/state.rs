use std::sync::Arc;

use shoplytics_core::aggregation::AggregationService;
use shoplytics_core::config::Config;
use shoplytics_core::query::QueryService;
use shoplytics_core::tracking::TrackingService;
use shoplytics_duckdb::DuckDbBackend;

/// State handed to every Axum handler through [`axum::extract::State`].
///
/// All fields are safe to clone cheaply — the backend holds its connection in
/// an internal `Arc<Mutex<_>>` and the services hold `Arc`s of the backend.
pub struct AppState {
    /// The DuckDB backend, exposed for the health check and for integration
    /// tests that verify stored rows directly.
    pub db: Arc<DuckDbBackend>,

    /// Configuration read once from the environment at startup.
    pub config: Arc<Config>,

    pub tracking: TrackingService,
    pub aggregation: AggregationService,
    pub query: QueryService,
}

impl AppState {
    /// Wrap a backend and config into the shared state, wiring up services.
    ///
    /// The backend serves as both the analytics store and the catalog store;
    /// the services only see it through those traits.
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        let db = Arc::new(db);
        Self {
            tracking: TrackingService::new(db.clone(), db.clone()),
            aggregation: AggregationService::new(db.clone(), db.clone()),
            query: QueryService::new(db.clone(), db.clone()),
            db,
            config: Arc::new(config),
        }
    }
}
