use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::handlers;

/// Shared by every handler. The store handle is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseManager,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: DatabaseManager, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let enable_cors = state.config.security.enable_cors;
    let enable_request_logging = state.config.api.enable_request_logging;

    let mut router = Router::new()
        // Public
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/test", get(handlers::test_database))
        .merge(chapter_routes())
        .merge(seed_routes())
        .with_state(state);

    // Global middleware
    if enable_cors {
        router = router.layer(CorsLayer::permissive());
    }
    if enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

fn chapter_routes() -> Router<AppState> {
    use handlers::{chapters, quizzes};

    Router::new()
        .route("/api/chapters", get(chapters::list).post(chapters::create))
        .route("/api/chapters/:chapter_id", get(chapters::show))
        .route(
            "/api/chapters/:chapter_id/quizzes",
            get(quizzes::list).post(quizzes::create),
        )
}

fn seed_routes() -> Router<AppState> {
    Router::new().route("/api/seed/sample", post(handlers::seed::sample))
}
