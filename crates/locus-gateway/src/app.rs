use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use locus_core::config::LocusConfig;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::ws::{broadcast::EventBroadcaster, registry::SubscriberRegistry};

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: LocusConfig,
    /// Live WS subscribers. Mutated only by the connection lifecycle.
    pub registry: Arc<SubscriberRegistry>,
    pub broadcaster: EventBroadcaster,
}

impl AppState {
    pub fn new(config: LocusConfig) -> Self {
        let registry = Arc::new(SubscriberRegistry::new());
        Self {
            config,
            broadcaster: EventBroadcaster::new(Arc::clone(&registry)),
            registry,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.relay.max_payload_bytes;
    let socketio = crate::ws::socketio::layer(&state);

    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/ws", get(crate::ws::connection::ws_handler))
        .route("/api/input", post(crate::http::ingress::input_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
        .layer(socketio)
        .layer(cors_layer())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Any origin, method and header.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
