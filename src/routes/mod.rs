// HTTP + WebSocket routes

mod http;
mod ws;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::counters_db::CountersDb;
use crate::portmap::PortAliasMap;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) counters_db: Arc<CountersDb>,
    pub(crate) alias_map: Arc<PortAliasMap>,
    pub(crate) config: AppConfig,
}

pub fn app(
    counters_db: Arc<CountersDb>,
    alias_map: Arc<PortAliasMap>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        counters_db,
        alias_map,
        config,
    };
    Router::new()
        .route("/", get(|| async { "queuetel: switch queue counter telemetry" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/counters/queues", get(http::queue_counters_handler)) // GET /counters/queues
        .route("/ws/queues", get(ws::ws_queues)) // WS /ws/queues
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
