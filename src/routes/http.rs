// GET handlers: version, queue counters

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use super::AppState;
use crate::snapshot::{SnapshotBuilder, TracingDiagnostics};
use crate::version::{NAME, VERSION};

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// Transport-level option bag for /counters/queues; the core builder only
/// ever sees the parsed interface list.
#[derive(Debug, Deserialize)]
pub(super) struct QueueCountersParams {
    interfaces: Option<String>,
}

impl QueueCountersParams {
    /// Comma-separated interface names; absent or blank means no filter
    /// (all interfaces).
    fn interface_filter(&self) -> Vec<String> {
        self.interfaces
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// GET /counters/queues — fresh queue counter snapshot as JSON.
pub(super) async fn queue_counters_handler(
    State(state): State<AppState>,
    Query(params): Query<QueueCountersParams>,
) -> impl IntoResponse {
    let interfaces = params.interface_filter();
    let diagnostics = TracingDiagnostics;
    let builder = SnapshotBuilder::new(
        state.counters_db.as_ref(),
        state.alias_map.as_ref(),
        &diagnostics,
    );
    match builder.build(&interfaces).await {
        Ok(snapshot) => axum::Json(snapshot).into_response(),
        Err(e) => {
            tracing::error!(error = %e, ?interfaces, "queue counters snapshot failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "counters query failed").into_response()
        }
    }
}
