// WS handler: periodic full queue counter snapshots

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use bytes::Bytes;
use std::sync::Arc;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::counters_db::CountersDb;
use crate::portmap::PortAliasMap;
use crate::snapshot::{SnapshotBuilder, TracingDiagnostics};

/// Ping interval for WebSocket connection health.
const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
/// Max time to wait for a send before treating client as too slow / dead.
const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub(super) async fn ws_queues(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let counters_db = state.counters_db.clone();
    let alias_map = state.alias_map.clone();
    let interval_ms = state.config.publishing.queue_counters_frequency_ms;
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_queue_counters(socket, counters_db, alias_map, interval_ms).await {
            tracing::info!("Queue counters stream error: {}", e);
        }
    })
}

async fn stream_queue_counters(
    mut socket: WebSocket,
    counters_db: Arc<CountersDb>,
    alias_map: Arc<PortAliasMap>,
    interval_ms: u64,
) -> anyhow::Result<()> {
    tracing::info!("Client connected to queue counters stream");
    let diagnostics = TracingDiagnostics;
    let mut tick = tokio::time::interval(Duration::from_millis(interval_ms));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = tick.tick() => {
                let builder = SnapshotBuilder::new(
                    counters_db.as_ref(),
                    alias_map.as_ref(),
                    &diagnostics,
                );
                let snapshot = builder.build(&[]).await?;
                let json = serde_json::to_string(&snapshot)?;
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if r.is_err() || r.unwrap_or(Ok(())).is_err() {
                    break;
                }
            }
        }
    }
    Ok(())
}
