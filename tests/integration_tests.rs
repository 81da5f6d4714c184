// Integration tests: HTTP and WebSocket endpoints over a seeded counters DB

mod common;

use axum_test::TestServer;
use common::seeded_counters_db;
use queuetel::config::AppConfig;
use queuetel::models::{MISSING_COUNTER_VALUE, QueueCountersSnapshot};
use queuetel::portmap::PortAliasMap;
use queuetel::routes;
use std::sync::Arc;
use tempfile::TempDir;

const TEST_CONFIG: &str = r#"
[server]
port = 8081
host = "0.0.0.0"

[database]
path = "data/counters.db"
max_pool_size = 2

[publishing]
queue_counters_frequency_ms = 100
"#;

async fn test_app(dir: &TempDir) -> axum::Router {
    let config = AppConfig::load_from_str(TEST_CONFIG).unwrap();
    let db = Arc::new(seeded_counters_db(dir).await);
    let aliases = Arc::new(PortAliasMap::new(db.load_port_alias_map().await.unwrap()));
    routes::app(db, aliases, config)
}

#[tokio::test]
async fn test_root_endpoint() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::new(test_app(&dir).await).unwrap();
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("queuetel: switch queue counter telemetry");
}

#[tokio::test]
async fn test_version_endpoint() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::new(test_app(&dir).await).unwrap();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("queuetel"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_queue_counters_all_interfaces() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::new(test_app(&dir).await).unwrap();
    let response = server.get("/counters/queues").await;
    response.assert_status_ok();
    let snapshot: QueueCountersSnapshot = response.json();

    assert!(snapshot.contains_key("Ethernet0:0"));
    assert!(snapshot.contains_key("Ethernet0:1"));
    assert!(snapshot.contains_key("Ethernet4:0"));
    assert!(!snapshot.contains_key("Ethernet0:0:periodic"));

    let record = &snapshot["Ethernet0:0"];
    assert_eq!(record.packets, "100");
    assert_eq!(record.bytes, "6400");
    assert_eq!(record.dropped_packets, "2");
    assert_eq!(record.trimmed_packets, MISSING_COUNTER_VALUE);
}

#[tokio::test]
async fn test_queue_counters_interface_filter() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::new(test_app(&dir).await).unwrap();
    let response = server
        .get("/counters/queues")
        .add_query_param("interfaces", "Ethernet0")
        .await;
    response.assert_status_ok();
    let snapshot: QueueCountersSnapshot = response.json();

    assert!(snapshot.contains_key("Ethernet0:0"));
    assert!(snapshot.contains_key("Ethernet0:1"));
    assert!(!snapshot.contains_key("Ethernet4:0"));
    assert!(!snapshot.contains_key("Ethernet40:0"));
}

#[tokio::test]
async fn test_queue_counters_multi_interface_filter() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::new(test_app(&dir).await).unwrap();
    let response = server
        .get("/counters/queues")
        .add_query_param("interfaces", "Ethernet0,Ethernet4")
        .await;
    response.assert_status_ok();
    let snapshot: QueueCountersSnapshot = response.json();

    assert!(snapshot.contains_key("Ethernet0:0"));
    assert!(snapshot.contains_key("Ethernet4:0"));
    assert!(!snapshot.contains_key("Ethernet40:0"));
}

#[tokio::test]
async fn test_queue_counters_blank_filter_means_all() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::new(test_app(&dir).await).unwrap();
    let response = server
        .get("/counters/queues")
        .add_query_param("interfaces", "")
        .await;
    response.assert_status_ok();
    let snapshot: QueueCountersSnapshot = response.json();
    assert!(snapshot.contains_key("Ethernet0:0"));
    assert!(snapshot.contains_key("Ethernet40:0"));
}

// --- WebSocket message tests (require http_transport + ws feature) ---
// Receive until we get valid JSON (server may send Ping first).

async fn receive_first_json_text<T: serde::de::DeserializeOwned>(
    ws: &mut axum_test::TestWebSocket,
) -> T {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<T>(&text) {
            return v;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for JSON"
        );
    }
}

#[tokio::test]
async fn test_ws_queues_streams_snapshots() {
    let dir = TempDir::new().unwrap();
    let server = TestServer::builder()
        .http_transport()
        .build(test_app(&dir).await)
        .unwrap();
    let mut ws = server
        .get_websocket("/ws/queues")
        .await
        .into_websocket()
        .await;
    let snapshot: QueueCountersSnapshot = receive_first_json_text(&mut ws).await;
    assert!(snapshot.contains_key("Ethernet0:0"));
    assert!(!snapshot.contains_key("Ethernet0:0:periodic"));
}
