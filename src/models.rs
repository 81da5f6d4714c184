// Wire models for queue counter export

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel substituted when a counter field is absent from the raw entry.
pub const MISSING_COUNTER_VALUE: &str = "N/A";

/// Normalized per-queue counter record. All nine fields are always present on
/// the wire; values are opaque strings straight from the counters DB (the DB
/// owns numeric formatting).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounters {
    #[serde(rename = "Packets")]
    pub packets: String,
    #[serde(rename = "Bytes")]
    pub bytes: String,
    #[serde(rename = "DroppedPackets")]
    pub dropped_packets: String,
    #[serde(rename = "DroppedBytes")]
    pub dropped_bytes: String,
    #[serde(rename = "TrimmedPackets")]
    pub trimmed_packets: String,
    #[serde(rename = "WREDDroppedPackets")]
    pub wred_dropped_packets: String,
    #[serde(rename = "WREDDroppedBytes")]
    pub wred_dropped_bytes: String,
    #[serde(rename = "ECNMarkedPackets")]
    pub ecn_marked_packets: String,
    #[serde(rename = "ECNMarkedBytes")]
    pub ecn_marked_bytes: String,
}

impl QueueCounters {
    /// A record with every field set to the missing-value sentinel.
    pub fn missing() -> Self {
        Self {
            packets: MISSING_COUNTER_VALUE.into(),
            bytes: MISSING_COUNTER_VALUE.into(),
            dropped_packets: MISSING_COUNTER_VALUE.into(),
            dropped_bytes: MISSING_COUNTER_VALUE.into(),
            trimmed_packets: MISSING_COUNTER_VALUE.into(),
            wred_dropped_packets: MISSING_COUNTER_VALUE.into(),
            wred_dropped_bytes: MISSING_COUNTER_VALUE.into(),
            ecn_marked_packets: MISSING_COUNTER_VALUE.into(),
            ecn_marked_bytes: MISSING_COUNTER_VALUE.into(),
        }
    }
}

/// Snapshot keyed by composite queue id ("<port>:<queue-index>").
/// BTreeMap so serialized output is sorted by queue id and deterministic.
pub type QueueCountersSnapshot = BTreeMap<String, QueueCounters>;
