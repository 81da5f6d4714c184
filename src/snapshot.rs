// Queue counter snapshot pipeline: interface filter -> counters queries ->
// normalized per-queue records.

use crate::counters_db::{ALL_INTERFACES_PATTERN, CountersDbError, CountersQuery, CountersSource};
use crate::models::{MISSING_COUNTER_VALUE, QueueCounters, QueueCountersSnapshot};
use crate::portmap::PortAliasMap;
use serde_json::Value;
use std::collections::HashMap;

/// Suffix marking instantaneous watermark samples; those are not cumulative
/// counters and are never surfaced.
pub const PERIODIC_WATERMARK_SUFFIX: &str = ":periodic";

// SAI queue stat ids as stored in the counters table.
const STAT_PACKETS: &str = "SAI_QUEUE_STAT_PACKETS";
const STAT_BYTES: &str = "SAI_QUEUE_STAT_BYTES";
const STAT_DROPPED_PACKETS: &str = "SAI_QUEUE_STAT_DROPPED_PACKETS";
const STAT_DROPPED_BYTES: &str = "SAI_QUEUE_STAT_DROPPED_BYTES";
const STAT_TRIM_PACKETS: &str = "SAI_QUEUE_STAT_TRIM_PACKETS";
const STAT_WRED_DROPPED_PACKETS: &str = "SAI_QUEUE_STAT_WRED_DROPPED_PACKETS";
const STAT_WRED_DROPPED_BYTES: &str = "SAI_QUEUE_STAT_WRED_DROPPED_BYTES";
const STAT_WRED_ECN_MARKED_PACKETS: &str = "SAI_QUEUE_STAT_WRED_ECN_MARKED_PACKETS";
const STAT_WRED_ECN_MARKED_BYTES: &str = "SAI_QUEUE_STAT_WRED_ECN_MARKED_BYTES";

/// Receives per-entry anomalies from the snapshot builder. Injected so the
/// builder is testable without capturing process-wide log output.
pub trait DiagnosticSink: Send + Sync {
    fn malformed_entry(&self, queue: &str, value: &Value);
}

/// Default sink: structured warning via tracing.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn malformed_entry(&self, queue: &str, value: &Value) {
        tracing::warn!(queue, %value, "Ignoring invalid counters for queue");
    }
}

/// Translate an interface filter into counters queries. An empty filter
/// yields one wildcard query over all interfaces; otherwise one query per
/// interface in caller order (duplicates yield duplicate queries).
pub fn queue_queries(interfaces: &[String]) -> Vec<CountersQuery> {
    if interfaces.is_empty() {
        vec![CountersQuery::queues(ALL_INTERFACES_PATTERN)]
    } else {
        interfaces
            .iter()
            .map(|iface| CountersQuery::queues(iface.as_str()))
            .collect()
    }
}

/// Stored value for `key`, or `default` when absent. No coercion; values are
/// opaque strings.
pub fn value_or_default(fields: &HashMap<String, String>, key: &str, default: &str) -> String {
    fields
        .get(key)
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Extract the nine recognized queue stats from a decoded field record,
/// substituting the missing-value sentinel for absent fields. Pure; unknown
/// input keys are ignored.
pub fn extract_queue_counters(fields: &HashMap<String, String>) -> QueueCounters {
    QueueCounters {
        packets: value_or_default(fields, STAT_PACKETS, MISSING_COUNTER_VALUE),
        bytes: value_or_default(fields, STAT_BYTES, MISSING_COUNTER_VALUE),
        dropped_packets: value_or_default(fields, STAT_DROPPED_PACKETS, MISSING_COUNTER_VALUE),
        dropped_bytes: value_or_default(fields, STAT_DROPPED_BYTES, MISSING_COUNTER_VALUE),
        trimmed_packets: value_or_default(fields, STAT_TRIM_PACKETS, MISSING_COUNTER_VALUE),
        wred_dropped_packets: value_or_default(
            fields,
            STAT_WRED_DROPPED_PACKETS,
            MISSING_COUNTER_VALUE,
        ),
        wred_dropped_bytes: value_or_default(
            fields,
            STAT_WRED_DROPPED_BYTES,
            MISSING_COUNTER_VALUE,
        ),
        ecn_marked_packets: value_or_default(
            fields,
            STAT_WRED_ECN_MARKED_PACKETS,
            MISSING_COUNTER_VALUE,
        ),
        ecn_marked_bytes: value_or_default(
            fields,
            STAT_WRED_ECN_MARKED_BYTES,
            MISSING_COUNTER_VALUE,
        ),
    }
}

/// Assembles queue counter snapshots from a counters source. Stateless across
/// calls; every build returns an independent snapshot.
pub struct SnapshotBuilder<'a, S> {
    source: &'a S,
    aliases: &'a PortAliasMap,
    diagnostics: &'a dyn DiagnosticSink,
}

impl<'a, S: CountersSource> SnapshotBuilder<'a, S> {
    pub fn new(
        source: &'a S,
        aliases: &'a PortAliasMap,
        diagnostics: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            source,
            aliases,
            diagnostics,
        }
    }

    /// Build a snapshot for the given interface filter (empty = all).
    /// Query-layer failures are fatal and propagated unchanged; per-entry
    /// anomalies are skipped so one bad queue cannot abort the snapshot.
    pub async fn build(
        &self,
        interfaces: &[String],
    ) -> Result<QueueCountersSnapshot, CountersDbError> {
        let queries = queue_queries(interfaces);
        let raw = self.source.execute_queries(&queries).await?;
        let raw = self.aliases.remap_queues(raw);

        let mut snapshot = QueueCountersSnapshot::new();
        for (queue, counters) in raw {
            if queue.ends_with(PERIODIC_WATERMARK_SUFFIX) {
                continue;
            }
            let fields: HashMap<String, String> = match serde_json::from_value(counters.clone()) {
                Ok(fields) => fields,
                Err(_) => {
                    self.diagnostics.malformed_entry(&queue, &counters);
                    continue;
                }
            };
            snapshot.insert(queue, extract_queue_counters(&fields));
        }
        Ok(snapshot)
    }
}
