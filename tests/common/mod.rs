// Shared test helpers

use queuetel::counters_db::CountersDb;
use tempfile::TempDir;

/// Counters DB seeded with a small port/queue layout:
/// - Ethernet0 queues 0 and 1 (queue 1 has only a packet count)
/// - Ethernet4 queue 0
/// - Ethernet40 queue 0 (prefix collision guard for the Ethernet4 filter)
/// - a periodic watermark row for Ethernet0:0
/// - aliases etp1 -> Ethernet0, etp2 -> Ethernet4
pub async fn seeded_counters_db(dir: &TempDir) -> CountersDb {
    let path = dir.path().join("counters.db");
    let db = CountersDb::connect(path.to_str().unwrap(), 2).await.unwrap();
    db.init().await.unwrap();

    db.map_queue("Ethernet0:0", "oid:0x1500000000030a").await.unwrap();
    db.map_queue("Ethernet0:1", "oid:0x1500000000030b").await.unwrap();
    db.map_queue("Ethernet4:0", "oid:0x1500000000034a").await.unwrap();
    db.map_queue("Ethernet40:0", "oid:0x150000000003f0").await.unwrap();
    db.map_queue("Ethernet0:0:periodic", "oid:0x1500000000030a:wm")
        .await
        .unwrap();

    db.set_counter("oid:0x1500000000030a", "SAI_QUEUE_STAT_PACKETS", "100")
        .await
        .unwrap();
    db.set_counter("oid:0x1500000000030a", "SAI_QUEUE_STAT_BYTES", "6400")
        .await
        .unwrap();
    db.set_counter("oid:0x1500000000030a", "SAI_QUEUE_STAT_DROPPED_PACKETS", "2")
        .await
        .unwrap();
    db.set_counter("oid:0x1500000000030b", "SAI_QUEUE_STAT_PACKETS", "7")
        .await
        .unwrap();
    db.set_counter("oid:0x1500000000034a", "SAI_QUEUE_STAT_PACKETS", "55")
        .await
        .unwrap();
    db.set_counter("oid:0x1500000000034a", "SAI_QUEUE_STAT_WRED_DROPPED_PACKETS", "3")
        .await
        .unwrap();
    db.set_counter("oid:0x150000000003f0", "SAI_QUEUE_STAT_PACKETS", "11")
        .await
        .unwrap();
    db.set_counter("oid:0x1500000000030a:wm", "SAI_QUEUE_STAT_PACKETS", "5")
        .await
        .unwrap();

    db.set_port_alias("etp1", "Ethernet0").await.unwrap();
    db.set_port_alias("etp2", "Ethernet4").await.unwrap();

    db
}
