// Switch counters DB access via sqlx.
// SQLite rendering of the telemetry COUNTERS_DB: queue_name_map resolves
// composite queue ids ("Ethernet0:3") to counter-object keys, counters holds
// the per-object field/value hashes, port_alias_map holds alias -> port.

use serde_json::Value;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const COUNTERS_DB: &str = "COUNTERS_DB";
pub const COUNTERS_TABLE: &str = "COUNTERS";
pub const QUEUES_GROUP: &str = "Queues";

/// Wildcard pattern covering every front-panel interface.
pub const ALL_INTERFACES_PATTERN: &str = "Ethernet*";

/// One counters lookup: fixed db/table identifiers, an interface pattern
/// ("Ethernet0" or a `*` wildcard), and the object group to resolve against.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountersQuery {
    pub db: &'static str,
    pub table: &'static str,
    pub pattern: String,
    pub group: &'static str,
}

impl CountersQuery {
    /// Queue counters query for the given interface pattern.
    pub fn queues(pattern: impl Into<String>) -> Self {
        Self {
            db: COUNTERS_DB,
            table: COUNTERS_TABLE,
            pattern: pattern.into(),
            group: QUEUES_GROUP,
        }
    }
}

/// Nested query output: composite queue id -> opaque field/value mapping.
/// Values are JSON so a malformed upstream entry surfaces as a non-object
/// instead of poisoning the whole result.
pub type RawCounters = HashMap<String, Value>;

#[derive(Debug, Error)]
pub enum CountersDbError {
    #[error("unsupported object group '{0}'")]
    UnsupportedGroup(String),
    #[error("counters db unavailable: {0}")]
    Db(#[from] sqlx::Error),
}

/// Query execution seam; the snapshot builder only depends on this, so it is
/// testable against a fake source.
#[allow(async_fn_in_trait)]
pub trait CountersSource {
    /// Execute the batch and return the combined nested mapping. Any failure
    /// means the query subsystem could not produce results; no partial output.
    async fn execute_queries(&self, queries: &[CountersQuery])
    -> Result<RawCounters, CountersDbError>;
}

pub struct CountersDb {
    pool: SqlitePool,
}

impl CountersDb {
    /// Open SQLite at `path`, create parent dir and DB if missing, enable WAL + pragmas.
    pub async fn connect(path: &str, max_pool_size: u32) -> Result<Self, CountersDbError> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    /// Create tables if they don't exist.
    pub async fn init(&self) -> Result<(), CountersDbError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS queue_name_map (
                queue_key TEXT PRIMARY KEY,
                counters_key TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS counters (
                counters_key TEXT NOT NULL,
                field TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (counters_key, field)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS port_alias_map (
                alias TEXT PRIMARY KEY,
                port TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Register a composite queue id for a counter object (collector write side).
    pub async fn map_queue(
        &self,
        queue_key: &str,
        counters_key: &str,
    ) -> Result<(), CountersDbError> {
        sqlx::query("INSERT OR REPLACE INTO queue_name_map (queue_key, counters_key) VALUES ($1, $2)")
            .bind(queue_key)
            .bind(counters_key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Upsert one counter field for an object (collector write side).
    pub async fn set_counter(
        &self,
        counters_key: &str,
        field: &str,
        value: &str,
    ) -> Result<(), CountersDbError> {
        sqlx::query("INSERT OR REPLACE INTO counters (counters_key, field, value) VALUES ($1, $2, $3)")
            .bind(counters_key)
            .bind(field)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Upsert an interface alias -> canonical port name pair.
    pub async fn set_port_alias(&self, alias: &str, port: &str) -> Result<(), CountersDbError> {
        sqlx::query("INSERT OR REPLACE INTO port_alias_map (alias, port) VALUES ($1, $2)")
            .bind(alias)
            .bind(port)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Load the full alias -> canonical port name mapping.
    pub async fn load_port_alias_map(&self) -> Result<HashMap<String, String>, CountersDbError> {
        let rows = sqlx::query("SELECT alias, port FROM port_alias_map")
            .fetch_all(&self.pool)
            .await?;
        let mut out = HashMap::with_capacity(rows.len());
        for row in rows {
            let alias: String = row.try_get("alias")?;
            let port: String = row.try_get("port")?;
            out.insert(alias, port);
        }
        Ok(out)
    }
}

impl CountersSource for CountersDb {
    async fn execute_queries(
        &self,
        queries: &[CountersQuery],
    ) -> Result<RawCounters, CountersDbError> {
        let mut out = RawCounters::new();
        for query in queries {
            if query.group != QUEUES_GROUP {
                return Err(CountersDbError::UnsupportedGroup(query.group.to_string()));
            }
            let like = queue_key_like_pattern(&query.pattern);
            let rows = sqlx::query(
                r#"
                SELECT m.queue_key, c.field, c.value
                FROM queue_name_map m
                JOIN counters c ON c.counters_key = m.counters_key
                WHERE m.queue_key LIKE $1
                "#,
            )
            .bind(&like)
            .fetch_all(&self.pool)
            .await?;

            for row in rows {
                let queue_key: String = row.try_get("queue_key")?;
                let field: String = row.try_get("field")?;
                let value: String = row.try_get("value")?;
                let entry = out
                    .entry(queue_key)
                    .or_insert_with(|| Value::Object(serde_json::Map::new()));
                if let Value::Object(fields) = entry {
                    fields.insert(field, Value::String(value));
                }
            }
        }
        Ok(out)
    }
}

/// Translate an interface pattern into a SQL LIKE pattern over composite
/// queue ids: `*` becomes `%`, a bare interface name matches only its own
/// queues ("Ethernet4" must not match "Ethernet40:0").
fn queue_key_like_pattern(pattern: &str) -> String {
    if pattern.contains('*') {
        pattern.replace('*', "%")
    } else {
        format!("{pattern}:%")
    }
}
