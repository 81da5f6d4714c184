// Library for tests to access modules

pub mod config;
pub mod counters_db;
pub mod models;
pub mod portmap;
pub mod routes;
pub mod snapshot;
pub mod version;
