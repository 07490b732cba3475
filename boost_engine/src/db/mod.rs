//! Database backends for the Boostgate engine. SQLite is the only backend at present.
#[cfg(feature = "sqlite")]
pub mod sqlite;
