//! mailsink library entrypoint.
//!
//! Modules:
//! - `app`: startup, configuration, shared state
//! - `db`: SQLite pool and schema helpers
//! - `error`: store error type
//! - `http`: Axum router and handlers
//! - `models`: typed records used across layers
//! - `preview`: best-effort header and body extraction for display
//! - `smtp`: lightweight SMTP capture listener (local dev)
//! - `store`: capture and retrieval over metadata plus raw files
//! - `util`: logging setup

pub mod app;
pub mod db;
pub mod error;
pub mod http;
pub mod models;
pub mod preview;
pub mod smtp;
pub mod store;
pub mod util;
