//! Error type shared by the capture and retrieval paths.

use thiserror::Error;

/// Failures surfaced by the message store.
///
/// Unknown ids are not errors; lookups report those through `Option`
/// and `bool` return values instead.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("i/o error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
