//! Database row for a captured message.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One captured message as persisted in the metadata store.
///
/// Written once at capture time and never updated. Fields the
/// transaction or the parsed document did not supply are stored as
/// empty strings, never NULL.
#[derive(Debug, Clone, FromRow)]
pub struct MessageRecord {
  pub id: Uuid,
  pub received_at: DateTime<Utc>,
  pub from_addr: String,
  /// Recipients in transaction order, JSON-encoded (`["a@b", ...]`).
  pub to_addrs: String,
  pub subject: String,
  /// Sender-supplied Message-ID header. Indexed, duplicates allowed.
  pub message_id: String,
  /// Exact size of the raw payload in bytes.
  pub size_bytes: i64,
  pub has_attachments: bool,
  /// Location of the raw payload in the raw store.
  pub raw_path: String,
}

impl MessageRecord {
  /// Recipients decoded from the stored JSON list.
  pub fn recipients(&self) -> Vec<String> {
    serde_json::from_str(&self.to_addrs).unwrap_or_default()
  }
}
