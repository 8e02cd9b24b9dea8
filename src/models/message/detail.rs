//! Detail form of a captured message.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::record::MessageRecord;

/// Shape returned by single-message lookups: everything the summary
/// carries plus structured recipients and the raw store location.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDetail {
  pub id: Uuid,
  pub received_at: DateTime<Utc>,
  pub from_addr: String,
  pub to_addrs: Vec<String>,
  pub subject: String,
  pub message_id: String,
  pub size_bytes: i64,
  pub has_attachments: bool,
  pub raw_path: String,
}

impl From<MessageRecord> for MessageDetail {
  fn from(r: MessageRecord) -> Self {
    let to_addrs = r.recipients();
    MessageDetail {
      id: r.id,
      received_at: r.received_at,
      from_addr: r.from_addr,
      to_addrs,
      subject: r.subject,
      message_id: r.message_id,
      size_bytes: r.size_bytes,
      has_attachments: r.has_attachments,
      raw_path: r.raw_path,
    }
  }
}
