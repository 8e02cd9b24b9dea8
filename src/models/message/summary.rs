//! List-view form of a captured message.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::record::MessageRecord;

/// Row shape returned by message listings. Recipients are joined into
/// one display string; the raw store location stays internal.
#[derive(Debug, Clone, Serialize)]
pub struct MessageSummary {
  pub id: Uuid,
  pub received_at: DateTime<Utc>,
  pub from_addr: String,
  pub to_addrs: String,
  pub subject: String,
  pub size_bytes: i64,
  pub has_attachments: bool,
}

impl MessageSummary {
  /// True when `query` is a case-insensitive substring of the subject,
  /// the sender, or the display recipient list.
  pub fn matches_query(&self, query: &str) -> bool {
    let q = query.to_lowercase();
    self.subject.to_lowercase().contains(&q)
      || self.from_addr.to_lowercase().contains(&q)
      || self.to_addrs.to_lowercase().contains(&q)
  }
}

impl From<MessageRecord> for MessageSummary {
  fn from(r: MessageRecord) -> Self {
    let to_addrs = r.recipients().join(", ");
    MessageSummary {
      id: r.id,
      received_at: r.received_at,
      from_addr: r.from_addr,
      to_addrs,
      subject: r.subject,
      size_bytes: r.size_bytes,
      has_attachments: r.has_attachments,
    }
  }
}
