//! Message store: capture on one side, browse and retrieval on the other.
//!
//! Metadata lives in SQLite, payload bytes in the raw store. The
//! metadata row is the source of truth for existence: a message is
//! captured once its row is durable, and gone once the row is gone.

pub mod raw;

use chrono::Utc;
use mailparse::{MailHeaderMap, parse_mail};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

use crate::error::Result;
use crate::models::message::columns;
use crate::models::message::detail::MessageDetail;
use crate::models::message::record::MessageRecord;
use crate::models::message::summary::MessageSummary;
use self::raw::RawStore;

/// One completed inbound transaction as handed over by the transport:
/// sender, recipients in transaction order, exact payload bytes.
#[derive(Debug, Clone)]
pub struct Envelope {
  pub from_addr: String,
  pub to_addrs: Vec<String>,
  pub raw: Vec<u8>,
}

#[derive(Clone)]
pub struct Store {
  pool: SqlitePool,
  raw: RawStore,
}

impl Store {
  pub fn new(pool: SqlitePool, raw: RawStore) -> Self {
    Store { pool, raw }
  }

  /// Capture one envelope: assign a fresh id, persist the raw bytes,
  /// derive metadata from them, insert the record. Returns the id.
  ///
  /// A payload that does not parse as a mail document is still captured;
  /// the derived fields just stay empty. If the metadata insert fails the
  /// raw file is rolled back (best effort) and the error propagates, so
  /// a reported capture always has a durable row.
  pub async fn capture(&self, envelope: Envelope) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let raw_path = self.raw.put(id, &envelope.raw).await?;

    let (subject, message_id, has_attachments) = derive_fields(&envelope.raw);

    let record = MessageRecord {
      id,
      received_at: Utc::now(),
      from_addr: envelope.from_addr,
      to_addrs: serde_json::to_string(&envelope.to_addrs).unwrap_or_else(|_| "[]".into()),
      subject,
      message_id,
      size_bytes: envelope.raw.len() as i64,
      has_attachments,
      raw_path: raw_path.to_string_lossy().into_owned(),
    };

    if let Err(e) = self.insert_record(&record).await {
      if let Err(rm) = self.raw.delete(id).await {
        warn!("could not roll back raw file for {id}: {rm}");
      }
      return Err(e);
    }
    Ok(id)
  }

  /// Insert a record as-is. The primary key rejects an id that is
  /// already present.
  pub async fn insert_record(&self, record: &MessageRecord) -> Result<()> {
    let sql = format!(
      "INSERT INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
      columns::TABLE,
      columns::LIST.join(", "),
    );
    sqlx::query(&sql)
      .bind(record.id)
      .bind(record.received_at)
      .bind(&record.from_addr)
      .bind(&record.to_addrs)
      .bind(&record.subject)
      .bind(&record.message_id)
      .bind(record.size_bytes)
      .bind(record.has_attachments)
      .bind(&record.raw_path)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  /// Newest-first summaries, at most `limit` rows. Rows sharing a
  /// capture timestamp come back latest-insert first, so the order is
  /// stable across calls.
  pub async fn list_messages(&self, limit: u32) -> Result<Vec<MessageSummary>> {
    let sql = format!(
      "SELECT {} FROM {} ORDER BY {} DESC, rowid DESC LIMIT ?",
      columns::LIST.join(", "),
      columns::TABLE,
      columns::RECEIVED_AT,
    );
    let rows: Vec<MessageRecord> = sqlx::query_as(&sql)
      .bind(i64::from(limit))
      .fetch_all(&self.pool)
      .await?;
    Ok(rows.into_iter().map(MessageSummary::from).collect())
  }

  /// Full detail for one id, or `None` when unknown.
  pub async fn get_message(&self, id: Uuid) -> Result<Option<MessageDetail>> {
    Ok(self.get_record(id).await?.map(MessageDetail::from))
  }

  async fn get_record(&self, id: Uuid) -> Result<Option<MessageRecord>> {
    let sql = format!(
      "SELECT {} FROM {} WHERE {} = ?",
      columns::LIST.join(", "),
      columns::TABLE,
      columns::ID,
    );
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  /// Every record carrying the given sender-supplied Message-ID, oldest
  /// first. The column is indexed but not unique, so re-sent mail shows
  /// up as several records.
  pub async fn find_by_message_id(&self, message_id: &str) -> Result<Vec<MessageRecord>> {
    let sql = format!(
      "SELECT {} FROM {} WHERE {} = ? ORDER BY rowid",
      columns::LIST.join(", "),
      columns::TABLE,
      columns::MESSAGE_ID,
    );
    Ok(
      sqlx::query_as(&sql)
        .bind(message_id)
        .fetch_all(&self.pool)
        .await?,
    )
  }

  /// Delete a message. Returns `false` when the id is unknown, `true`
  /// once the metadata row is gone.
  ///
  /// The raw file removal is best effort and targets the recorded path,
  /// so it stays correct when the store directory moved since capture.
  /// A file that is already missing only logs a warning, since the row
  /// is what defines existence. Two racing deletes of one id resolve to
  /// exactly one `true`.
  pub async fn delete_message(&self, id: Uuid) -> Result<bool> {
    let Some(record) = self.get_record(id).await? else {
      return Ok(false);
    };
    if let Err(e) = tokio::fs::remove_file(&record.raw_path).await {
      warn!("raw file for {id} not removed: {e}");
    }
    let sql = format!("DELETE FROM {} WHERE {} = ?", columns::TABLE, columns::ID);
    let done = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
    Ok(done.rows_affected() > 0)
  }

  /// Copy the raw payload out to `dest_dir/<id>.eml`, creating the
  /// directory if needed, and return the destination path. `None` when
  /// the id is unknown, and in that case nothing is created. A failure
  /// while copying is a hard error, never a silent partial export.
  ///
  /// The payload is read in full and written through a `.tmp` sibling,
  /// so a destination that aliases the stored file, such as the store
  /// directory itself, leaves the bytes intact.
  pub async fn export_message(&self, id: Uuid, dest_dir: &Path) -> Result<Option<PathBuf>> {
    let Some(record) = self.get_record(id).await? else {
      return Ok(None);
    };
    let bytes = tokio::fs::read(&record.raw_path).await?;
    tokio::fs::create_dir_all(dest_dir).await?;
    let dest = dest_dir.join(format!("{id}.eml"));
    let tmp = dest_dir.join(format!("{id}.eml.tmp"));
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, &dest).await?;
    Ok(Some(dest))
  }
}

/// Keep the summaries matching `query` (case-insensitive substring over
/// subject, sender, and display recipients). A blank query keeps all.
/// Works on already-fetched rows: a snapshot, not a live view.
pub fn filter_summaries(summaries: Vec<MessageSummary>, query: &str) -> Vec<MessageSummary> {
  let q = query.trim();
  if q.is_empty() {
    return summaries;
  }
  summaries
    .into_iter()
    .filter(|s| s.matches_query(q))
    .collect()
}

/// Subject, Message-ID, and the attachment flag derived from the raw
/// payload. A parse failure leaves all three at their defaults.
fn derive_fields(raw: &[u8]) -> (String, String, bool) {
  match parse_mail(raw) {
    Ok(parsed) => (
      parsed.headers.get_first_value("Subject").unwrap_or_default(),
      parsed.headers.get_first_value("Message-ID").unwrap_or_default(),
      parsed.ctype.mimetype.starts_with("multipart/"),
    ),
    Err(e) => {
      warn!("payload did not parse as mail, capturing with empty fields: {e}");
      (String::new(), String::new(), false)
    }
  }
}
