//! Column names for the `messages` table.
//!
//! Schema, INSERT, and every SELECT are built from these constants so
//! the write and read sides cannot drift apart.

pub const TABLE: &str = "messages";

pub const ID: &str = "id";
pub const RECEIVED_AT: &str = "received_at";
pub const FROM_ADDR: &str = "from_addr";
pub const TO_ADDRS: &str = "to_addrs";
pub const SUBJECT: &str = "subject";
pub const MESSAGE_ID: &str = "message_id";
pub const SIZE_BYTES: &str = "size_bytes";
pub const HAS_ATTACHMENTS: &str = "has_attachments";
pub const RAW_PATH: &str = "raw_path";

/// All columns in record order, for SELECT lists and INSERT clauses.
pub const LIST: [&str; 9] = [
  ID,
  RECEIVED_AT,
  FROM_ADDR,
  TO_ADDRS,
  SUBJECT,
  MESSAGE_ID,
  SIZE_BYTES,
  HAS_ATTACHMENTS,
  RAW_PATH,
];
