//! Database helpers: pool setup and schema migrations.

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use std::path::Path;
use std::time::Duration;

use crate::models::message::columns;

/// Open (or create) the metadata database at `path` and apply the schema.
///
/// WAL mode lets list and get queries run while a capture is writing;
/// the busy timeout makes contending writers queue instead of erroring.
pub async fn open_pool(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// In-memory database with the schema applied. Test use only; capped at
/// one connection because every `:memory:` connection is its own database.
pub async fn open_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Create the messages table and its indexes if absent.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            {id}              TEXT PRIMARY KEY,
            {received_at}     TEXT NOT NULL,
            {from_addr}       TEXT NOT NULL DEFAULT '',
            {to_addrs}        TEXT NOT NULL DEFAULT '[]',
            {subject}         TEXT NOT NULL DEFAULT '',
            {message_id}      TEXT NOT NULL DEFAULT '',
            {size_bytes}      INTEGER NOT NULL,
            {has_attachments} INTEGER NOT NULL DEFAULT 0,
            {raw_path}        TEXT NOT NULL
        )
        "#,
        table = columns::TABLE,
        id = columns::ID,
        received_at = columns::RECEIVED_AT,
        from_addr = columns::FROM_ADDR,
        to_addrs = columns::TO_ADDRS,
        subject = columns::SUBJECT,
        message_id = columns::MESSAGE_ID,
        size_bytes = columns::SIZE_BYTES,
        has_attachments = columns::HAS_ATTACHMENTS,
        raw_path = columns::RAW_PATH,
    );
    sqlx::query(&ddl).execute(pool).await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_messages_received_at ON {}({})",
        columns::TABLE,
        columns::RECEIVED_AT,
    ))
    .execute(pool)
    .await?;

    // Not unique: senders may reuse a Message-ID, and every copy is kept.
    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_messages_message_id ON {}({})",
        columns::TABLE,
        columns::MESSAGE_ID,
    ))
    .execute(pool)
    .await?;

    Ok(())
}
