//! Raw store: one `.eml` file per message identity.

use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Directory holding the exact captured payload bytes, one file per id.
///
/// Nothing here knows about metadata; callers resolve ids through the
/// metadata store and only then touch files.
#[derive(Debug, Clone)]
pub struct RawStore {
  dir: PathBuf,
}

impl RawStore {
  /// Open the store directory, creating it if absent.
  pub async fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
    let dir = dir.into();
    fs::create_dir_all(&dir).await?;
    Ok(RawStore { dir })
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  /// Path the payload for `id` is (or would be) stored at.
  pub fn path_for(&self, id: Uuid) -> PathBuf {
    self.dir.join(format!("{id}.eml"))
  }

  /// Write the payload for a fresh identity and return its final path.
  ///
  /// Bytes land in a `.tmp` sibling first and are renamed into place, so
  /// no reader can observe a partially written `.eml` file.
  pub async fn put(&self, id: Uuid, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let path = self.path_for(id);
    let tmp = self.dir.join(format!("{id}.eml.tmp"));
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, &path).await?;
    Ok(path)
  }

  /// Remove the payload file for an identity.
  pub async fn delete(&self, id: Uuid) -> std::io::Result<()> {
    fs::remove_file(self.path_for(id)).await
  }
}
