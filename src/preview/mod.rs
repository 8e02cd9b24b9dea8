//! Best-effort preview of a captured payload: a flat header map plus a
//! plain-text body.
//!
//! Previews are for human eyes. Decoding is lossy where it has to be,
//! and nothing here can fail: bad input previews as empty.

use mailparse::{MailHeaderMap, ParsedMail, parse_mail};
use std::collections::HashMap;
use std::path::Path;

/// Headers surfaced in a preview when the document carries them.
const PREVIEW_HEADERS: [&str; 5] = ["From", "To", "Subject", "Date", "Message-ID"];

/// Extract display headers and a best-effort plain-text body.
///
/// Input that does not parse as a mail document yields an empty map and
/// an empty body. Headers absent from the document are omitted from the
/// map, never inserted as empty strings.
pub fn extract(raw: &[u8]) -> (HashMap<String, String>, String) {
  let Ok(parsed) = parse_mail(raw) else {
    return (HashMap::new(), String::new());
  };

  let mut headers = HashMap::new();
  for key in PREVIEW_HEADERS {
    if let Some(value) = parsed.headers.get_first_value(key) {
      headers.insert(key.to_string(), value);
    }
  }

  (headers, body_text(&parsed))
}

/// Like [`extract`], reading the payload from disk first. A missing or
/// unreadable file previews as empty.
pub async fn extract_file(path: impl AsRef<Path>) -> (HashMap<String, String>, String) {
  match tokio::fs::read(path).await {
    Ok(raw) => extract(&raw),
    Err(_) => (HashMap::new(), String::new()),
  }
}

/// Body selection: a multipart document yields its first `text/plain`
/// part in document order, falling back to the first `text/*` part; a
/// single-part document yields its own content only when it is text.
fn body_text(parsed: &ParsedMail<'_>) -> String {
  if parsed.subparts.is_empty() {
    if parsed.ctype.mimetype.starts_with("text/") {
      return parsed.get_body().unwrap_or_default();
    }
    return String::new();
  }
  if let Some(body) = find_leaf(parsed, |mime| mime == "text/plain") {
    return body;
  }
  find_leaf(parsed, |mime| mime.starts_with("text/")).unwrap_or_default()
}

/// Depth-first scan over leaf parts in document order.
fn find_leaf(parsed: &ParsedMail<'_>, wanted: impl Fn(&str) -> bool + Copy) -> Option<String> {
  if parsed.subparts.is_empty() {
    if wanted(parsed.ctype.mimetype.as_str()) {
      return parsed.get_body().ok();
    }
    return None;
  }
  parsed.subparts.iter().find_map(|part| find_leaf(part, wanted))
}
