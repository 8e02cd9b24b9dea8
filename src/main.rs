#[tokio::main]
async fn main() {
  // Minimal CLI: support --version/-V
  let mut args = std::env::args().skip(1);
  if let Some(arg) = args.next() {
    if arg == "--version" || arg == "-V" {
      println!("mailsink {}", env!("CARGO_PKG_VERSION"));
      return;
    }
    // Allow running without args; any other arg prints help
    if arg == "--help" || arg == "-h" {
      eprintln!("Usage: mailsink [--version]");
      eprintln!();
      eprintln!("Configuration (environment):");
      eprintln!("  MAILSINK_SMTP_ADDR   SMTP listener, default 127.0.0.1:1025");
      eprintln!("  MAILSINK_HTTP_ADDR   HTTP API, default 127.0.0.1:8025");
      eprintln!("  MAILSINK_DB          metadata database, default ./localdata/messages.db");
      eprintln!("  MAILSINK_STORE_DIR   raw .eml directory, default ./localdata");
      eprintln!("  MAILSINK_API_TOKEN   bearer token for /messages; unset disables auth");
      return;
    }
  }

  if let Err(e) = mailsink::app::run().await {
    eprintln!("error: {e}");
    std::process::exit(1);
  }
}
