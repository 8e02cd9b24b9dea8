//! Minimal SMTP listener feeding the capture pipeline.
//!
//! Supports HELO/EHLO, MAIL FROM, RCPT TO, DATA, RSET, NOOP, QUIT. Just
//! enough for local clients and mail libraries to hand mail over; every
//! completed DATA becomes one captured message.

use crate::{app::AppState, store::Envelope};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};
use tracing::{debug, error, info, warn};

pub async fn start_smtp(
    state: AppState,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;
    info!("smtp listener: {}", addr);
    serve(state, listener).await
}

/// Accept loop over an already-bound listener. Split out so tests can
/// bind to an ephemeral port themselves.
pub async fn serve(
    state: AppState,
    listener: TcpListener,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(state, stream).await {
                warn!("smtp connection error from {}: {}", peer, e);
            }
        });
    }
}

async fn handle_client(
    state: AppState,
    stream: TcpStream,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (read_half, mut writer) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    writer.write_all(b"220 mailsink capture service\r\n").await?;
    writer.flush().await?;

    let mut mail_from: Option<String> = None;
    let mut rcpts: Vec<String> = Vec::new();
    let mut buf = String::new();

    loop {
        buf.clear();
        let n = reader.read_line(&mut buf).await?;
        if n == 0 {
            break;
        }
        let line = buf.trim_end_matches(['\r', '\n']);
        debug!("smtp <= {}", line);
        let upper = line.to_uppercase();

        if upper.starts_with("EHLO") || upper.starts_with("HELO") {
            writer.write_all(b"250 mailsink\r\n").await?;
        } else if upper.starts_with("MAIL FROM:") {
            mail_from = Some(line[10..].trim().trim_matches(['<', '>']).to_string());
            rcpts.clear();
            writer.write_all(b"250 OK\r\n").await?;
        } else if upper.starts_with("RCPT TO:") {
            rcpts.push(line[8..].trim().trim_matches(['<', '>']).to_string());
            writer.write_all(b"250 Accepted\r\n").await?;
        } else if upper == "DATA" {
            if rcpts.is_empty() {
                writer.write_all(b"503 Error: need RCPT command\r\n").await?;
                continue;
            }
            writer
                .write_all(b"354 End data with <CR><LF>.<CR><LF>\r\n")
                .await?;
            let raw = read_data(&mut reader).await?;

            let envelope = Envelope {
                from_addr: mail_from.take().unwrap_or_default(),
                to_addrs: std::mem::take(&mut rcpts),
                raw,
            };
            match state.store.capture(envelope).await {
                Ok(id) => {
                    info!("captured message {}", id);
                    writer
                        .write_all(format!("250 OK - captured {}\r\n", id).as_bytes())
                        .await?;
                }
                Err(e) => {
                    error!("smtp capture error: {e}");
                    writer
                        .write_all(b"451 Requested action aborted: local error\r\n")
                        .await?;
                }
            }
        } else if upper == "RSET" {
            mail_from = None;
            rcpts.clear();
            writer.write_all(b"250 OK\r\n").await?;
        } else if upper == "NOOP" {
            writer.write_all(b"250 OK\r\n").await?;
        } else if upper == "QUIT" {
            writer.write_all(b"221 Bye\r\n").await?;
            break;
        } else {
            writer.write_all(b"502 Command not implemented\r\n").await?;
        }
    }
    Ok(())
}

/// Collect the payload until the lone `.` terminator line, keeping the
/// client's exact line endings and undoing SMTP dot transparency.
///
/// A connection that closes before the terminator is an error: the
/// transaction never completed, so nothing gets captured.
async fn read_data<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut data = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader.read_until(b'\n', &mut line).await?;
        if n == 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed before data terminator",
            ));
        }
        if line == b".\r\n" || line == b".\n" {
            break;
        }
        if line.starts_with(b".") {
            data.extend_from_slice(&line[1..]);
        } else {
            data.extend_from_slice(&line);
        }
    }
    Ok(data)
}
