//! Interactive MediaSync client for manual testing.
//!
//! Connects to a relay, prints every event relayed from other peers, and
//! sends events typed on stdin:
//!
//! ```text
//! $ sync-client 127.0.0.1:7788
//! > seek 42.5
//! <- pause @ 97.3s          (another peer paused)
//! ```
//!
//! Commands: `play [secs]`, `pause [secs]`, `seek <secs>`, `quit`.  A raw
//! wire line (`"<kind> <position>"`) is also accepted and sent as typed.

use std::net::SocketAddr;

use anyhow::Context;
use sync_core::{encode_event, parse_event, EventKind, SyncEvent};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// What one stdin line asks the client to do.
#[derive(Debug, PartialEq)]
enum Command {
    Send(SyncEvent),
    Quit,
    Unknown,
}

/// Parses one stdin line into a [`Command`].
///
/// Named commands take a decimal position in seconds; `play` and `pause`
/// default to position 0.  Anything that parses as a raw wire line is sent
/// as-is.
fn parse_command(line: &str) -> Command {
    let mut tokens = line.split_whitespace();
    let verb = match tokens.next() {
        Some(verb) => verb,
        None => return Command::Unknown,
    };
    let position = tokens.next().and_then(|t| t.parse::<f64>().ok());

    match (verb, position) {
        ("quit" | "exit", _) => Command::Quit,
        ("play", pos) => Command::Send(SyncEvent::new(EventKind::Play, pos.unwrap_or(0.0))),
        ("pause", pos) => Command::Send(SyncEvent::new(EventKind::Pause, pos.unwrap_or(0.0))),
        ("seek", Some(pos)) => Command::Send(SyncEvent::new(EventKind::Seek, pos)),
        _ => match parse_event(line.as_bytes()) {
            Ok(event) => Command::Send(event),
            Err(_) => Command::Unknown,
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr: SocketAddr = std::env::args()
        .nth(1)
        .context("usage: sync-client <host:port>")?
        .parse()
        .context("invalid relay address")?;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("failed to connect to relay at {addr}"))?;
    info!("connected to relay at {addr}");

    let (read_half, mut write_half) = stream.into_split();

    // Inbound printer: decode and display everything the relay forwards.
    let printer = tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_event(line.as_bytes()) {
                    Ok(event) => println!("<- {event}"),
                    Err(e) => warn!("relay forwarded an undecodable line {line:?}: {e}"),
                },
                Ok(None) => {
                    info!("relay closed the connection");
                    break;
                }
                Err(e) => {
                    warn!("read error from relay: {e}");
                    break;
                }
            }
        }
    });

    // Outbound: one command per stdin line.
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = stdin.next_line().await.context("stdin read failed")? {
        match parse_command(&line) {
            Command::Quit => break,
            Command::Send(event) => {
                write_half
                    .write_all(&encode_event(&event))
                    .await
                    .context("write to relay failed")?;
            }
            Command::Unknown => {
                eprintln!("commands: play [secs] | pause [secs] | seek <secs> | quit");
            }
        }
    }

    drop(write_half);
    printer.abort();
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
