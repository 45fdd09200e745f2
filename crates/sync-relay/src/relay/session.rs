//! Per-connection session loop.
//!
//! A session owns one accepted connection for its whole lifetime and moves
//! through four states:
//!
//! ```text
//! Connecting ──► Registered ──► Relaying ──► Closed
//! ```
//!
//! - `Connecting → Registered`: the write half of the stream is registered
//!   with the [`PeerRegistry`] under a fresh session ID.  A duplicate peer
//!   (same remote endpoint already registered) is rejected and the connection
//!   is closed immediately.
//!
//! - `Registered → Relaying`: the loop reads one newline-delimited event line
//!   at a time.  A valid line is broadcast verbatim to every other peer; an
//!   invalid or oversized line is logged and dropped without ending the
//!   session; no error is sent back to the sender.
//!
//! - `Relaying → Closed`: any read error or EOF ends the loop.  The session
//!   then deregisters itself (best-effort) and drops both stream halves,
//!   closing the socket.  These two releases happen on every exit path.
//!
//! # Framing
//!
//! Events are newline-delimited rather than read into a fixed buffer, so a
//! line can be any length up to the configured cap without being truncated
//! mid-message.  A line exceeding the cap is discarded in full (the rest of
//! it is drained from the stream) and the session continues.  A final line
//! that EOF cuts off before its newline is re-terminated before relaying, so
//! every broadcast event carries the same `\n` framing.

use std::net::SocketAddr;
use std::sync::Arc;

use sync_core::parse_event;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::relay::registry::{Peer, PeerRegistry};

/// Outcome of one bounded line read.
#[derive(Debug, PartialEq, Eq)]
enum LineOutcome {
    /// `line` holds one complete event line, always newline-terminated.  A
    /// final unterminated line before EOF is re-terminated so receivers see
    /// the same framing as for every other event.
    Line,
    /// The stream ended with no pending data.
    Eof,
    /// The line exceeded the cap; it was drained and discarded in full.
    Oversized,
}

/// Reads one newline-delimited line into `line`, capped at `max_bytes`.
///
/// On [`LineOutcome::Oversized`] the remainder of the offending line has
/// already been drained from the stream, so the next call starts at the
/// following line.
async fn read_event_line<R>(
    reader: &mut R,
    line: &mut Vec<u8>,
    max_bytes: usize,
) -> std::io::Result<LineOutcome>
where
    R: AsyncBufRead + Unpin,
{
    line.clear();

    let n = (&mut *reader)
        .take(max_bytes as u64)
        .read_until(b'\n', line)
        .await?;

    if n == 0 {
        return Ok(LineOutcome::Eof);
    }
    if line.last() == Some(&b'\n') {
        return Ok(LineOutcome::Line);
    }
    if n < max_bytes {
        // EOF terminated a final unframed line.  Re-terminate it: broadcast
        // forwards these bytes verbatim, and an unterminated tail would merge
        // with the next relayed event inside receivers' line-based reads.
        line.push(b'\n');
        return Ok(LineOutcome::Line);
    }

    // Cap reached without a newline: either the line keeps going (oversized),
    // or it is exactly cap-sized and the stream ends here.  Draining tells
    // the two apart, and keeps the tail of an oversized line from being
    // misread as the start of the next one.
    let mut overflowed = false;
    let mut scratch = Vec::new();
    loop {
        scratch.clear();
        let drained = (&mut *reader)
            .take(max_bytes as u64)
            .read_until(b'\n', &mut scratch)
            .await?;
        if drained == 0 {
            break;
        }
        overflowed = true;
        if scratch.last() == Some(&b'\n') {
            break;
        }
    }

    if !overflowed {
        // Final line, exactly at the cap, nothing after it: complete.
        line.push(b'\n');
        return Ok(LineOutcome::Line);
    }

    line.clear();
    Ok(LineOutcome::Oversized)
}

/// Runs one connection session to completion.
///
/// Registers the connection, relays its valid event lines to every other
/// peer, and on any terminal read condition deregisters and closes it.
pub async fn run_session(
    stream: TcpStream,
    addr: SocketAddr,
    registry: Arc<PeerRegistry>,
    max_line_bytes: usize,
) {
    let id = Uuid::new_v4();
    let (read_half, write_half) = stream.into_split();

    // Register the write half so broadcasts from other sessions reach this
    // peer while we sit in the read loop below.
    if let Err(e) = registry.add(Peer::new(id, addr, Box::new(write_half))).await {
        // Duplicate endpoint: close the connection instead of relaying
        // unregistered.  The rejected write half was already dropped inside
        // `add`; dropping the read half here closes the socket.
        warn!("rejecting connection from {addr}: {e}");
        return;
    }
    info!("session {id} started for {addr}");

    let mut reader = BufReader::new(read_half);
    let mut line = Vec::with_capacity(max_line_bytes.min(1024));

    loop {
        match read_event_line(&mut reader, &mut line, max_line_bytes).await {
            Err(e) => {
                debug!("read failed on session {id} ({addr}): {e}");
                break;
            }
            Ok(LineOutcome::Eof) => {
                debug!("peer {addr} closed session {id}");
                break;
            }
            Ok(LineOutcome::Oversized) => {
                warn!("dropping oversized event line from {addr} (cap {max_line_bytes} bytes)");
            }
            Ok(LineOutcome::Line) => match parse_event(&line) {
                Ok(event) => {
                    // Forward the framed line as read, not a re-serialisation,
                    // excluding the origin peer.
                    let delivered = registry.broadcast(&line, Some(id)).await;
                    debug!("relayed {event} from {addr} to {delivered} peer(s)");
                }
                Err(e) => {
                    warn!("dropping invalid event from {addr}: {e}");
                }
            },
        }
    }

    // Scoped-resource guarantee: deregister and close on every exit path.
    // NotFound is not an error here — nothing else removes peers, but the
    // teardown is deliberately best-effort.
    if let Err(e) = registry.remove(id).await {
        debug!("teardown of session {id}: {e}");
    }
    info!("session {id} closed for {addr}");
}

// ── Tests ─────────────────────────────────────────────────────────────────────
