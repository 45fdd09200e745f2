//! Text codec for playback-control events.
//!
//! Wire format (one event per line):
//! ```text
//! <kind> <position>
//! ```
//! where `<kind>` is an integer code (`0` = Play, `1` = Pause, `2` = Seek)
//! and `<position>` is a decimal number of seconds, e.g. `"2 42.5"` for a
//! seek to 42.5 seconds.
//!
//! Parsing is a pure function of the input bytes: it splits on whitespace,
//! requires exactly two tokens, and checks only syntax and the kind range.
//! There are no semantic checks on the position (see [`SyncEvent::position`]).

use crate::protocol::event::{EventKind, SyncEvent, EVENT_KIND_COUNT};
use std::str::Utf8Error;
use thiserror::Error;

/// Errors that can occur while parsing an event line.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The raw bytes are not valid UTF-8.
    #[error("event line is not valid UTF-8: {0}")]
    NotUtf8(#[from] Utf8Error),

    /// The line did not split into exactly two whitespace-separated tokens.
    #[error("expected 2 tokens, got {found}")]
    WrongTokenCount { found: usize },

    /// The kind token is not an integer.
    #[error("event kind token {0:?} is not an integer")]
    InvalidKindToken(String),

    /// The kind token is an integer outside `[0, EVENT_KIND_COUNT)`.
    #[error("unknown event kind code: {0}")]
    UnknownEventKind(i64),

    /// The position token is not a floating-point number.
    #[error("position token {0:?} is not a number")]
    InvalidPosition(String),
}

/// Parses one event line into a [`SyncEvent`].
///
/// The input may carry leading/trailing whitespace (including the line
/// terminator); whitespace only separates the two tokens and is otherwise
/// ignored.
///
/// # Errors
///
/// Returns [`ProtocolError`] describing the first syntax violation found.
///
/// # Examples
///
/// ```rust
/// use sync_core::{parse_event, EventKind};
///
/// let event = parse_event(b"2 42.5").unwrap();
/// assert_eq!(event.kind, EventKind::Seek);
/// assert_eq!(event.position, 42.5);
/// ```
pub fn parse_event(raw: &[u8]) -> Result<SyncEvent, ProtocolError> {
    let text = std::str::from_utf8(raw)?;

    let mut tokens = text.split_whitespace();
    let kind_token = tokens.next();
    let position_token = tokens.next();
    let extra = tokens.count();

    let (kind_token, position_token) = match (kind_token, position_token, extra) {
        (Some(kind), Some(position), 0) => (kind, position),
        (kind, position, extra) => {
            let found = kind.map_or(0, |_| 1) + position.map_or(0, |_| 1) + extra;
            return Err(ProtocolError::WrongTokenCount { found });
        }
    };

    let code: i64 = kind_token
        .parse()
        .map_err(|_| ProtocolError::InvalidKindToken(kind_token.to_string()))?;
    if !(0..i64::from(EVENT_KIND_COUNT)).contains(&code) {
        return Err(ProtocolError::UnknownEventKind(code));
    }
    // The range check above guarantees the cast and conversion succeed.
    let kind = EventKind::try_from(code as u8)
        .map_err(|c| ProtocolError::UnknownEventKind(i64::from(c)))?;

    let position: f64 = position_token
        .parse()
        .map_err(|_| ProtocolError::InvalidPosition(position_token.to_string()))?;

    Ok(SyncEvent { kind, position })
}

/// Returns `true` when `raw` is a well-formed event line.
///
/// Boolean form of [`parse_event`]; the relay uses it to decide whether a
/// received line may be forwarded.
pub fn is_valid_event(raw: &[u8]) -> bool {
    parse_event(raw).is_ok()
}

/// Encodes a [`SyncEvent`] into its newline-terminated wire line.
///
/// # Examples
///
/// ```rust
/// use sync_core::{encode_event, EventKind, SyncEvent};
///
/// let bytes = encode_event(&SyncEvent::new(EventKind::Pause, 97.3));
/// assert_eq!(bytes, b"1 97.3\n");
/// ```
pub fn encode_event(event: &SyncEvent) -> Vec<u8> {
    format!("{} {}\n", event.kind.code(), event.position).into_bytes()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
