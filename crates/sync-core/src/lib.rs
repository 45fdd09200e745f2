//! # sync-core
//!
//! Shared library for MediaSync containing the playback event types and the
//! text wire codec.
//!
//! This crate is used by both the relay server and the client application.
//! It has zero dependencies on OS APIs, network sockets, or the async runtime.
//!
//! # Architecture overview (for beginners)
//!
//! MediaSync keeps several media players in sync: when one viewer presses
//! play, pause, or seeks, every other connected player performs the same
//! action.  The relay server does not interpret playback state itself — it
//! only validates each incoming event and fans it out to the other peers.
//!
//! This crate (`sync-core`) is the shared foundation.  It defines:
//!
//! - **`protocol::event`** – The [`EventKind`] enum (Play, Pause, Seek) and
//!   the [`SyncEvent`] pair of kind + playback position in seconds.
//!
//! - **`protocol::codec`** – How events travel over the network.  The wire
//!   format is a UTF-8 text line of two whitespace-separated tokens: an
//!   integer kind code and a decimal position, e.g. `"1 97.3"` for Pause at
//!   97.3 seconds.

pub mod protocol;

// Re-export the most-used items at the crate root so callers can write
// `sync_core::parse_event` instead of `sync_core::protocol::codec::parse_event`.
pub use protocol::codec::{encode_event, is_valid_event, parse_event, ProtocolError};
pub use protocol::event::{EventKind, SyncEvent, EVENT_KIND_COUNT};
