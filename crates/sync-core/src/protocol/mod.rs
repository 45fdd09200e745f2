//! Wire protocol for MediaSync.
//!
//! # Sub-modules
//!
//! - **`event`** – Typed representation of a playback-control event: the
//!   [`event::EventKind`] enum and the [`event::SyncEvent`] struct.
//!
//! - **`codec`** – Parsing and encoding of the one-line text wire format.
//!   Parsing is strict (exactly two tokens, kind in range, position a valid
//!   float); encoding is the inverse and always produces a newline-terminated
//!   line.
//!
//! There is no handshake, no framing length prefix, and no acknowledgement:
//! a message is one line of text, and a connection is a plain byte stream of
//! such lines.

pub mod codec;
pub mod event;
