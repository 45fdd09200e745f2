//! The relay core: peer registry, per-connection sessions, and the accept loop.
//!
//! # Sub-modules
//!
//! - **`registry`** – The shared, mutex-protected set of connected peers.
//!   Supports add, remove, and broadcast-to-all-except-sender.  This is the
//!   only shared mutable state in the server.
//!
//! - **`session`** – The per-connection control loop: register the peer,
//!   repeatedly read a line, validate it, broadcast it; deregister and close
//!   on any terminal read condition.
//!
//! - **`server`** – Binds the TCP listener and spawns one session task per
//!   accepted connection.
//!
//! # Data flow
//!
//! ```text
//! RelayServer::run()
//!  └─ accept ──► spawn run_session(stream)
//!       └─ read line ──► parse_event ──► PeerRegistry::broadcast(line, exclude=self)
//!             └─ each other peer's write half delivers the event
//! ```

pub mod registry;
pub mod server;
pub mod session;

pub use registry::{MessageSink, Peer, PeerRegistry, RegistryError};
pub use server::{RelayServer, RelayError};
