//! PeerRegistry: the shared set of connected peers and the broadcast fan-out.
//!
//! # Locking model (for beginners)
//!
//! Every session task shares one `PeerRegistry` behind an `Arc`.  The set of
//! peers lives inside a single `tokio::sync::Mutex` — one coarse lock for the
//! whole structure, no per-peer locks.  All three operations (`add`,
//! `remove`, `broadcast`) hold the lock for their full duration.
//!
//! The coarse lock is not an accident.  Because two broadcasts can never run
//! at the same time, every peer observes any two events in the same relative
//! order, with no interleaved partial writes.  That global ordering is the
//! one non-trivial correctness property of the relay, and it would be lost
//! with per-peer locks or per-peer outbound queues.
//!
//! The cost is availability: the writes inside `broadcast` happen while the
//! lock is held, so a slow or unresponsive peer stalls delivery to *all*
//! peers for the duration of that one write.  Acceptable for a handful of
//! players on a LAN; a known hazard at larger scale.
//!
//! # Write failures
//!
//! A failed write to one peer is logged and skipped — it neither aborts the
//! rest of the fan-out nor removes the peer.  Removal is solely the failed
//! peer's own session's responsibility once its *read* loop notices the
//! broken connection.  Until then a write-broken peer stays registered and
//! silently receives nothing (known limitation, inherited deliberately).

use std::fmt;
use std::net::SocketAddr;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tracing::{trace, warn};
use uuid::Uuid;

/// Error type for registry membership operations.
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    /// A peer with the same remote endpoint is already registered.
    #[error("peer at {0} is already connected")]
    AlreadyConnected(SocketAddr),

    /// No registered peer has the given session ID.
    #[error("peer {0} is not registered")]
    NotFound(Uuid),
}

/// Outbound byte sink for one peer.
///
/// The registry writes through this abstraction rather than a concrete TCP
/// type so its unit tests can observe (and fail) writes without sockets.
/// In production the sink is the write half of the peer's TCP stream.
#[async_trait]
pub trait MessageSink: Send {
    /// Writes all of `bytes` to the peer.
    async fn send(&mut self, bytes: &[u8]) -> std::io::Result<()>;
}

#[async_trait]
impl MessageSink for OwnedWriteHalf {
    async fn send(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.write_all(bytes).await
    }
}

/// One registered peer: session identity, remote endpoint, and outbound sink.
pub struct Peer {
    id: Uuid,
    addr: SocketAddr,
    sink: Box<dyn MessageSink>,
}

impl Peer {
    pub fn new(id: Uuid, addr: SocketAddr, sink: Box<dyn MessageSink>) -> Self {
        Self { id, addr, sink }
    }

    /// The session ID this peer was registered under.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The peer's remote endpoint, used for duplicate detection.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl fmt::Debug for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peer")
            .field("id", &self.id)
            .field("addr", &self.addr)
            .finish_non_exhaustive()
    }
}

/// The shared set of connected peers.
///
/// Membership invariant: at most one peer per distinct remote endpoint, and
/// the set contains exactly the peers whose sessions are currently active —
/// a session registers itself on start and deregisters on every exit path.
#[derive(Default)]
pub struct PeerRegistry {
    peers: Mutex<Vec<Peer>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a peer.
    ///
    /// Scans current members by remote endpoint; a duplicate is rejected,
    /// not replaced, and the set is left unchanged (the rejected `peer` is
    /// dropped, which closes its write half).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyConnected`] when another peer with the
    /// same remote endpoint is registered.
    pub async fn add(&self, peer: Peer) -> Result<(), RegistryError> {
        let mut peers = self.peers.lock().await;

        if peers.iter().any(|existing| existing.addr == peer.addr) {
            return Err(RegistryError::AlreadyConnected(peer.addr));
        }

        trace!("registered peer {} ({})", peer.id, peer.addr);
        peers.push(peer);
        Ok(())
    }

    /// Removes a peer by session ID and returns it.
    ///
    /// Identity is the session ID, not the endpoint.  The set is unordered,
    /// so `swap_remove` (replace with the last element, then shrink) keeps
    /// removal O(1).
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when no peer has that ID.
    pub async fn remove(&self, id: Uuid) -> Result<Peer, RegistryError> {
        let mut peers = self.peers.lock().await;

        let index = peers
            .iter()
            .position(|peer| peer.id == id)
            .ok_or(RegistryError::NotFound(id))?;

        let peer = peers.swap_remove(index);
        trace!("deregistered peer {} ({})", peer.id, peer.addr);
        Ok(peer)
    }

    /// Writes `bytes` verbatim to every peer except `exclude`.
    ///
    /// Runs entirely under the registry lock, so concurrent broadcasts are
    /// serialised and reach all peers in one consistent relative order.
    /// A failed write is logged and skipped; the peer stays registered (see
    /// the module docs for why).
    ///
    /// Returns the number of peers the bytes were successfully written to.
    pub async fn broadcast(&self, bytes: &[u8], exclude: Option<Uuid>) -> usize {
        let mut peers = self.peers.lock().await;
        let mut delivered = 0;

        for peer in peers.iter_mut() {
            if Some(peer.id) == exclude {
                continue;
            }

            match peer.sink.send(bytes).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!("failed to write to peer {} ({}): {e}", peer.id, peer.addr);
                }
            }
        }

        delivered
    }

    /// Number of currently registered peers.
    pub async fn peer_count(&self) -> usize {
        self.peers.lock().await.len()
    }

    /// Whether a peer with the given remote endpoint is registered.
    pub async fn contains_addr(&self, addr: SocketAddr) -> bool {
        self.peers.lock().await.iter().any(|peer| peer.addr == addr)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
