//! TCP accept loop for the relay.
//!
//! Binding the listener is the only fatal startup condition; once bound, the
//! loop runs until the shutdown flag clears, spawning one independent session
//! task per accepted connection.  An accept failure is logged and the loop
//! continues.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::relay::registry::PeerRegistry;
use crate::relay::session::run_session;

/// Error type for relay server startup.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The TCP listener could not be bound.
    #[error("failed to bind relay listener on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The bound listener's local address could not be read.
    #[error("failed to read listener address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

/// The relay server: a bound listener plus the shared peer registry.
pub struct RelayServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    registry: Arc<PeerRegistry>,
    max_line_bytes: usize,
}

impl RelayServer {
    /// Binds the listener on `addr`.
    ///
    /// `max_line_bytes` caps the length of one event line in the session
    /// read loops.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::BindFailed`] when the address cannot be bound —
    /// a fatal condition at startup.
    pub async fn bind(addr: SocketAddr, max_line_bytes: usize) -> Result<Self, RelayError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| RelayError::BindFailed { addr, source })?;
        let local_addr = listener.local_addr().map_err(RelayError::LocalAddr)?;

        Ok(Self {
            listener,
            local_addr,
            registry: Arc::new(PeerRegistry::new()),
            max_line_bytes,
        })
    }

    /// The address the listener is actually bound to.
    ///
    /// Differs from the requested address when binding port 0 (tests do this
    /// to get an ephemeral port).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The shared peer registry.
    pub fn registry(&self) -> Arc<PeerRegistry> {
        Arc::clone(&self.registry)
    }

    /// Accepts connections until `running` clears.
    ///
    /// Each accepted connection gets its own session task; the accept loop
    /// never waits on a session.  Accept failures are non-fatal and retried
    /// indefinitely.
    pub async fn run(self, running: Arc<AtomicBool>) {
        info!("relay listening on {}", self.local_addr);

        while running.load(Ordering::Relaxed) {
            // Wake periodically so a shutdown request is noticed even when
            // no connection ever arrives.
            let accepted = tokio::select! {
                result = self.listener.accept() => Some(result),
                () = tokio::time::sleep(Duration::from_millis(200)) => None,
            };

            match accepted {
                None => continue,
                Some(Ok((stream, addr))) => {
                    info!("accepted connection from {addr}");
                    let registry = Arc::clone(&self.registry);
                    let max_line_bytes = self.max_line_bytes;
                    tokio::spawn(async move {
                        run_session(stream, addr, registry, max_line_bytes).await;
                    });
                }
                Some(Err(e)) => {
                    error!("failed to accept connection: {e}");
                }
            }
        }

        info!("relay accept loop stopped");
    }
}
