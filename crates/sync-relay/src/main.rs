//! MediaSync relay entry point.
//!
//! Loads configuration, binds the TCP listener, and runs the accept loop
//! until a shutdown signal arrives.
//!
//! ```text
//! main()
//!  └─ load_config()          -- TOML file, written with defaults on first run
//!  └─ RelayServer::bind()    -- fatal if the address cannot be bound
//!  └─ ctrl-c task            -- clears the shared running flag
//!  └─ server.run(running)    -- accept loop, one session task per peer
//! ```
//!
//! An optional positional argument (`host:port`) overrides the configured
//! listen address: `sync-relay 0.0.0.0:7788`.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sync_relay::config;
use sync_relay::relay::RelayServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("MediaSync relay starting");

    let config = config::load_config().context("failed to load configuration")?;

    let listen_addr = match std::env::args().nth(1) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid listen address argument {raw:?}"))?,
        None => config.listen_addr().context("invalid configured listen address")?,
    };

    // Bind failure is the one fatal startup condition.
    let server = RelayServer::bind(listen_addr, config.relay.max_line_bytes)
        .await
        .context("failed to start relay")?;
    info!("relay ready on {}", server.local_addr());

    // Shutdown flag shared with the accept loop.
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    server.run(running).await;

    info!("MediaSync relay stopped");
    Ok(())
}
