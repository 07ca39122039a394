//! `TesseraServer` builder and accept loop.
//!
//! This is the entry point for running a Tessera game server. It ties
//! together all the layers: transport → protocol → session → world.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tessera_session::{HubHandle, SessionConfig, DEFAULT_HUB_CHANNEL_SIZE};
use tessera_transport::{TcpTransport, Transport};
use tessera_world::World;

use crate::handler::handle_connection;
use crate::TesseraError;

/// Default TCP port for game clients.
pub const DEFAULT_PORT: u16 = 7171;

/// How long a connection may stay silent before it is closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The world
/// guards its own roster and the hub is an actor, so nothing here needs
/// an outer lock.
pub(crate) struct ServerState {
    pub(crate) world: Arc<World>,
    pub(crate) hub: HubHandle,
    pub(crate) session_config: SessionConfig,
    pub(crate) idle_timeout: Option<Duration>,
}

/// Where the builder gets its world from.
enum WorldSource {
    Builtin,
    File(PathBuf),
    Ready(Arc<World>),
}

/// Builder for configuring and starting a Tessera server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn start() -> Result<(), tessera::TesseraError> {
/// use tessera::prelude::*;
///
/// let server = TesseraServer::builder()
///     .bind("0.0.0.0:7171")
///     .map_path("maps/meadow.json")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct TesseraServerBuilder {
    bind_addr: String,
    world: WorldSource,
    session_config: SessionConfig,
    idle_timeout: Option<Duration>,
}

impl TesseraServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: format!("127.0.0.1:{DEFAULT_PORT}"),
            world: WorldSource::Builtin,
            session_config: SessionConfig::default(),
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Uses an already-built world.
    pub fn world(mut self, world: Arc<World>) -> Self {
        self.world = WorldSource::Ready(world);
        self
    }

    /// Loads the world from a JSON map file at build time.
    ///
    /// A missing or invalid file falls back to the built-in map.
    pub fn map_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.world = WorldSource::File(path.into());
        self
    }

    /// Sets the session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the idle read timeout. `None` lets connections idle forever.
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Binds the listener, prepares the world, and starts the hub.
    pub async fn build(self) -> Result<TesseraServer, TesseraError> {
        let world = match self.world {
            WorldSource::Builtin => Arc::new(World::default_grid()),
            WorldSource::File(path) => Arc::new(World::load(path)),
            WorldSource::Ready(world) => world,
        };

        let transport = TcpTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            world,
            hub: HubHandle::spawn(DEFAULT_HUB_CHANNEL_SIZE),
            session_config: self.session_config,
            idle_timeout: self.idle_timeout,
        });

        Ok(TesseraServer { transport, state })
    }
}

impl Default for TesseraServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Tessera game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TesseraServer {
    transport: TcpTransport,
    state: Arc<ServerState>,
}

impl TesseraServer {
    /// Creates a new builder.
    pub fn builder() -> TesseraServerBuilder {
        TesseraServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// The world shared by every session.
    pub fn world(&self) -> Arc<World> {
        Arc::clone(&self.state.world)
    }

    /// Runs the accept loop.
    ///
    /// Spawns one handler task per accepted connection. A failed accept is
    /// logged and the loop keeps going. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), TesseraError> {
        tracing::info!(
            width = self.state.world.width(),
            height = self.state.world.height(),
            "Tessera server running"
        );

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
