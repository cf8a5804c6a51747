//! `ParlorServer` builder and server loop.
//!
//! This is the entry point for running a Parlor server. It ties together
//! all the layers: transport → protocol → session → room, and serves the
//! HTTP room API next to the WebSocket event channel.

use std::net::SocketAddr;

use parlor_lifecycle::LifecycleConfig;
use parlor_protocol::{Codec, JsonCodec};
use parlor_room::{GameLogic, RoomRegistry};
use parlor_session::SessionIndex;
use parlor_transport::{Transport, WebSocketTransport};
use tokio::net::TcpListener;

use crate::broadcaster::EventBroadcaster;
use crate::handler::handle_connection;
use crate::{ParlorError, http};

/// Default address of the HTTP room API.
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";
/// Default address of the WebSocket event channel.
pub const DEFAULT_WS_ADDR: &str = "0.0.0.0:3001";

/// Builder for configuring and starting a Parlor server.
///
/// # Example
///
/// ```rust,no_run
/// use parlor::prelude::*;
///
/// # async fn run() -> Result<(), ParlorError> {
/// let server = ParlorServerBuilder::new()
///     .http_bind("0.0.0.0:3000")
///     .ws_bind("0.0.0.0:3001")
///     .build::<TicTacToe>()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ParlorServerBuilder {
    http_addr: String,
    ws_addr: String,
    lifecycle: LifecycleConfig,
}

impl ParlorServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            ws_addr: DEFAULT_WS_ADDR.to_string(),
            lifecycle: LifecycleConfig::default(),
        }
    }

    /// Sets the address the HTTP room API binds to.
    pub fn http_bind(mut self, addr: &str) -> Self {
        self.http_addr = addr.to_string();
        self
    }

    /// Sets the address the WebSocket event channel binds to.
    pub fn ws_bind(mut self, addr: &str) -> Self {
        self.ws_addr = addr.to_string();
        self
    }

    /// Sets the empty-room and post-game grace periods.
    pub fn lifecycle(mut self, lifecycle: LifecycleConfig) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Binds both listeners and prepares the server for game `G`.
    ///
    /// Rooms take their capacity from [`GameLogic::room_config`] and
    /// their grace periods from this builder. Uses `JsonCodec` on the
    /// event channel.
    pub async fn build<G: GameLogic>(
        self,
    ) -> Result<ParlorServer<G, JsonCodec>, ParlorError> {
        let transport = WebSocketTransport::bind(&self.ws_addr).await?;
        let http = TcpListener::bind(&self.http_addr).await?;
        tracing::info!(addr = %self.http_addr, "HTTP API listening");

        let config = G::room_config().with_lifecycle(self.lifecycle);
        let broadcaster =
            EventBroadcaster::new(RoomRegistry::new(config), SessionIndex::new());

        Ok(ParlorServer {
            transport,
            http,
            broadcaster,
            codec: JsonCodec,
        })
    }
}

impl Default for ParlorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Parlor server.
///
/// Call [`run()`](Self::run) to start serving.
pub struct ParlorServer<G: GameLogic, C: Codec> {
    transport: WebSocketTransport,
    http: TcpListener,
    broadcaster: EventBroadcaster<G>,
    codec: C,
}

impl<G, C> ParlorServer<G, C>
where
    G: GameLogic,
    C: Codec + Clone,
{
    /// Returns the address the WebSocket listener is bound to.
    pub fn ws_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the address the HTTP listener is bound to.
    pub fn http_addr(&self) -> std::io::Result<SocketAddr> {
        self.http.local_addr()
    }

    /// The registry shared by the HTTP API and the event channel.
    pub fn rooms(&self) -> &RoomRegistry<G> {
        self.broadcaster.rooms()
    }

    /// Runs the server.
    ///
    /// Serves the HTTP API on its own task, then accepts WebSocket
    /// connections and spawns a handler task for each. Runs until the
    /// process is terminated.
    pub async fn run(self) -> Result<(), ParlorError> {
        let Self {
            mut transport,
            http: listener,
            broadcaster,
            codec,
        } = self;

        let app = http::router(broadcaster.rooms().clone());
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "HTTP server stopped");
            }
        });

        tracing::info!("Parlor server running");

        loop {
            match transport.accept().await {
                Ok(conn) => {
                    tokio::spawn(handle_connection::<G, C>(
                        conn,
                        broadcaster.clone(),
                        codec.clone(),
                    ));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
