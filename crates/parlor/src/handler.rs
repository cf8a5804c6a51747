//! Per-connection handler: decode inbound frames, write outbound events.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`], plus a writer task that drains the connection's
//! outbox. Room actors push events into the outbox; only the writer
//! touches the socket's send half.

use std::sync::Arc;

use parlor_protocol::{ClientEvent, Codec, ConnectionId, ServerEvent};
use parlor_room::GameLogic;
use parlor_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::broadcaster::EventBroadcaster;

/// Drop guard that removes the connection from its room when the
/// handler exits, whether the socket closed cleanly or the task panicked.
///
/// `Drop` is synchronous, so the leave runs on a fire-and-forget task.
struct DisconnectGuard<G: GameLogic> {
    conn_id: ConnectionId,
    broadcaster: EventBroadcaster<G>,
}

impl<G: GameLogic> Drop for DisconnectGuard<G> {
    fn drop(&mut self) {
        // No runtime means the process is shutting down and the rooms
        // are going away with it.
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let conn_id = self.conn_id;
        let broadcaster = self.broadcaster.clone();
        runtime.spawn(async move {
            broadcaster.disconnect(conn_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<G, C>(
    conn: WebSocketConnection,
    broadcaster: EventBroadcaster<G>,
    codec: C,
) where
    G: GameLogic,
    C: Codec + Clone,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (outbox, inbox) = mpsc::unbounded_channel();
    tokio::spawn(write_events::<G, C>(
        Arc::clone(&conn),
        inbox,
        codec.clone(),
    ));

    let _guard = DisconnectGuard {
        conn_id,
        broadcaster: broadcaster.clone(),
    };

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode event");
                let _ = outbox.send(ServerEvent::error(e.to_string()));
                continue;
            }
        };

        broadcaster.dispatch(conn_id, &outbox, event).await;
    }

    // _guard drops here → leave fires. The writer stops once the room
    // has dropped its copy of the outbox.
}

/// Encodes and sends every event queued for one connection, in order.
async fn write_events<G, C>(
    conn: Arc<WebSocketConnection>,
    mut inbox: mpsc::UnboundedReceiver<ServerEvent<G::State>>,
    codec: C,
) where
    G: GameLogic,
    C: Codec,
{
    let conn_id = conn.id();
    while let Some(event) = inbox.recv().await {
        let bytes = match codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%conn_id, error = %e, "failed to encode event");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed, stopping writer");
            break;
        }
    }
}
