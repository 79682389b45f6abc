//! Socket.IO transport at `/socket.io/` for dashboards built on
//! `socket.io-client` (`socket.on("locus_data", ...)`).
//!
//! Each socket on the default namespace becomes an ordinary registry
//! subscriber: a forwarder task drains its queue and emits every frame as a
//! Socket.IO event. Engine.IO handles its own ping/pong, so there is no
//! heartbeat here.

use socketioxide::{extract::SocketRef, layer::SocketIoLayer, SocketIo};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::ws::registry::SubscriberId;

/// Build the tower layer serving Socket.IO, wired to the shared registry.
pub fn layer(state: &Arc<AppState>) -> SocketIoLayer {
    let (layer, io) = SocketIo::new_layer();
    let state = Arc::clone(state);
    io.ns("/", move |socket: SocketRef| on_connect(socket, Arc::clone(&state)));
    layer
}

fn on_connect(socket: SocketRef, state: Arc<AppState>) {
    let conn_id = SubscriberId::new();
    let (handle, mut outbound) = mpsc::channel(state.config.relay.subscriber_buffer);

    if let Err(e) = state.registry.add(conn_id.clone(), handle) {
        warn!(conn_id = %conn_id, sid = %socket.id, error = %e, "subscriber registration failed");
        return;
    }
    info!(
        conn_id = %conn_id,
        sid = %socket.id,
        subscribers = state.registry.len(),
        "socket.io subscriber connected"
    );

    let registry = Arc::clone(&state.registry);
    let gone_id = conn_id.clone();
    socket.on_disconnect(move |socket: SocketRef| {
        registry.remove(&gone_id);
        info!(
            conn_id = %gone_id,
            sid = %socket.id,
            subscribers = registry.len(),
            "socket.io subscriber disconnected"
        );
    });

    // Ends once the registry drops the handle on disconnect.
    tokio::spawn(async move {
        while let Some(out) = outbound.recv().await {
            if let Err(e) = socket.emit(out.frame.event.as_str(), &out.frame.data) {
                debug!(conn_id = %conn_id, error = ?e, "socket.io emit failed");
            }
        }
    });
}
