use axum::{
    body::Bytes,
    extract::{ws::Message, ws::WebSocket, State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc,
    time::{Instant, Interval},
};
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::ws::registry::SubscriberId;

/// Heartbeat intervals a peer may stay silent before it is treated as dead.
const MISSED_PONGS_LIMIT: u32 = 2;

/// Axum handler — upgrades HTTP to WebSocket at GET /ws.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| run_connection(socket, state))
}

/// Per-connection event loop — lives for the entire WS session.
///
/// The subscriber is registered before the loop starts and removed as soon
/// as the loop exits, whatever the reason.
async fn run_connection(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = SubscriberId::new();
    let (handle, mut outbound) = mpsc::channel(state.config.relay.subscriber_buffer);

    if let Err(e) = state.registry.add(conn_id.clone(), handle) {
        warn!(conn_id = %conn_id, error = %e, "subscriber registration failed");
        return;
    }
    info!(conn_id = %conn_id, subscribers = state.registry.len(), "subscriber connected");

    let (mut tx, mut rx) = socket.split();
    let mut heartbeat = Heartbeat::new(state.config.relay.heartbeat_interval_secs);

    loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else { break };
                if tx.send(Message::Text(frame.text.as_str().into())).await.is_err() {
                    debug!(conn_id = %conn_id, "socket write failed");
                    break;
                }
            }

            msg = rx.next() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if tx.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => heartbeat.pong(),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(conn_id = %conn_id, error = %e, "socket read failed");
                        break;
                    }
                    // client → server events are not part of the relay contract
                    Some(Ok(_)) => {}
                }
            }

            _ = heartbeat.tick() => {
                if heartbeat.peer_silent() {
                    warn!(conn_id = %conn_id, "no pong from subscriber, closing");
                    break;
                }
                if tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    debug!(conn_id = %conn_id, "heartbeat ping failed");
                    break;
                }
            }
        }
    }

    state.registry.remove(&conn_id);
    info!(conn_id = %conn_id, subscribers = state.registry.len(), "subscriber disconnected");
}

/// Ping cadence plus pong bookkeeping. Disabled when the interval is 0.
struct Heartbeat {
    interval: Option<Interval>,
    period: Duration,
    last_pong: Instant,
}

impl Heartbeat {
    fn new(secs: u64) -> Self {
        let period = Duration::from_secs(secs);
        let interval = (secs > 0).then(|| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval
        });
        Self {
            interval,
            period,
            last_pong: Instant::now(),
        }
    }

    async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(i) => {
                i.tick().await;
            }
            None => std::future::pending().await,
        }
    }

    fn pong(&mut self) {
        self.last_pong = Instant::now();
    }

    /// True once the peer has missed `MISSED_PONGS_LIMIT` pings in a row.
    fn peer_silent(&self) -> bool {
        self.last_pong.elapsed() > self.period * MISSED_PONGS_LIMIT
    }
}
