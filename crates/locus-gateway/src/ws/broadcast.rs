use locus_protocol::{frames::EventFrame, payload::Payload};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::ws::registry::{OutboundFrame, SubscriberRegistry};

/// Outcome of one fan-out. Informational only; never an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Subscribers listed at call time, i.e. delivery attempts made.
    pub attempted: usize,
    /// Frames accepted into a subscriber's outbound queue.
    pub delivered: usize,
}

/// Fan-out events to every registered subscriber, plain WS or Socket.IO.
///
/// Each frame is serialized once and queued per subscriber with `try_send`,
/// so a broadcast never waits on a slow socket. A closed or full queue only
/// costs that subscriber the frame.
pub struct EventBroadcaster {
    registry: Arc<SubscriberRegistry>,
}

impl EventBroadcaster {
    pub fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self { registry }
    }

    /// Relay an ingress payload as a `locus_data` event.
    pub fn broadcast(&self, payload: Payload) -> BroadcastReport {
        self.emit(EventFrame::locus_data(Value::Object(payload)))
    }

    /// Push an event frame to all subscribers listed right now.
    pub fn emit(&self, frame: EventFrame) -> BroadcastReport {
        let subscribers = self.registry.list();
        if subscribers.is_empty() {
            debug!(event = %frame.event, "no subscribers, nothing to relay");
            return BroadcastReport::default();
        }

        let outbound = match OutboundFrame::new(frame) {
            Ok(out) => Arc::new(out),
            Err(e) => {
                warn!(error = %e, "event serialization failed");
                return BroadcastReport::default();
            }
        };
        let event = &outbound.frame.event;

        let mut report = BroadcastReport {
            attempted: subscribers.len(),
            delivered: 0,
        };
        for (conn_id, handle) in subscribers {
            match handle.try_send(Arc::clone(&outbound)) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(conn_id = %conn_id, %event, "subscriber queue full, frame dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(conn_id = %conn_id, %event, "subscriber already closed, skipped");
                }
            }
        }

        debug!(
            %event,
            attempted = report.attempted,
            delivered = report.delivered,
            "broadcast dispatched"
        );
        report
    }
}
