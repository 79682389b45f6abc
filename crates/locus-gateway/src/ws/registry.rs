//! Subscriber registry — the set of live real-time connections.
//!
//! Plain WS sessions (`ws::connection`) and Socket.IO sockets
//! (`ws::socketio`) share one registry. Only their connection lifecycles
//! mutate it: `add` on connect, `remove` on disconnect. Broadcasts read it
//! through [`SubscriberRegistry::list`], which copies handles out so no map
//! shard lock is held while frames are queued.

use dashmap::{mapref::entry::Entry, DashMap};
use locus_core::{LocusError, Result};
use locus_protocol::frames::EventFrame;
use std::{fmt, sync::Arc};
use tokio::sync::mpsc;

/// One event as queued to subscribers. `text` is the plain-WS wire form,
/// rendered once per broadcast; Socket.IO sockets emit `frame` directly.
#[derive(Debug)]
pub struct OutboundFrame {
    pub frame: EventFrame,
    pub text: String,
}

impl OutboundFrame {
    pub fn new(frame: EventFrame) -> Result<Self> {
        let text = frame.to_text()?;
        Ok(Self { frame, text })
    }
}

/// Outbound queue feeding one connection's socket writer.
pub type SubscriberHandle = mpsc::Sender<Arc<OutboundFrame>>;

/// Server-generated connection id, unique for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberId(String);

impl SubscriberId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Active subscribers: conn_id -> outbound queue.
pub struct SubscriberRegistry {
    subscribers: DashMap<SubscriberId, SubscriberHandle>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
        }
    }

    /// Register a subscriber. Fails without touching the existing entry if
    /// the id is already present.
    pub fn add(&self, id: SubscriberId, handle: SubscriberHandle) -> Result<()> {
        match self.subscribers.entry(id) {
            Entry::Occupied(entry) => Err(LocusError::DuplicateSubscriber {
                id: entry.key().to_string(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(handle);
                Ok(())
            }
        }
    }

    /// Deregister a subscriber. Returns false if it was already gone.
    pub fn remove(&self, id: &SubscriberId) -> bool {
        self.subscribers.remove(id).is_some()
    }

    /// Point-in-time copy of every registered handle.
    pub fn list(&self) -> Vec<(SubscriberId, SubscriberHandle)> {
        self.subscribers
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}
