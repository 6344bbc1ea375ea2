//! Channel subscription bookkeeping.

use crate::gateway::ConnectionId;
use parking_lot::RwLock;
use plenum_protocol::Channel;
use std::collections::{HashMap, HashSet};

/// Which connections are subscribed to which channels.
///
/// The registry mirrors the gateway's own subscription state so the relay
/// can answer "who is listening" without a gateway round-trip. Connections
/// are removed from every channel at once when they close; the gateway
/// never reports per-channel unsubscribes.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    channels: RwLock<HashMap<Channel, HashSet<ConnectionId>>>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a subscription.
    pub fn add(&self, channel: &Channel, connection: ConnectionId) {
        self.channels
            .write()
            .entry(channel.clone())
            .or_default()
            .insert(connection);
    }

    /// Drops a connection from every channel.
    pub fn remove_connection(&self, connection: ConnectionId) {
        let mut channels = self.channels.write();
        for subscribers in channels.values_mut() {
            subscribers.remove(&connection);
        }
        channels.retain(|_, subscribers| !subscribers.is_empty());
    }

    /// True if the connection currently subscribes to the channel.
    #[must_use]
    pub fn is_subscribed(&self, channel: &Channel, connection: ConnectionId) -> bool {
        self.channels
            .read()
            .get(channel)
            .is_some_and(|subscribers| subscribers.contains(&connection))
    }

    /// Number of connections subscribed to a channel.
    #[must_use]
    pub fn subscriber_count(&self, channel: &Channel) -> usize {
        self.channels
            .read()
            .get(channel)
            .map_or(0, HashSet::len)
    }

    /// Number of distinct subscribed connections across all channels.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        let channels = self.channels.read();
        let mut distinct = HashSet::new();
        for subscribers in channels.values() {
            distinct.extend(subscribers.iter().copied());
        }
        distinct.len()
    }
}
