//! Transport gateway seams.
//!
//! The gateway is the component that terminates long-lived client
//! connections and exposes them to the relay as a receive loop plus a
//! publish/subscribe primitive. Its framing is out of scope here; these
//! traits are the whole surface the relay sees.

use parking_lot::Mutex;
use plenum_protocol::Channel;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Identifier the gateway assigns to one physical connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Creates a fresh connection id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

/// Failure reported by the gateway when a publish cannot be delivered.
#[derive(Debug, Error)]
#[error("publish to {channel} failed: {reason}")]
pub struct PublishError {
    /// Channel the payload was bound for.
    pub channel: Channel,
    /// Gateway-provided reason.
    pub reason: String,
}

impl PublishError {
    /// Creates a publish error.
    #[must_use]
    pub fn new(channel: Channel, reason: impl Into<String>) -> Self {
        Self {
            channel,
            reason: reason.into(),
        }
    }
}

/// One client connection as the gateway exposes it to the relay.
///
/// `can_recv`/`recv` form a blocking-iterator pair over the inbound frames
/// the gateway has buffered for this delivery. `recv` returning `None` is
/// the close signal: the peer is gone and no further frames will arrive.
pub trait GatewayConnection: Send {
    /// The gateway's id for this connection.
    fn id(&self) -> ConnectionId;

    /// True exactly once, when the connection is being established and has
    /// not yet been accepted.
    fn is_opening(&self) -> bool;

    /// Accepts an opening connection.
    fn accept(&mut self);

    /// Subscribes this connection to a broadcast channel.
    fn subscribe(&mut self, channel: &Channel);

    /// Drops every channel subscription this connection holds.
    fn unsubscribe_all(&mut self);

    /// Asks the gateway to emit keep-alive control signals at `interval`
    /// for as long as the connection stays open.
    fn send_keep_alive(&mut self, interval: Duration);

    /// True while buffered inbound frames remain.
    fn can_recv(&self) -> bool;

    /// Takes the next inbound frame. `None` signals the peer closed.
    fn recv(&mut self) -> Option<String>;

    /// Closes the connection from the relay side.
    fn close(&mut self);
}

/// Channel-scoped fan-out, the other half of the gateway.
///
/// Publishing delivers the payload to every connection currently
/// subscribed to the channel, at least once each. The relay treats a
/// failure as fatal for the current batch only.
pub trait FanoutPublisher: Send + Sync {
    /// Publishes one payload to one channel.
    fn publish(&self, channel: &Channel, payload: &str) -> Result<(), PublishError>;
}

/// In-memory [`GatewayConnection`] for tests.
///
/// Frames queue up before the relay runs; a queued close marker makes
/// `recv` return `None` at that point in the stream.
#[derive(Debug)]
pub struct MockConnection {
    id: ConnectionId,
    opening: bool,
    inbound: VecDeque<Option<String>>,
    /// True once the relay accepted the connection.
    pub accepted: bool,
    /// True once the relay closed the connection.
    pub closed: bool,
    /// Channels the relay subscribed, in order.
    pub subscriptions: Vec<Channel>,
    /// True once the relay dropped all subscriptions.
    pub unsubscribed_all: bool,
    /// Keep-alive interval the relay requested, if any.
    pub keep_alive: Option<Duration>,
}

impl MockConnection {
    /// A connection in its opening handshake.
    #[must_use]
    pub fn opening() -> Self {
        Self {
            id: ConnectionId::new(),
            opening: true,
            inbound: VecDeque::new(),
            accepted: false,
            closed: false,
            subscriptions: Vec::new(),
            unsubscribed_all: false,
            keep_alive: None,
        }
    }

    /// An already-established connection.
    #[must_use]
    pub fn established() -> Self {
        Self {
            opening: false,
            ..Self::opening()
        }
    }

    /// Queues an inbound frame.
    pub fn queue_frame(&mut self, payload: impl Into<String>) {
        self.inbound.push_back(Some(payload.into()));
    }

    /// Queues the peer-closed signal.
    pub fn queue_close(&mut self) {
        self.inbound.push_back(None);
    }
}

impl GatewayConnection for MockConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn is_opening(&self) -> bool {
        self.opening
    }

    fn accept(&mut self) {
        self.accepted = true;
        self.opening = false;
    }

    fn subscribe(&mut self, channel: &Channel) {
        self.subscriptions.push(channel.clone());
    }

    fn unsubscribe_all(&mut self) {
        self.subscriptions.clear();
        self.unsubscribed_all = true;
    }

    fn send_keep_alive(&mut self, interval: Duration) {
        self.keep_alive = Some(interval);
    }

    fn can_recv(&self) -> bool {
        !self.inbound.is_empty()
    }

    fn recv(&mut self) -> Option<String> {
        self.inbound.pop_front().flatten()
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// In-memory [`FanoutPublisher`] for tests. Records every publish and can
/// be told to start failing.
#[derive(Debug, Default)]
pub struct MockPublisher {
    published: Mutex<Vec<(Channel, String)>>,
    failing: Mutex<bool>,
}

impl MockPublisher {
    /// Creates a recording publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, in order.
    #[must_use]
    pub fn published(&self) -> Vec<(Channel, String)> {
        self.published.lock().clone()
    }

    /// Makes subsequent publishes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }
}

impl FanoutPublisher for MockPublisher {
    fn publish(&self, channel: &Channel, payload: &str) -> Result<(), PublishError> {
        if *self.failing.lock() {
            return Err(PublishError::new(channel.clone(), "mock failure"));
        }
        self.published
            .lock()
            .push((channel.clone(), payload.to_owned()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plenum_protocol::RoomId;

    #[test]
    fn mock_connection_drains_then_idles() {
        let mut conn = MockConnection::established();
        conn.queue_frame("one");
        conn.queue_frame("two");
        assert!(conn.can_recv());
        assert_eq!(conn.recv().as_deref(), Some("one"));
        assert_eq!(conn.recv().as_deref(), Some("two"));
        assert!(!conn.can_recv());
    }

    #[test]
    fn queued_close_reads_as_none() {
        let mut conn = MockConnection::established();
        conn.queue_frame("last words");
        conn.queue_close();
        assert_eq!(conn.recv().as_deref(), Some("last words"));
        assert!(conn.can_recv());
        assert_eq!(conn.recv(), None);
    }

    #[test]
    fn accept_ends_the_opening_state() {
        let mut conn = MockConnection::opening();
        assert!(conn.is_opening());
        conn.accept();
        assert!(!conn.is_opening());
        assert!(conn.accepted);
    }

    #[test]
    fn failing_publisher_reports_the_channel() {
        let publisher = MockPublisher::new();
        let channel = Channel::for_room(&RoomId::new("foo"));
        publisher.publish(&channel, "{}").unwrap();
        publisher.set_failing(true);
        let err = publisher.publish(&channel, "{}").unwrap_err();
        assert_eq!(err.channel, channel);
        assert_eq!(publisher.published().len(), 1);
    }
}
