//! Transport seam between a session and the room's broadcast channel.
//!
//! A [`RoomChannel`] is one subscription to one room's fan-out channel:
//! commands go out through `send`, facts come back through `try_recv`.
//! The [`ChannelFactory`] opens them, one per join attempt. Framing and
//! the network itself live behind these traits.

use crate::error::{SessionError, SessionResult};
use parking_lot::Mutex;
use plenum_protocol::RoomId;
use std::collections::VecDeque;
use std::sync::Arc;

/// An open (or opening) subscription to a room channel.
pub trait RoomChannel: Send {
    /// True once the subscription is established and frames can flow.
    fn is_open(&self) -> bool;

    /// Sends one encoded command frame.
    fn send(&mut self, payload: &str) -> SessionResult<()>;

    /// Takes the next buffered inbound fact frame, if any.
    fn try_recv(&mut self) -> Option<String>;

    /// Closes the subscription. Further sends fail.
    fn close(&mut self);
}

/// Opens room channels. One factory serves every join a session makes.
pub trait ChannelFactory: Send {
    /// Opens a fresh subscription to `room_id`'s channel.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Channel`] when the transport cannot even
    /// start the subscription; an open-but-not-yet-established channel is
    /// returned as `Ok` and polled via [`RoomChannel::is_open`].
    fn open_channel(&self, room_id: &RoomId) -> SessionResult<Box<dyn RoomChannel>>;
}

impl<F: ChannelFactory + Sync> ChannelFactory for Arc<F> {
    fn open_channel(&self, room_id: &RoomId) -> SessionResult<Box<dyn RoomChannel>> {
        (**self).open_channel(room_id)
    }
}

#[derive(Debug, Default)]
struct ChannelState {
    open: Mutex<bool>,
    inbound: Mutex<VecDeque<String>>,
    sent: Mutex<Vec<String>>,
}

/// Remote control for a [`MockChannel`] after it moved into a session.
#[derive(Debug, Clone)]
pub struct MockChannelHandle {
    state: Arc<ChannelState>,
}

impl MockChannelHandle {
    /// Opens or drops the channel from the far side.
    pub fn set_open(&self, open: bool) {
        *self.state.open.lock() = open;
    }

    /// Whether the channel currently reports open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.state.open.lock()
    }

    /// Queues an inbound frame, as if the relay had published it.
    pub fn push_fact(&self, payload: impl Into<String>) {
        self.state.inbound.lock().push_back(payload.into());
    }

    /// Every frame the session sent, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<String> {
        self.state.sent.lock().clone()
    }
}

/// In-memory [`RoomChannel`] for tests, driven through a
/// [`MockChannelHandle`].
#[derive(Debug)]
pub struct MockChannel {
    state: Arc<ChannelState>,
}

impl RoomChannel for MockChannel {
    fn is_open(&self) -> bool {
        *self.state.open.lock()
    }

    fn send(&mut self, payload: &str) -> SessionResult<()> {
        if !self.is_open() {
            return Err(SessionError::Channel("channel is closed".into()));
        }
        self.state.sent.lock().push(payload.to_owned());
        Ok(())
    }

    fn try_recv(&mut self) -> Option<String> {
        self.state.inbound.lock().pop_front()
    }

    fn close(&mut self) {
        *self.state.open.lock() = false;
    }
}

/// In-memory [`ChannelFactory`] for tests.
///
/// By default every opened channel starts established; call
/// [`MockFactory::connect_on_open`] with `false` to hand out channels that
/// stay closed until a handle opens them.
#[derive(Debug, Default)]
pub struct MockFactory {
    handles: Mutex<Vec<MockChannelHandle>>,
    connect_on_open: Mutex<bool>,
}

impl MockFactory {
    /// Creates a factory whose channels open immediately.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handles: Mutex::new(Vec::new()),
            connect_on_open: Mutex::new(true),
        }
    }

    /// Controls whether newly opened channels start established.
    pub fn connect_on_open(&self, connect: bool) {
        *self.connect_on_open.lock() = connect;
    }

    /// Handle for the most recently opened channel.
    #[must_use]
    pub fn last_handle(&self) -> Option<MockChannelHandle> {
        self.handles.lock().last().cloned()
    }

    /// How many channels have been opened so far.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.handles.lock().len()
    }
}

impl ChannelFactory for MockFactory {
    fn open_channel(&self, _room_id: &RoomId) -> SessionResult<Box<dyn RoomChannel>> {
        let state = Arc::new(ChannelState {
            open: Mutex::new(*self.connect_on_open.lock()),
            inbound: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
        });
        self.handles.lock().push(MockChannelHandle {
            state: Arc::clone(&state),
        });
        Ok(Box::new(MockChannel { state }))
    }
}
