//! In-process relay hub for end-to-end tests.
//!
//! Wires a real [`Relay`] to client [`RoomChannel`]s without any network:
//! each channel keeps one persistent relay-side connection, a send queues
//! the frame and runs the relay's receive loop for that delivery, and
//! published facts land in the inbox of every channel subscribed to the
//! room.

use parking_lot::Mutex;
use plenum_client::{
    ChannelFactory, MockPrompts, RoomChannel, Session, SessionConfig, SessionError, SessionResult,
    UserDraft,
};
use plenum_protocol::{Channel, RoomId};
use plenum_relay::{FanoutPublisher, MockConnection, PublishError, Relay, RelayConfig};
use plenum_store::Store;
use std::collections::VecDeque;
use std::sync::Arc;

type Inbox = Mutex<VecDeque<String>>;

/// A session whose channels connect through a [`LiveHub`].
pub type HubSession = Session<HubFactory, Arc<MockPrompts>>;

/// Fan-out half of the hub: publishes land in the inbox of every channel
/// subscribed to the target room.
#[derive(Default)]
struct HubFanout {
    inboxes: Mutex<Vec<(Channel, Arc<Inbox>)>>,
}

impl HubFanout {
    fn attach(&self, channel: Channel, inbox: Arc<Inbox>) {
        self.inboxes.lock().push((channel, inbox));
    }

    fn detach(&self, inbox: &Arc<Inbox>) {
        self.inboxes
            .lock()
            .retain(|(_, other)| !Arc::ptr_eq(other, inbox));
    }
}

impl FanoutPublisher for HubFanout {
    fn publish(&self, channel: &Channel, payload: &str) -> Result<(), PublishError> {
        for (subscribed, inbox) in self.inboxes.lock().iter() {
            if subscribed == channel {
                inbox.lock().push_back(payload.to_owned());
            }
        }
        Ok(())
    }
}

/// An in-memory gateway wired straight into a relay.
pub struct LiveHub {
    /// The relay every hub channel talks to. Exposed so tests can assert
    /// on subscription state.
    pub relay: Relay,
    fanout: Arc<HubFanout>,
    generation: Mutex<u64>,
}

impl LiveHub {
    /// Builds a hub whose relay commits to the given store.
    pub fn over(store: Arc<dyn Store>) -> Arc<Self> {
        let fanout = Arc::new(HubFanout::default());
        let relay = Relay::new(
            RelayConfig::default(),
            store,
            Arc::clone(&fanout) as Arc<dyn FanoutPublisher>,
        );
        Arc::new(Self {
            relay,
            fanout,
            generation: Mutex::new(0),
        })
    }

    /// Opens a channel into the given room, running the relay's opening
    /// handshake (accept + subscribe) as a gateway would.
    pub fn connect(self: &Arc<Self>, room_id: &RoomId) -> SessionResult<HubChannel> {
        let mut conn = MockConnection::opening();
        self.relay
            .handle_connection(&mut conn, room_id)
            .map_err(|err| SessionError::Channel(err.to_string()))?;
        let inbox = Arc::new(Inbox::default());
        self.fanout
            .attach(Channel::for_room(room_id), Arc::clone(&inbox));
        Ok(HubChannel {
            hub: Arc::clone(self),
            room_id: room_id.clone(),
            conn,
            inbox,
            generation: *self.generation.lock(),
            open: true,
        })
    }

    /// A channel factory handing out connections through this hub.
    pub fn factory(self: &Arc<Self>) -> HubFactory {
        HubFactory {
            hub: Arc::clone(self),
        }
    }

    /// Builds a session for the given user whose channels connect through
    /// this hub.
    pub fn session(self: &Arc<Self>, store: Arc<dyn Store>, user: UserDraft) -> HubSession {
        let prompts = Arc::new(MockPrompts::new().with_user(user));
        Session::new(SessionConfig::default(), store, self.factory(), prompts)
    }

    /// Simulates the gateway dropping every live connection. Channels
    /// handed out before this call report closed; reopened channels work.
    pub fn sever_all(&self) {
        *self.generation.lock() += 1;
    }
}

/// A single client connection through a [`LiveHub`].
pub struct HubChannel {
    hub: Arc<LiveHub>,
    room_id: RoomId,
    conn: MockConnection,
    inbox: Arc<Inbox>,
    generation: u64,
    open: bool,
}

impl RoomChannel for HubChannel {
    fn is_open(&self) -> bool {
        self.open && self.generation == *self.hub.generation.lock()
    }

    fn send(&mut self, payload: &str) -> SessionResult<()> {
        if !self.is_open() {
            return Err(SessionError::Channel("hub connection severed".to_owned()));
        }
        self.conn.queue_frame(payload);
        self.hub
            .relay
            .handle_connection(&mut self.conn, &self.room_id)
            .map_err(|err| SessionError::Channel(err.to_string()))
    }

    fn try_recv(&mut self) -> Option<String> {
        self.inbox.lock().pop_front()
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        self.conn.queue_close();
        let _ = self
            .hub
            .relay
            .handle_connection(&mut self.conn, &self.room_id);
    }
}

impl Drop for HubChannel {
    fn drop(&mut self) {
        self.hub.fanout.detach(&self.inbox);
    }
}

/// [`ChannelFactory`] opening channels through one shared [`LiveHub`].
pub struct HubFactory {
    hub: Arc<LiveHub>,
}

impl ChannelFactory for HubFactory {
    fn open_channel(&self, room_id: &RoomId) -> SessionResult<Box<dyn RoomChannel>> {
        Ok(Box::new(self.hub.connect(room_id)?))
    }
}
