//! Relay facade and the per-connection receive loop.

use crate::config::RelayConfig;
use crate::error::RelayResult;
use crate::gateway::{FanoutPublisher, GatewayConnection};
use crate::handler::{CommandHandler, RelayContext};
use plenum_protocol::{Channel, Command, Fact, RoomId};
use plenum_store::Store;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// The broadcast relay.
///
/// Holds no entity state of its own; all state lives in the store behind
/// [`RelayContext`]. The gateway invokes [`Relay::handle_connection`] once
/// per inbound delivery for a connection, and the relay drains that
/// delivery, applies each command, and fans the resulting facts out on the
/// room's channel.
pub struct Relay {
    handler: CommandHandler,
    context: Arc<RelayContext>,
    publisher: Arc<dyn FanoutPublisher>,
}

impl Relay {
    /// Creates a relay over `store`, publishing through `publisher`.
    #[must_use]
    pub fn new(
        config: RelayConfig,
        store: Arc<dyn Store>,
        publisher: Arc<dyn FanoutPublisher>,
    ) -> Self {
        let context = Arc::new(RelayContext::new(config, store));
        Self {
            handler: CommandHandler::new(Arc::clone(&context)),
            context,
            publisher,
        }
    }

    /// Shared relay state, for wiring sessions to the same store.
    #[must_use]
    pub fn context(&self) -> &Arc<RelayContext> {
        &self.context
    }

    /// Number of connections subscribed to `room_id`'s channel.
    #[must_use]
    pub fn subscriber_count(&self, room_id: &RoomId) -> usize {
        self.context
            .subscriptions
            .subscriber_count(&Channel::for_room(room_id))
    }

    /// Number of distinct live connections across all channels.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.context.subscriptions.connection_count()
    }

    /// Runs the receive loop for one delivery on `conn`, scoped to
    /// `room_id`'s channel.
    ///
    /// An opening connection is accepted, subscribed and scheduled for
    /// keep-alives first. Each buffered frame is then decoded and applied:
    /// malformed frames and store misses are logged and skipped, never
    /// fatal. Facts queue up during the drain and flush to the channel
    /// afterwards, so a connection's own commands are applied strictly in
    /// arrival order before anything it caused is broadcast.
    ///
    /// # Errors
    ///
    /// Returns an error only when the gateway rejects a publish; the
    /// remainder of that batch is abandoned. Everything already published
    /// stays published.
    pub fn handle_connection(
        &self,
        conn: &mut dyn GatewayConnection,
        room_id: &RoomId,
    ) -> RelayResult<()> {
        let channel = Channel::for_room(room_id);

        if conn.is_opening() {
            conn.accept();
            conn.subscribe(&channel);
            self.context.subscriptions.add(&channel, conn.id());
            conn.send_keep_alive(self.context.config.keep_alive_interval);
            info!(connection = %conn.id(), %channel, "connection joined");
        }

        let mut outbound: Vec<Fact> = Vec::new();
        let mut decode_failures: u32 = 0;

        while conn.can_recv() {
            let Some(frame) = conn.recv() else {
                self.drop_connection(conn);
                break;
            };

            let command = match Command::decode(&frame) {
                Ok(command) => command,
                Err(err) => {
                    debug!(connection = %conn.id(), %err, "dropping malformed frame");
                    decode_failures += 1;
                    if let Some(max) = self.context.config.max_decode_failures {
                        if decode_failures >= max {
                            warn!(
                                connection = %conn.id(),
                                failures = decode_failures,
                                "too many malformed frames, closing"
                            );
                            self.drop_connection(conn);
                            break;
                        }
                    }
                    continue;
                }
            };

            match self.handler.handle(command) {
                Ok(fact) => outbound.push(fact),
                Err(err) if err.is_swallowed() => {
                    warn!(connection = %conn.id(), %err, "command rejected");
                }
                Err(err) => return Err(err),
            }
        }

        // Facts are already committed to the store, so they go out even if
        // the originating connection closed mid-batch.
        for fact in outbound {
            let payload = match fact.encode() {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(%channel, %err, "dropping unencodable fact");
                    continue;
                }
            };
            if let Err(err) = self.publisher.publish(&channel, &payload) {
                error!(%channel, %err, "publish failed, abandoning batch");
                return Err(err.into());
            }
            debug!(%channel, kind = fact.kind(), "fact published");
        }

        Ok(())
    }

    fn drop_connection(&self, conn: &mut dyn GatewayConnection) {
        conn.close();
        conn.unsubscribe_all();
        self.context.subscriptions.remove_connection(conn.id());
        info!(connection = %conn.id(), "connection left");
    }
}
