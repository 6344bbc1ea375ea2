//! # Plenum Relay
//!
//! Broadcast relay bridging client connections to room channels.
//!
//! This crate provides:
//! - The [`Relay`] facade: one `handle_connection` call per gateway
//!   delivery
//! - Gateway seams ([`GatewayConnection`], [`FanoutPublisher`]) with mock
//!   implementations for tests
//! - Per-command handling: store mutation, auxiliary user lookup, fact
//!   emission
//! - Channel subscription bookkeeping and keep-alive scheduling
//!
//! ## Architecture
//!
//! The relay owns no entity state. Each inbound command is applied to the
//! store, turned into an authoritative fact, and queued; the queue flushes
//! to the room's broadcast channel once the inbound batch drains. One
//! receive loop exists per connection and processes that connection's
//! commands strictly in order.
//!
//! ## Key Invariants
//!
//! - A malformed frame is skipped, never fatal to the connection
//! - Store misses during command handling are logged and swallowed; the
//!   command simply produces no fact
//! - Queued facts flush after the drain, at most once per batch; a publish
//!   failure abandons the rest of that batch
//! - The answer handler writes text, author and timestamp as one store
//!   call, so no fact ever reports a half-answered question

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod gateway;
mod handler;
mod relay;
mod subscriptions;

pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
pub use gateway::{
    ConnectionId, FanoutPublisher, GatewayConnection, MockConnection, MockPublisher, PublishError,
};
pub use handler::{CommandHandler, RelayContext};
pub use relay::Relay;
pub use subscriptions::SubscriptionRegistry;
