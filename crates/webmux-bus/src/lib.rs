//! webmux message bus
//!
//! The sole trust boundary between orchestrator-privileged code and code
//! reachable by third-party page content. Every message crossing in either
//! direction is checked against a fixed allow-list of channel names before
//! any handler runs; traffic on unknown channels is dropped and logged,
//! never delivered. Payloads are parsed into closed unions at this boundary
//! so shape errors are caught structurally, not per-field in each handler.

mod bus;
mod channel;
mod message;

pub use bus::{MessageBus, Subscription, TrafficDecision, TrafficVerdict};
pub use channel::{InboundChannel, OutboundChannel, INBOUND_CHANNELS, OUTBOUND_CHANNELS};
pub use message::{InboundMessage, MessageError, OutboundMessage};
