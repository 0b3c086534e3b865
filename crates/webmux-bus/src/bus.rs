//! Channel-validated bus
//!
//! One generic implementation constructed per direction, each over its own
//! allow-list. Handlers run outside the subscriber lock, so a handler may
//! subscribe or send on the same bus. Delivery is in registration order and
//! goes to the subscribers present when `send` was called.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::channel::{INBOUND_CHANNELS, OUTBOUND_CHANNELS};
use crate::message::OutboundMessage;

/// Handlers may return a reply value; `send` ignores replies, `request`
/// returns the first one.
type Handler = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Audit cap; the trail is diagnostics, not durable history.
const MAX_DECISIONS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrafficVerdict {
    /// Message admitted and handed to this many handlers.
    Delivered { handlers: usize },
    /// `send` on a channel outside the allow-list.
    DroppedSend,
    /// `subscribe` on a channel outside the allow-list.
    RefusedSubscribe,
}

#[derive(Debug, Clone)]
pub struct TrafficDecision {
    pub channel: String,
    pub verdict: TrafficVerdict,
    pub at: DateTime<Utc>,
}

struct Entry {
    token: u64,
    handler: Handler,
}

struct BusInner {
    label: &'static str,
    allowed: &'static [&'static str],
    subscribers: RwLock<HashMap<String, Vec<Entry>>>,
    next_token: AtomicU64,
    decisions: Mutex<VecDeque<TrafficDecision>>,
}

impl BusInner {
    fn record(&self, channel: &str, verdict: TrafficVerdict) {
        let mut decisions = self.decisions.lock();
        if decisions.len() >= MAX_DECISIONS {
            decisions.pop_front();
        }
        decisions.push_back(TrafficDecision {
            channel: channel.to_string(),
            verdict,
            at: Utc::now(),
        });
    }

    fn remove(&self, channel: &str, token: u64) {
        let mut subscribers = self.subscribers.write();
        if let Some(entries) = subscribers.get_mut(channel) {
            entries.retain(|e| e.token != token);
            if entries.is_empty() {
                subscribers.remove(channel);
            }
        }
    }
}

pub struct MessageBus {
    inner: Arc<BusInner>,
}

impl MessageBus {
    /// Bus carrying session/UI traffic toward the orchestrator.
    pub fn inbound() -> Self {
        Self::with_allow_list("inbound", INBOUND_CHANNELS)
    }

    /// Bus carrying orchestrator signals toward the shell UI.
    pub fn outbound() -> Self {
        Self::with_allow_list("outbound", OUTBOUND_CHANNELS)
    }

    pub fn with_allow_list(label: &'static str, allowed: &'static [&'static str]) -> Self {
        Self {
            inner: Arc::new(BusInner {
                label,
                allowed,
                subscribers: RwLock::new(HashMap::new()),
                next_token: AtomicU64::new(1),
                decisions: Mutex::new(VecDeque::new()),
            }),
        }
    }

    fn is_allowed(&self, channel: &str) -> bool {
        self.inner.allowed.contains(&channel)
    }

    /// Deliver `payload` to the channel's subscribers in registration order.
    /// Unknown channels are dropped, logged and recorded; no handler runs.
    /// Returns the number of handlers invoked.
    pub fn send(&self, channel: &str, payload: &Value) -> usize {
        if !self.is_allowed(channel) {
            tracing::warn!(
                bus = self.inner.label,
                channel = %channel,
                "Dropped message on channel outside the allow-list"
            );
            self.inner.record(channel, TrafficVerdict::DroppedSend);
            return 0;
        }

        let handlers = self.snapshot(channel);
        self.inner.record(
            channel,
            TrafficVerdict::Delivered {
                handlers: handlers.len(),
            },
        );

        for handler in &handlers {
            handler(payload);
        }

        handlers.len()
    }

    /// Typed convenience over `send` for orchestrator signals.
    pub fn send_message(&self, message: &OutboundMessage) -> usize {
        self.send(message.channel().as_str(), &message.payload())
    }

    /// Validated like `send`, but returns the first subscriber reply.
    /// Serves request/response channels such as `get-enabled-services`.
    pub fn request(&self, channel: &str, payload: &Value) -> Option<Value> {
        if !self.is_allowed(channel) {
            tracing::warn!(
                bus = self.inner.label,
                channel = %channel,
                "Dropped request on channel outside the allow-list"
            );
            self.inner.record(channel, TrafficVerdict::DroppedSend);
            return None;
        }

        let handlers = self.snapshot(channel);
        self.inner.record(
            channel,
            TrafficVerdict::Delivered {
                handlers: handlers.len(),
            },
        );

        handlers.iter().find_map(|handler| handler(payload))
    }

    /// Register a handler. Unknown channels refuse registration and return
    /// an inert subscription, so callers can tear down unconditionally.
    pub fn subscribe<F>(&self, channel: &str, handler: F) -> Subscription
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        if !self.is_allowed(channel) {
            tracing::warn!(
                bus = self.inner.label,
                channel = %channel,
                "Refused subscription on channel outside the allow-list"
            );
            self.inner.record(channel, TrafficVerdict::RefusedSubscribe);
            return Subscription::inert();
        }

        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        self.inner
            .subscribers
            .write()
            .entry(channel.to_string())
            .or_default()
            .push(Entry {
                token,
                handler: Arc::new(handler),
            });

        Subscription {
            bus: Arc::downgrade(&self.inner),
            channel: channel.to_string(),
            token: Some(token),
        }
    }

    /// The recent traffic decisions, oldest first.
    pub fn recent_decisions(&self) -> Vec<TrafficDecision> {
        self.inner.decisions.lock().iter().cloned().collect()
    }

    fn snapshot(&self, channel: &str) -> Vec<Handler> {
        self.inner
            .subscribers
            .read()
            .get(channel)
            .map(|entries| entries.iter().map(|e| Arc::clone(&e.handler)).collect())
            .unwrap_or_default()
    }
}

impl Clone for MessageBus {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Scoped registration: dropping (or consuming via `unsubscribe`) removes
/// the handler, so teardown never leaks subscribers.
pub struct Subscription {
    bus: Weak<BusInner>,
    channel: String,
    token: Option<u64>,
}

impl Subscription {
    fn inert() -> Self {
        Self {
            bus: Weak::new(),
            channel: String::new(),
            token: None,
        }
    }

    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let (Some(token), Some(bus)) = (self.token.take(), self.bus.upgrade()) {
            bus.remove(&self.channel, token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_delivery_in_registration_order() {
        let bus = MessageBus::inbound();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_a = Arc::clone(&seen);
        let _a = bus.subscribe("switch-tab", move |_| {
            seen_a.lock().push("a");
            None
        });
        let seen_b = Arc::clone(&seen);
        let _b = bus.subscribe("switch-tab", move |_| {
            seen_b.lock().push("b");
            None
        });

        let delivered = bus.send("switch-tab", &json!({"tabId": "mail"}));
        assert_eq!(delivered, 2);
        assert_eq!(*seen.lock(), vec!["a", "b"]);
    }

    #[test]
    fn test_send_unknown_channel_invokes_nothing() {
        let bus = MessageBus::outbound();
        let seen = Arc::new(Mutex::new(0usize));

        let seen_handler = Arc::clone(&seen);
        let _sub = bus.subscribe("set-active-tab", move |_| {
            *seen_handler.lock() += 1;
            None
        });

        let delivered = bus.send("evil-channel", &json!({"x": 1}));
        assert_eq!(delivered, 0);
        assert_eq!(*seen.lock(), 0);

        let last = bus.recent_decisions().pop().unwrap();
        assert_eq!(last.channel, "evil-channel");
        assert_eq!(last.verdict, TrafficVerdict::DroppedSend);
    }

    #[test]
    fn test_subscribe_unknown_channel_is_inert() {
        let bus = MessageBus::inbound();

        let sub = bus.subscribe("evil-channel", |_| None);
        // Safe to tear down even though nothing was registered.
        sub.unsubscribe();

        assert_eq!(bus.send("evil-channel", &json!({})), 0);
        let decisions = bus.recent_decisions();
        assert_eq!(decisions[0].verdict, TrafficVerdict::RefusedSubscribe);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = MessageBus::inbound();
        let seen = Arc::new(Mutex::new(0usize));

        let seen_handler = Arc::clone(&seen);
        let sub = bus.subscribe("update-badge", move |_| {
            *seen_handler.lock() += 1;
            None
        });

        bus.send("update-badge", &json!({"source": "mail", "count": 1}));
        drop(sub);
        bus.send("update-badge", &json!({"source": "mail", "count": 2}));

        assert_eq!(*seen.lock(), 1);
    }

    #[test]
    fn test_request_returns_first_reply() {
        let bus = MessageBus::inbound();

        let _quiet = bus.subscribe("get-enabled-services", |_| None);
        let _replier = bus.subscribe("get-enabled-services", |_| Some(json!({"mail": true})));

        let reply = bus.request("get-enabled-services", &json!({}));
        assert_eq!(reply, Some(json!({"mail": true})));

        assert!(bus.request("evil-channel", &json!({})).is_none());
    }

    #[test]
    fn test_handler_may_reenter_bus() {
        let bus = MessageBus::inbound();
        let inner = bus.clone();
        let seen = Arc::new(Mutex::new(0usize));

        let seen_handler = Arc::clone(&seen);
        let _sub = bus.subscribe("show-context-menu", move |_| {
            // Subscribing from inside a handler must not deadlock.
            let _nested = inner.subscribe("switch-tab", |_| None);
            *seen_handler.lock() += 1;
            None
        });

        bus.send("show-context-menu", &json!({}));
        assert_eq!(*seen.lock(), 1);
    }

    #[test]
    fn test_audit_trail_is_bounded() {
        let bus = MessageBus::inbound();
        for _ in 0..(MAX_DECISIONS + 10) {
            bus.send("show-context-menu", &json!({}));
        }
        assert_eq!(bus.recent_decisions().len(), MAX_DECISIONS);
    }
}
