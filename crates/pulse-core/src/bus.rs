use crate::types::{Pulse, Resonance};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// Domain events fanned out after each successful ledger operation.
///
/// The serde layout matches the wire shape consumers expect:
/// `{"type": "new_pulse", "data": {...}}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum PulseEvent {
    UserJoined { id: String, name: String },
    NewPulse(Pulse),
    Resonance { resonance: Resonance, pulse: Pulse },
}

impl PulseEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PulseEvent::UserJoined { .. } => "user_joined",
            PulseEvent::NewPulse(_) => "new_pulse",
            PulseEvent::Resonance { .. } => "resonance",
        }
    }
}

/// Reported by a sink whose consumer is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkClosed;

/// Push-notification endpoint registered with the bus.
///
/// `notify` must not block: the bus invokes sinks inside the ledger's
/// critical section, and the triggering operation does not return to its
/// caller until every sink has been invoked.
pub trait EventSink: Send {
    fn notify(&self, event: &PulseEvent) -> Result<(), SinkClosed>;
}

/// A dropped receiver unsubscribes its sender on the next publish.
impl EventSink for UnboundedSender<PulseEvent> {
    fn notify(&self, event: &PulseEvent) -> Result<(), SinkClosed> {
        self.send(event.clone()).map_err(|_| SinkClosed)
    }
}

/// Handle returned by `subscribe`, usable for explicit removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Synchronous fan-out publisher.
///
/// Delivery is best-effort and at-most-once per sink per event. Sinks are
/// invoked sequentially in subscription order, so each sink observes events
/// in publish order. A sink that reports failure is removed by the publish
/// that observed it; the remaining sinks are unaffected.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    sinks: Vec<(SubscriptionId, Box<dyn EventSink>)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.sinks.push((id, sink));
        id
    }

    /// Returns false when the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|(sink_id, _)| *sink_id != id);
        self.sinks.len() < before
    }

    pub fn publish(&mut self, event: &PulseEvent) {
        self.sinks.retain(|(_, sink)| sink.notify(event).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.sinks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Mood;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Collector(Arc<Mutex<Vec<String>>>);

    impl Collector {
        fn names(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl EventSink for Collector {
        fn notify(&self, event: &PulseEvent) -> Result<(), SinkClosed> {
            self.0.lock().unwrap().push(event.name().to_string());
            Ok(())
        }
    }

    struct Broken;

    impl EventSink for Broken {
        fn notify(&self, _event: &PulseEvent) -> Result<(), SinkClosed> {
            Err(SinkClosed)
        }
    }

    fn joined() -> PulseEvent {
        PulseEvent::UserJoined {
            id: "u1".to_string(),
            name: "Aria".to_string(),
        }
    }

    #[test]
    fn fan_out_reaches_every_sink_in_publish_order() {
        let mut bus = EventBus::new();
        let a = Collector::default();
        let b = Collector::default();
        bus.subscribe(Box::new(a.clone()));
        bus.subscribe(Box::new(b.clone()));

        bus.publish(&joined());
        bus.publish(&PulseEvent::NewPulse(sample_pulse()));

        assert_eq!(a.names(), ["user_joined", "new_pulse"]);
        assert_eq!(b.names(), ["user_joined", "new_pulse"]);
    }

    #[test]
    fn broken_sink_is_removed_without_disturbing_others() {
        let mut bus = EventBus::new();
        let healthy = Collector::default();
        bus.subscribe(Box::new(Broken));
        bus.subscribe(Box::new(healthy.clone()));
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(&joined());
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(healthy.names(), ["user_joined"]);

        bus.publish(&joined());
        assert_eq!(healthy.names(), ["user_joined", "user_joined"]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let sink = Collector::default();
        let id = bus.subscribe(Box::new(sink.clone()));

        bus.publish(&joined());
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&joined());

        assert_eq!(sink.names(), ["user_joined"]);
    }

    #[test]
    fn dropped_channel_receiver_unsubscribes_sender() {
        let mut bus = EventBus::new();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        bus.subscribe(Box::new(tx));
        assert_eq!(bus.subscriber_count(), 1);

        drop(rx);
        bus.publish(&joined());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn events_serialize_with_type_and_data() {
        let value = serde_json::to_value(joined()).unwrap();
        assert_eq!(value["type"], "user_joined");
        assert_eq!(value["data"]["id"], "u1");

        let value = serde_json::to_value(PulseEvent::NewPulse(sample_pulse())).unwrap();
        assert_eq!(value["type"], "new_pulse");
        assert_eq!(value["data"]["mood"], "joy");
    }

    fn sample_pulse() -> Pulse {
        Pulse {
            id: "pulse_1".to_string(),
            user_id: "u1".to_string(),
            user_name: "Aria".to_string(),
            emoji: "✨".to_string(),
            message: "hello".to_string(),
            mood: Mood::Joy,
            resonance_count: 0,
            resonance_total: 0,
            created_at: Utc::now(),
            x: None,
            y: None,
        }
    }
}
