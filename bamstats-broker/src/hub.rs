//! Publish/subscribe fan-out of broker events.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde_json::Value;

type Handler = Arc<dyn Fn(&Value) + Send + Sync>;
type Observer = Arc<dyn Fn(&str, &Value) + Send + Sync>;

#[derive(Default)]
struct HubInner {
    next_id: u64,
    handlers: HashMap<String, Vec<(u64, Handler)>>,
    observers: Vec<(u64, Observer)>,
    last: HashMap<String, Value>,
}

impl HubInner {
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

///
/// Named event channels with replay of the last value.
///
/// Subscribers receive an immutable `Value` for each publication. A subscriber that
/// joins after an event was published is called once right away with the latest value.
/// Handlers run on the publishing task and must not block.
///
/// Deliveries, replays included, are serialized, so every handler sees the values of
/// an event in publication order. Handlers may read the hub with [`EventHub::last`]
/// but must not publish or subscribe from inside a delivery.
///
#[derive(Clone, Default)]
pub struct EventHub {
    inner: Arc<Mutex<HubInner>>,
    delivery: Arc<Mutex<()>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Register `handler` for `event`. The handler stays registered until the
    /// returned [`Subscription`] is dropped or unsubscribed.
    ///
    pub fn subscribe<F>(&self, event: &str, handler: F) -> Subscription
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        let _delivery = lock(&self.delivery);
        let (id, replay) = {
            let mut inner = lock(&self.inner);
            let id = inner.next_id();
            inner
                .handlers
                .entry(event.to_string())
                .or_default()
                .push((id, Arc::clone(&handler)));
            (id, inner.last.get(event).cloned())
        };

        if let Some(value) = replay {
            handler(&value);
        }

        Subscription {
            hub: Arc::downgrade(&self.inner),
            event: Some(event.to_string()),
            id,
        }
    }

    ///
    /// Register `observer` for every event, including metric names not known in
    /// advance. Latest values already published are replayed in name order.
    ///
    pub fn subscribe_all<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        let observer: Observer = Arc::new(observer);
        let _delivery = lock(&self.delivery);
        let (id, mut replay) = {
            let mut inner = lock(&self.inner);
            let id = inner.next_id();
            inner.observers.push((id, Arc::clone(&observer)));
            let replay: Vec<(String, Value)> = inner
                .last
                .iter()
                .map(|(event, value)| (event.clone(), value.clone()))
                .collect();
            (id, replay)
        };

        replay.sort_by(|a, b| a.0.cmp(&b.0));
        for (event, value) in &replay {
            observer(event, value);
        }

        Subscription {
            hub: Arc::downgrade(&self.inner),
            event: None,
            id,
        }
    }

    /// Record `value` as the latest for `event` and hand it to every subscriber.
    pub fn publish(&self, event: &str, value: Value) {
        let _delivery = lock(&self.delivery);
        let (handlers, observers): (Vec<Handler>, Vec<Observer>) = {
            let mut inner = lock(&self.inner);
            inner.last.insert(event.to_string(), value.clone());
            let handlers = inner
                .handlers
                .get(event)
                .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default();
            let observers = inner.observers.iter().map(|(_, o)| Arc::clone(o)).collect();
            (handlers, observers)
        };

        for handler in handlers {
            handler(&value);
        }
        for observer in observers {
            observer(event, &value);
        }
    }

    /// Latest value published under `event`.
    pub fn last(&self, event: &str) -> Option<Value> {
        lock(&self.inner).last.get(event).cloned()
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        lock(&self.inner)
            .handlers
            .get(event)
            .map_or(0, |list| list.len())
    }
}

/// Handle of one registered handler. Dropping it unsubscribes.
pub struct Subscription {
    hub: Weak<Mutex<HubInner>>,
    /// `None` for a [`EventHub::subscribe_all`] observer.
    event: Option<String>,
    id: u64,
}

impl Subscription {
    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    pub fn unsubscribe(self) {
        // removal happens in drop
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            let mut inner = lock(&inner);
            match &self.event {
                Some(event) => {
                    if let Some(list) = inner.handlers.get_mut(event) {
                        list.retain(|(id, _)| *id != self.id);
                    }
                }
                None => inner.observers.retain(|(id, _)| *id != self.id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};

    use pretty_assertions::assert_eq;
    use rstest::*;
    use serde_json::json;

    fn recorder() -> (Arc<Mutex<Vec<Value>>>, impl Fn(&Value) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |value: &Value| sink.lock().unwrap().push(value.clone()))
    }

    #[rstest]
    fn test_publish_reaches_subscribers() {
        let hub = EventHub::new();
        let (seen, handler) = recorder();
        let _subscription = hub.subscribe("total_reads", handler);

        hub.publish("total_reads", json!(1));
        hub.publish("mapped_reads", json!(5));
        hub.publish("total_reads", json!(2));

        assert_eq!(*seen.lock().unwrap(), vec![json!(1), json!(2)]);
    }

    #[rstest]
    fn test_late_subscriber_gets_replay() {
        let hub = EventHub::new();
        hub.publish("header", json!(["chr1"]));
        hub.publish("header", json!(["chr1", "chr2"]));

        let (seen, handler) = recorder();
        let _subscription = hub.subscribe("header", handler);

        assert_eq!(*seen.lock().unwrap(), vec![json!(["chr1", "chr2"])]);
    }

    #[rstest]
    fn test_drop_unsubscribes() {
        let hub = EventHub::new();
        let (seen, handler) = recorder();
        let subscription = hub.subscribe("error", handler);
        assert_eq!(hub.subscriber_count("error"), 1);

        subscription.unsubscribe();
        hub.publish("error", json!("boom"));

        assert_eq!(hub.subscriber_count("error"), 0);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(hub.last("error"), Some(json!("boom")));
    }

    #[rstest]
    fn test_replay_never_follows_newer_value() {
        let hub = EventHub::new();
        hub.publish("counter", json!(0));

        let writer_hub = hub.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let writer_stop = Arc::clone(&stop);
        let writer = std::thread::spawn(move || {
            let mut counter = 1u64;
            while !writer_stop.load(Ordering::SeqCst) {
                writer_hub.publish("counter", json!(counter));
                counter += 1;
            }
        });

        for _ in 0..5_000 {
            let (seen, handler) = recorder();
            let subscription = hub.subscribe("counter", handler);
            std::thread::yield_now();
            drop(subscription);

            let seen: Vec<u64> = seen.lock().unwrap().iter().filter_map(Value::as_u64).collect();
            assert!(!seen.is_empty());
            assert!(
                seen.windows(2).all(|pair| pair[0] < pair[1]),
                "values out of order: {:?}",
                seen
            );
        }

        stop.store(true, Ordering::SeqCst);
        writer.join().unwrap();
    }

    #[rstest]
    fn test_subscribe_all_sees_every_event() {
        let hub = EventHub::new();
        hub.publish("read-depth", json!({}));
        hub.publish("header", json!([]));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = hub.subscribe_all(move |event, value| {
            sink.lock().unwrap().push((event.to_string(), value.clone()))
        });
        hub.publish("total_reads", json!(7));
        assert_eq!(subscription.event(), None);
        drop(subscription);
        hub.publish("total_reads", json!(8));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ("header".to_string(), json!([])),
                ("read-depth".to_string(), json!({})),
                ("total_reads".to_string(), json!(7)),
            ]
        );
    }
}
