//! Change notifications published by the explorer session

use ahash::AHashMap;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

impl dyn Event {
    /// Downcast to a concrete event type
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref::<E>()
    }
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Session events
pub mod events {
    use super::Event;

    /// The query state was replaced
    #[derive(Debug, Clone)]
    pub struct QueryStateChanged {
        pub split_count: usize,
        pub series_count: usize,
        pub filter_clause_count: usize,
    }

    /// The selected visualization changed
    #[derive(Debug, Clone)]
    pub struct VisualizationChanged {
        pub from: String,
        pub to: String,
    }

    /// An automatic adjustment was applied to the query state
    #[derive(Debug, Clone)]
    pub struct AdjustmentApplied {
        pub visualization: String,
        pub description: String,
    }

    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(QueryStateChanged, VisualizationChanged, AdjustmentApplied);
}

type SharedHandler = Arc<Mutex<Box<dyn EventHandler>>>;

/// Type-keyed publish/subscribe bus
///
/// Handlers run after the registry lock is released, so a handler may
/// subscribe or publish on the same bus. A handler must not publish the event
/// type it is handling: it would wait on its own lock.
#[derive(Clone, Default)]
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<TypeId, Vec<SharedHandler>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events of type `E`
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        self.handlers
            .lock()
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Arc::new(Mutex::new(handler)));
    }

    /// Publish an event; returns how many handlers saw it
    ///
    /// Handlers subscribed while the event is being dispatched see only
    /// later events.
    pub fn publish<E: Event>(&self, event: E) -> usize {
        let subscribed: Vec<SharedHandler> = self
            .handlers
            .lock()
            .get(&TypeId::of::<E>())
            .cloned()
            .unwrap_or_default();

        for handler in &subscribed {
            handler.lock().handle(&event);
        }
        subscribed.len()
    }
}

struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

#[cfg(test)]
mod tests {
    use super::events::{QueryStateChanged, VisualizationChanged};
    use super::*;

    #[test]
    fn test_publish_reaches_typed_subscribers() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe::<VisualizationChanged>(handler_from_fn(move |event| {
            if let Some(changed) = event.downcast_ref::<VisualizationChanged>() {
                sink.lock().push(changed.to.clone());
            }
        }));

        let notified = bus.publish(VisualizationChanged {
            from: "totals".to_string(),
            to: "table".to_string(),
        });
        assert_eq!(notified, 1);
        assert_eq!(
            bus.publish(QueryStateChanged { split_count: 0, series_count: 1, filter_clause_count: 0 }),
            0
        );
        assert_eq!(*seen.lock(), vec!["table".to_string()]);
    }

    #[test]
    fn test_handlers_may_use_the_bus() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner_bus = bus.clone();
        let sink = seen.clone();
        bus.subscribe::<QueryStateChanged>(handler_from_fn(move |_| {
            let sink = sink.clone();
            inner_bus.subscribe::<VisualizationChanged>(handler_from_fn(move |event| {
                if let Some(changed) = event.downcast_ref::<VisualizationChanged>() {
                    sink.lock().push(changed.to.clone());
                }
            }));
            inner_bus.publish(VisualizationChanged {
                from: "table".to_string(),
                to: "heatmap".to_string(),
            });
        }));

        let notified = bus.publish(QueryStateChanged { split_count: 1, series_count: 1, filter_clause_count: 0 });
        assert_eq!(notified, 1);
        assert_eq!(*seen.lock(), vec!["heatmap".to_string()]);
    }
}
