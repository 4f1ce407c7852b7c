//! Pipeline event bus
//!
//! The orchestrator publishes coarse progress events so the presentation
//! layer can react (refresh the ledger panel, show a toast) without the
//! core knowing anything about rendering.

use ahash::AHashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Event trait that all pipeline events implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event subscribers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Events published by the question pipeline
pub mod events {
    use super::Event;

    /// A dataset was loaded and profiled successfully
    #[derive(Debug, Clone)]
    pub struct DatasetLoaded {
        pub source_name: String,
        pub row_count: usize,
        pub column_count: usize,
    }

    /// A question ran the full pipeline and produced an answer
    #[derive(Debug, Clone)]
    pub struct QuestionAnswered {
        pub question: String,
        pub result_rows: usize,
        pub chart_rendered: bool,
    }

    /// A question stopped before producing an answer
    #[derive(Debug, Clone)]
    pub struct QuestionFailed {
        pub question: String,
        pub reason: String,
    }

    /// A ledger entry was written to durable storage
    #[derive(Debug, Clone)]
    pub struct EntryPersisted {
        pub record_id: String,
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

    impl_event!(DatasetLoaded, QuestionAnswered, QuestionFailed, EntryPersisted);
}

/// Session-wide event bus, keyed by event type
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Publish an event to all subscribers of its type
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    struct ClosureHandler<F>(F);

    impl<F> EventHandler for ClosureHandler<F>
    where
        F: FnMut(&dyn Event) + Send + Sync,
    {
        fn handle(&mut self, event: &dyn Event) {
            (self.0)(event);
        }
    }

    Box::new(ClosureHandler(f))
}

#[cfg(test)]
mod tests {
    use super::events::QuestionAnswered;
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_reaches_subscriber() {
        static SEEN: AtomicUsize = AtomicUsize::new(0);

        let bus = EventBus::new();
        bus.subscribe::<QuestionAnswered>(handler_from_fn(|event: &dyn Event| {
            if event.as_any().downcast_ref::<QuestionAnswered>().is_some() {
                SEEN.fetch_add(1, Ordering::SeqCst);
            }
        }));

        bus.publish(QuestionAnswered {
            question: "avg income".into(),
            result_rows: 1,
            chart_rendered: true,
        });

        assert_eq!(SEEN.load(Ordering::SeqCst), 1);
    }
}
