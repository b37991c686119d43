//! Event system infrastructure for the bro relay.
//!
//! Publishing a message is fire-and-forget from the publisher's point of
//! view. Anything that should happen as a side effect of a publish (such as
//! persisting the message) subscribes here instead of sitting on the request
//! path.
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing the events raised by the relay
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on internal crates, so the message fields
//! are carried as plain values.

use async_trait::async_trait;
use log::*;
use serde::Serialize;
use std::sync::Arc;

/// Events raised by the relay after an operation completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Emitted once a published message has been fanned out.
    MessagePublished {
        /// Sender identifier, the `from` field of the message.
        from: String,
        /// Message payload text.
        text: String,
        angry: bool,
        /// Number of sessions whose conduit accepted the message.
        delivered: usize,
    },
}

/// Trait for handling domain events.
/// Implementations perform side effects like persisting or logging and must
/// not report failures back to the publisher.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to all registered handlers.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }

    /// Publish on a background task so the caller never waits on handlers.
    /// Must be called from within a tokio runtime.
    pub fn publish_detached(&self, event: DomainEvent) {
        if self.handlers.is_empty() {
            return;
        }

        let publisher = self.clone();
        tokio::spawn(async move {
            trace!("Dispatching {:?} to {} handler(s)", event, publisher.handler_count());
            publisher.publish(event).await;
        });
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
