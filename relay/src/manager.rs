use crate::connection::{Delivery, Session, SessionId, SessionRegistry};
use crate::error::Error;
use crate::message::Message;
use log::*;
use std::sync::Arc;

pub struct Manager {
    registry: Arc<SessionRegistry>,
}

impl Manager {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(SessionRegistry::new()),
        }
    }

    /// Build a manager whose sessions buffer up to `buffer_depth` messages
    pub fn with_buffer_depth(buffer_depth: usize) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::with_buffer_depth(buffer_depth)),
        }
    }

    /// Register a poll session, failing with a conflict if `id` is in use
    pub fn register_session(&self, id: impl Into<SessionId>) -> Result<Session, Error> {
        let id = id.into();

        match self.registry.register(id.clone()) {
            Ok(session) => {
                info!(
                    "Registered poll session {} (connection {})",
                    id,
                    session.connection_id().as_str()
                );
                Ok(session)
            }
            Err(e) => {
                warn!("Rejected poll session {id}: id already in use");
                Err(e)
            }
        }
    }

    /// Unregister a session by id
    pub fn unregister_session(&self, id: &str) {
        if self.registry.unregister(id) {
            info!("Unregistered poll session {id}");
        }
    }

    /// Fan a message out to every session except the sender's own
    pub fn broadcast(&self, message: &Message) -> Delivery {
        let delivery = self.registry.broadcast(message, &message.from);

        debug!(
            "Broadcast from {} delivered to {} session(s), dropped for {}",
            message.from, delivery.delivered, delivery.dropped
        );

        delivery
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    /// End every open poll session, used on server shutdown
    pub fn shutdown(&self) {
        info!(
            "Shutting down relay with {} open poll session(s)",
            self.registry.len()
        );
        self.registry.shutdown();
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
