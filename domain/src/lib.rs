//! This module re-exports the entity types the rest of the application needs and
//! hosts the domain-level handlers that react to relay events.

pub use entity_api::{messages, Id};

pub mod error;
pub mod message_recorder;

pub use message_recorder::MessageRecorder;
