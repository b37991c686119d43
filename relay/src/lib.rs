//! Session registry and long-poll delivery engine for the bro relay.
//!
//! Clients open a poll connection under an identifier of their choosing and
//! keep it open; any client may publish a message, which is fanned out to
//! every other currently registered session.
//!
//! # Architecture
//!
//! - **One session per id**: registering an id that is already live fails
//!   with a conflict and never disturbs the existing session.
//! - **Bounded conduits**: each session owns a bounded channel (one slot by
//!   default). Publishers deposit with `try_send`, so a slow or stalled
//!   consumer misses messages instead of delaying the publisher or anyone
//!   else.
//! - **Sender exclusion**: a message is never delivered to the session whose
//!   id matches its `from` field.
//! - **Cleanup on drop**: a `Session` unregisters itself when dropped, so the
//!   id is freed whichever way the connection ends.
//!
//! # Message Flow
//!
//! 1. A poll request calls `Manager::register_session(id)` and receives a
//!    `Session`.
//! 2. The poll task loops on `Session::next_message()`, writing each message
//!    to its stream as a newline-terminated JSON frame.
//! 3. A publish request decodes a `Message` and calls `Manager::broadcast`.
//! 4. When the peer disconnects the stream (and its `Session`) is dropped and
//!    the id becomes available again.
//!
//! # Modules
//!
//! - `connection`: SessionRegistry, Session and the per-connection ConnectionId
//! - `manager`: logging front for the registry used by the web layer
//! - `message`: the Message wire type
//! - `error`: relay error taxonomy

pub mod connection;
pub mod error;
pub mod manager;
pub mod message;

pub use connection::{Delivery, Session};
pub use manager::Manager;
pub use message::Message;
