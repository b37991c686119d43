use crate::error::Error;
use crate::message::Message;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::*;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tokio_util::sync::CancellationToken;

/// Client-chosen identifier of a poll session
pub type SessionId = String;

/// Unique identifier for one poll connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry side of a session: the producer end of its conduit
struct SessionHandle {
    connection_id: ConnectionId,
    sender: Sender<Message>,
}

/// Outcome of a single broadcast
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Sessions whose conduit accepted the message
    pub delivered: usize,
    /// Sessions whose conduit was full or already closed
    pub dropped: usize,
}

/// Registry of live poll sessions, at most one per id.
///
/// Map mutation is serialized by the DashMap shard locks. Deposits into a
/// conduit use `try_send`, so a broadcast only ever holds a shard read lock
/// for the duration of the iteration and never waits on a consumer.
pub struct SessionRegistry {
    sessions: DashMap<SessionId, SessionHandle>,
    buffer_depth: usize,
    shutdown: CancellationToken,
}

impl SessionRegistry {
    /// Single pending message per session
    pub const DEFAULT_BUFFER_DEPTH: usize = 1;

    pub fn new() -> Self {
        Self::with_buffer_depth(Self::DEFAULT_BUFFER_DEPTH)
    }

    /// Conduits hold up to `buffer_depth` undelivered messages (at least one).
    pub fn with_buffer_depth(buffer_depth: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            buffer_depth: buffer_depth.max(1),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn buffer_depth(&self) -> usize {
        self.buffer_depth
    }

    /// Register a new session under `id`.
    ///
    /// The check and the insert happen under the same shard lock; a live
    /// session with the same id is left untouched and a conflict is returned.
    pub fn register(self: &Arc<Self>, id: SessionId) -> Result<Session, Error> {
        match self.sessions.entry(id) {
            Entry::Occupied(entry) => Err(Error::conflict(entry.key().as_str())),
            Entry::Vacant(entry) => {
                let (sender, receiver) = mpsc::channel(self.buffer_depth);
                let connection_id = ConnectionId::new();
                let id = entry.key().clone();

                entry.insert(SessionHandle {
                    connection_id: connection_id.clone(),
                    sender,
                });

                Ok(Session {
                    id,
                    connection_id,
                    receiver,
                    shutdown: self.shutdown.child_token(),
                    registry: Arc::clone(self),
                })
            }
        }
    }

    /// Unregister a session by id. Removing an unknown id is a no-op.
    ///
    /// Returns `true` if a session was removed and `false` if `id` was not
    /// registered; neither case is an error.
    ///
    /// Dropping the registry's sender closes the conduit, which ends the
    /// session's stream once any buffered messages are drained.
    pub fn unregister(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Remove `id` only while it still belongs to `connection_id`.
    fn release(&self, id: &str, connection_id: &ConnectionId) -> bool {
        self.sessions
            .remove_if(id, |_, handle| &handle.connection_id == connection_id)
            .is_some()
    }

    /// Deposit `message` into every session except `exclude_id` without blocking.
    ///
    /// A session whose conduit is full misses this message.
    pub fn broadcast(&self, message: &Message, exclude_id: &str) -> Delivery {
        let mut delivery = Delivery::default();

        for entry in self.sessions.iter() {
            if entry.key().as_str() == exclude_id {
                continue;
            }

            match entry.value().sender.try_send(message.clone()) {
                Ok(()) => delivery.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    debug!(
                        "Session {} has undelivered messages, dropping message from {}",
                        entry.key(),
                        message.from
                    );
                    delivery.dropped += 1;
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(
                        "Session {} (connection {}) is closing, dropping message from {}",
                        entry.key(),
                        entry.value().connection_id.as_str(),
                        message.from
                    );
                    delivery.dropped += 1;
                }
            }
        }

        delivery
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Wake every waiting session and make it finish. Sessions registered
    /// afterwards finish on their first wait.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// One open poll connection, holding the consumer end of its conduit.
///
/// Dropping the session removes it from the registry, whatever the reason the
/// connection ended.
pub struct Session {
    id: SessionId,
    connection_id: ConnectionId,
    receiver: Receiver<Message>,
    shutdown: CancellationToken,
    registry: Arc<SessionRegistry>,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    /// Wait for the next delivered message.
    ///
    /// Returns `None` once the session was unregistered or the registry is
    /// shutting down, whichever is observed first.
    pub async fn next_message(&mut self) -> Option<Message> {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => None,
            message = self.receiver.recv() => message,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("connection_id", &self.connection_id)
            .finish()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.registry.release(&self.id, &self.connection_id) {
            info!(
                "Poll session {} closed (connection {})",
                self.id,
                self.connection_id.as_str()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayErrorKind;
    use std::time::Duration;
    use tokio::time::timeout;

    fn registry() -> Arc<SessionRegistry> {
        Arc::new(SessionRegistry::new())
    }

    fn wut() -> Message {
        Message::new("3", "wut!?", true)
    }

    async fn expect_message(session: &mut Session) -> Message {
        timeout(Duration::from_secs(1), session.next_message())
            .await
            .expect("timed out waiting for a delivery")
            .expect("session ended before a delivery")
    }

    async fn expect_nothing_pending(session: &mut Session) {
        assert!(
            timeout(Duration::from_millis(50), session.next_message())
                .await
                .is_err(),
            "no delivery should be pending"
        );
    }

    #[tokio::test]
    async fn register_rejects_a_live_duplicate_id() {
        let registry = registry();
        let _first = registry.register("1".to_string()).unwrap();

        let err = registry.register("1".to_string()).unwrap_err();

        assert_eq!(err.error_kind, RelayErrorKind::Conflict("1".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn conflict_leaves_the_original_session_intact() {
        let registry = registry();
        let mut first = registry.register("1".to_string()).unwrap();
        registry.broadcast(&wut(), "3");

        assert!(registry.register("1".to_string()).is_err());

        assert!(registry.contains("1"));
        assert_eq!(expect_message(&mut first).await, wut());
    }

    #[tokio::test]
    async fn broadcast_skips_the_sender() {
        let registry = registry();
        let mut one = registry.register("1".to_string()).unwrap();
        let mut two = registry.register("2".to_string()).unwrap();
        let mut three = registry.register("3".to_string()).unwrap();

        let delivery = registry.broadcast(&wut(), "3");

        assert_eq!(
            delivery,
            Delivery {
                delivered: 2,
                dropped: 0
            }
        );
        assert_eq!(expect_message(&mut one).await, wut());
        assert_eq!(expect_message(&mut two).await, wut());
        expect_nothing_pending(&mut three).await;
    }

    #[tokio::test]
    async fn broadcast_with_no_sessions_delivers_nothing() {
        let registry = registry();

        assert_eq!(registry.broadcast(&wut(), "3"), Delivery::default());
    }

    #[tokio::test]
    async fn full_slot_drops_the_newer_message_without_blocking() {
        let registry = registry();
        let mut one = registry.register("1".to_string()).unwrap();

        let first = registry.broadcast(&Message::new("3", "first", false), "3");
        let second = registry.broadcast(&Message::new("3", "second", false), "3");

        assert_eq!(first.delivered, 1);
        assert_eq!(
            second,
            Delivery {
                delivered: 0,
                dropped: 1
            }
        );
        assert_eq!(expect_message(&mut one).await.text, "first");
        expect_nothing_pending(&mut one).await;
    }

    #[tokio::test]
    async fn drained_slot_accepts_the_next_message() {
        let registry = registry();
        let mut one = registry.register("1".to_string()).unwrap();

        registry.broadcast(&Message::new("3", "first", false), "3");
        assert_eq!(expect_message(&mut one).await.text, "first");
        registry.broadcast(&Message::new("3", "second", false), "3");

        assert_eq!(expect_message(&mut one).await.text, "second");
    }

    #[tokio::test]
    async fn deeper_buffer_keeps_messages_in_order_until_full() {
        let registry = Arc::new(SessionRegistry::with_buffer_depth(3));
        let mut one = registry.register("1".to_string()).unwrap();

        let dropped: usize = (0..5)
            .map(|n| registry.broadcast(&Message::new("3", n.to_string(), false), "3"))
            .map(|delivery| delivery.dropped)
            .sum();

        assert_eq!(dropped, 2);
        for expected in ["0", "1", "2"] {
            assert_eq!(expect_message(&mut one).await.text, expected);
        }
        expect_nothing_pending(&mut one).await;
    }

    #[test]
    fn zero_buffer_depth_is_raised_to_one() {
        assert_eq!(SessionRegistry::with_buffer_depth(0).buffer_depth(), 1);
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let registry = registry();
        let _one = registry.register("1".to_string()).unwrap();

        assert!(registry.unregister("1"));
        assert!(!registry.unregister("1"));
        assert!(!registry.unregister("never-registered"));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn unregister_ends_the_waiting_session() {
        let registry = registry();
        let mut one = registry.register("1".to_string()).unwrap();

        registry.unregister("1");

        let next = timeout(Duration::from_secs(1), one.next_message())
            .await
            .unwrap();
        assert_eq!(next, None);
    }

    #[tokio::test]
    async fn dropping_a_session_frees_its_id() {
        let registry = registry();
        let one = registry.register("1".to_string()).unwrap();

        drop(one);

        assert!(!registry.contains("1"));
        assert!(registry.register("1".to_string()).is_ok());
    }

    #[tokio::test]
    async fn stale_session_drop_does_not_evict_a_newer_session() {
        let registry = registry();
        let stale = registry.register("1".to_string()).unwrap();
        registry.unregister("1");
        let fresh = registry.register("1".to_string()).unwrap();
        assert_ne!(stale.connection_id(), fresh.connection_id());

        drop(stale);

        assert!(registry.contains("1"));
        drop(fresh);
        assert!(!registry.contains("1"));
    }

    #[tokio::test]
    async fn shutdown_wakes_idle_sessions() {
        let registry = registry();
        let mut one = registry.register("1".to_string()).unwrap();

        let waiter = tokio::spawn(async move { one.next_message().await });
        tokio::task::yield_now().await;
        registry.shutdown();

        let next = timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next, None);
        assert!(registry.is_empty(), "finished session must be released");
    }

    #[tokio::test]
    async fn concurrent_broadcasts_reach_every_session_once() {
        let registry = Arc::new(SessionRegistry::with_buffer_depth(64));
        let mut sessions: Vec<Session> = (0..8)
            .map(|n| registry.register(format!("poller-{n}")).unwrap())
            .collect();

        let publishers: Vec<_> = (0..16)
            .map(|n| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    registry.broadcast(&Message::new("publisher", n.to_string(), false), "publisher")
                })
            })
            .collect();
        for publisher in publishers {
            assert_eq!(publisher.await.unwrap().delivered, 8);
        }

        for session in sessions.iter_mut() {
            let mut received = Vec::new();
            for _ in 0..16 {
                received.push(expect_message(session).await.text);
            }
            received.sort();
            received.dedup();
            assert_eq!(received.len(), 16);
        }
    }
}
