use crate::error::Error;
use crate::{messages, Id};
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Persists every published message to the database.
///
/// Registered on the `EventPublisher`, so it runs after the publish response
/// has been sent. Failures are logged and never reach the publisher.
pub struct MessageRecorder {
    db: Arc<DatabaseConnection>,
}

impl MessageRecorder {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Store a single message.
    pub async fn record(
        &self,
        from: &str,
        text: &str,
        angry: bool,
    ) -> Result<messages::Model, Error> {
        let message_model = messages::Model {
            id: Id::nil(),
            sender: from.to_owned(),
            text: text.to_owned(),
            angry,
            created_at: chrono::Utc::now().into(),
        };

        Ok(entity_api::message::create(self.db.as_ref(), message_model).await?)
    }
}

#[async_trait]
impl EventHandler for MessageRecorder {
    async fn handle(&self, event: &DomainEvent) {
        match event {
            DomainEvent::MessagePublished {
                from, text, angry, ..
            } => match self.record(from, text, *angry).await {
                Ok(stored) => debug!("Recorded message {} from {}", stored.id, from),
                Err(e) => warn!("Failed to record message from {from}: {e}"),
            },
        }
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    fn stored(from: &str, text: &str, angry: bool) -> messages::Model {
        messages::Model {
            id: Id::new_v4(),
            sender: from.to_owned(),
            text: text.to_owned(),
            angry,
            created_at: chrono::Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn record_inserts_the_message() -> Result<(), Error> {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![stored("3", "wut!?", true)]])
            .into_connection();
        let recorder = MessageRecorder::new(Arc::new(db));

        let message = recorder.record("3", "wut!?", true).await?;

        assert_eq!(message.sender, "3");
        assert_eq!(message.text, "wut!?");
        assert!(message.angry);

        Ok(())
    }

    #[tokio::test]
    async fn handle_swallows_database_failures() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![DbErr::Custom("connection reset".to_string())])
            .into_connection();
        let recorder = MessageRecorder::new(Arc::new(db));

        recorder
            .handle(&DomainEvent::MessagePublished {
                from: "3".to_string(),
                text: "wut!?".to_string(),
                angry: true,
                delivered: 0,
            })
            .await;
    }
}
