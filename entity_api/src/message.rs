use super::error::Error;
use entity::messages::{ActiveModel, Model};
use entity::Id;
use sea_orm::{entity::prelude::*, ActiveValue::Set, DatabaseConnection};

use log::*;

/// Insert a published message. The id and timestamp are assigned here.
pub async fn create(db: &DatabaseConnection, message_model: Model) -> Result<Model, Error> {
    debug!("New Message Model to be inserted: {:?}", message_model);

    let now = chrono::Utc::now();

    let message_active_model: ActiveModel = ActiveModel {
        id: Set(Id::new_v4()),
        sender: Set(message_model.sender),
        text: Set(message_model.text),
        angry: Set(message_model.angry),
        created_at: Set(now.into()),
    };

    Ok(message_active_model.insert(db).await?)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn message_model(sender: &str, text: &str, angry: bool) -> Model {
        let now = chrono::Utc::now();

        Model {
            id: Id::new_v4(),
            sender: sender.to_owned(),
            text: text.to_owned(),
            angry,
            created_at: now.into(),
        }
    }

    #[tokio::test]
    async fn create_returns_the_inserted_message() -> Result<(), Error> {
        let message = message_model("3", "wut!?", true);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![message.clone()]])
            .into_connection();

        let created = create(&db, message.clone()).await?;

        assert_eq!(created.sender, "3");
        assert_eq!(created.text, "wut!?");
        assert!(created.angry);

        Ok(())
    }

    #[tokio::test]
    async fn create_surfaces_database_failures() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors(vec![DbErr::Custom("connection reset".to_string())])
            .into_connection();

        let err = create(&db, message_model("3", "wut!?", true))
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, EntityApiErrorKind::SystemError);
    }
}
