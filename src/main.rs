use domain::MessageRecorder;
use events::EventPublisher;
use log::*;
use migration::{Migrator, MigratorTrait};
use relay::Manager;
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!("Starting up bro relay...");

    let relay_manager = Arc::new(Manager::with_buffer_depth(config.session_buffer_depth()));
    info!(
        "Poll sessions buffer up to {} undelivered message(s)",
        config.session_buffer_depth()
    );

    let event_publisher = match config.database_url() {
        Some(database_url) => {
            let db = match service::init_database(&config, database_url).await {
                Ok(db) => Arc::new(db),
                Err(e) => {
                    error!("Failed to establish database connection: {e}");
                    std::process::exit(1);
                }
            };

            if let Err(e) = Migrator::up(db.as_ref(), None).await {
                error!("Failed to apply database migrations: {e}");
                std::process::exit(1);
            }

            info!("Persisting published messages");
            EventPublisher::new().with_handler(Arc::new(MessageRecorder::new(db)))
        }
        None => {
            info!("No database configured, published messages are not persisted");
            EventPublisher::new()
        }
    };

    let app_state = AppState::new(config, &relay_manager, event_publisher);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server error: {e}");
        std::process::exit(1);
    }
}
