//! HTTP binding of the bro relay: publish and long-poll endpoints on axum.

use log::*;
use relay::Manager;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

pub use service::AppState;

mod controller;
pub mod error;
mod router;

pub use error::{Error, Result};
pub use router::define_routes;

/// Bind the configured address and serve until a shutdown signal arrives.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let listen_address = app_state.config.listen_address();
    let listener = TcpListener::bind(&listen_address).await?;

    info!("Server starting... listening for connections on http://{listen_address}");

    serve(listener, app_state).await
}

/// Serve the relay on an already bound listener.
pub async fn serve(listener: TcpListener, app_state: AppState) -> std::io::Result<()> {
    let relay_manager = Arc::clone(&app_state.relay_manager);
    let router = define_routes(app_state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(relay_manager))
        .await?;

    info!("Server stopped");

    Ok(())
}

// Open poll streams never finish on their own, so the relay is shut down
// before axum waits for in-flight responses.
async fn shutdown_signal(relay_manager: Arc<Manager>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    relay_manager.shutdown();
}
