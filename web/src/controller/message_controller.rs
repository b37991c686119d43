use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::{AppState, Error};
use events::DomainEvent;
use log::*;
use relay::error::Error as RelayError;
use relay::Message;

/// POST publish a message to every other open poll session
#[utoipa::path(
    post,
    path = "/v1/bro",
    request_body = relay::Message,
    responses(
        (status = 200, description = "Message dispatched to every other open poll session"),
        (status = 400, description = "Request body unreadable or not a valid message"),
        (status = 405, description = "Method not allowed")
    )
)]
pub async fn publish(
    State(app_state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, Error> {
    let body = body.map_err(|rejection| {
        warn!("Error reading request body: {rejection}");
        RelayError::decode(rejection)
    })?;

    let message = Message::from_slice(&body).map_err(|e| {
        warn!("{e}");
        e
    })?;

    debug!("Publishing message from {}", message.from);

    let delivery = app_state.relay_manager.broadcast(&message);

    // Side effects run in the background; the publisher only sees the acknowledgement
    app_state
        .event_publisher
        .publish_detached(DomainEvent::MessagePublished {
            from: message.from,
            text: message.text,
            angry: message.angry,
            delivered: delivery.delivered,
        });

    Ok(StatusCode::OK)
}
