use async_stream::try_stream;
use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{header, HeaderName};
use axum::response::IntoResponse;
use futures::Stream;

use crate::{AppState, Error};
use log::*;
use relay::error::Error as RelayError;
use relay::Session;

static X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

/// GET open a long-lived stream of the messages other clients publish.
/// The stream stays open across deliveries until the client disconnects.
#[utoipa::path(
    get,
    path = "/v1/poll/{id}",
    params(
        ("id" = String, Path, description = "Client-chosen session id, unique among open polls")
    ),
    responses(
        (status = 200, description = "Newline-delimited stream of messages, one JSON record per delivery", body = relay::Message, content_type = "application/json"),
        (status = 409, description = "Session id already in use"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn poll(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("Opening poll stream for session {id}");

    let session = app_state.relay_manager.register_session(id)?;

    let headers = [
        (header::CONTENT_TYPE, "application/json"),
        (header::CACHE_CONTROL, "no-cache"),
        (X_ACCEL_BUFFERING.clone(), "no"),
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    ];

    Ok((headers, Body::from_stream(delivery_stream(session))))
}

/// One frame per delivered message. Ends when the session is unregistered or
/// the relay shuts down; if the peer goes away first, hyper drops the stream
/// and the session with it.
fn delivery_stream(mut session: Session) -> impl Stream<Item = Result<Bytes, RelayError>> {
    try_stream! {
        while let Some(message) = session.next_message().await {
            trace!(
                "Delivering message from {} to session {}",
                message.from,
                session.id()
            );
            yield message.to_frame()?;
        }

        debug!("Poll stream for session {} finished", session.id());
    }
}
