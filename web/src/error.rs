use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::*;

use relay::error::{Error as RelayError, RelayErrorKind};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(RelayError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{}", self.0)
    }
}

// Every failure is reported to the one request it came from
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = self.0.to_string();

        match self.0.error_kind {
            RelayErrorKind::Decode => (StatusCode::BAD_REQUEST, message).into_response(),
            RelayErrorKind::Conflict(_) => (StatusCode::CONFLICT, message).into_response(),
            RelayErrorKind::Stream => {
                error!("{message}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<RelayError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_maps_to_409() {
        let response = Error::from(RelayError::conflict("1")).into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn decode_maps_to_400() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad body");
        let response = Error::from(RelayError::decode(source)).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn stream_maps_to_500() {
        let source = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let response = Error::from(RelayError::stream(source)).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
