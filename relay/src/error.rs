//! Error types for the relay.
use std::error::Error as StdError;
use std::fmt;

/// Errors raised while registering sessions, decoding published messages or
/// writing deliveries to a poll stream. Each one is local to the single
/// request or connection it originated from.
#[derive(Debug)]
pub struct Error {
    // Underlying error, when there is one (serde_json, transport, ...)
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    // Enum representing which category of error
    pub error_kind: RelayErrorKind,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RelayErrorKind {
    // A live session already holds this id
    Conflict(String),
    // Request body was unreadable or did not decode into a Message
    Decode,
    // A delivery could not be encoded or written to its stream
    Stream,
}

impl Error {
    pub fn conflict(id: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: RelayErrorKind::Conflict(id.into()),
        }
    }

    pub fn decode(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Error {
            source: Some(source.into()),
            error_kind: RelayErrorKind::Decode,
        }
    }

    pub fn stream(source: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Error {
            source: Some(source.into()),
            error_kind: RelayErrorKind::Stream,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            RelayErrorKind::Conflict(id) => write!(f, "Session id {id} already taken"),
            RelayErrorKind::Decode => match &self.source {
                Some(source) => write!(f, "Error decoding request body: {source}"),
                None => write!(f, "Error decoding request body"),
            },
            RelayErrorKind::Stream => match &self.source {
                Some(source) => write!(f, "Error writing to poll stream: {source}"),
                None => write!(f, "Error writing to poll stream"),
            },
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
