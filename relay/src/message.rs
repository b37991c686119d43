use crate::error::Error;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The unit exchanged between clients.
///
/// On the wire the payload travels as `message`; fields missing from an
/// inbound body take their zero value and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Message {
    /// Identifier of the sender. The sender's own session never receives it.
    pub from: String,
    #[serde(rename = "message")]
    pub text: String,
    pub angry: bool,
}

impl Message {
    pub fn new(from: impl Into<String>, text: impl Into<String>, angry: bool) -> Self {
        Self {
            from: from.into(),
            text: text.into(),
            angry,
        }
    }

    /// Decode a message from a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(body).map_err(Error::decode)
    }

    /// Encode the message as a single newline-terminated JSON frame, the unit
    /// written to a poll stream per delivery.
    pub fn to_frame(&self) -> Result<Bytes, Error> {
        let mut frame = serde_json::to_vec(self).map_err(Error::stream)?;
        frame.push(b'\n');
        Ok(Bytes::from(frame))
    }
}
