//! Protocol messages exchanged between client and server

use super::serialize::{decode_message, encode_message};
use crate::error::Result;
use crate::ops::TextOperation;
use crate::ClientID;

/// One application-level message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Client to server handshake announcing identity
    Connected { client_id: ClientID },

    /// Server to client snapshot of the whole document, sent once on connect
    InitDocument { text: String },

    /// Insert or delete, in either direction
    Operation(TextOperation),
}

impl Message {
    pub fn connected(client_id: impl Into<ClientID>) -> Self {
        Message::Connected {
            client_id: client_id.into(),
        }
    }

    pub fn init_document(text: impl Into<String>) -> Self {
        Message::InitDocument { text: text.into() }
    }

    /// Parse a wire string
    pub fn parse(message: &str) -> Result<Self> {
        decode_message(message)
    }

    /// Render as a wire string
    pub fn encode(&self) -> String {
        encode_message(self)
    }

    /// Client id in the second colon field, if the message carries one
    ///
    /// A client receiving an operation whose origin is its own id treats it
    /// as the acknowledgment of an operation it sent.
    pub fn origin(&self) -> Option<&str> {
        match self {
            Message::Connected { client_id } => Some(client_id),
            Message::InitDocument { .. } => None,
            Message::Operation(op) => Some(op.client_id()),
        }
    }
}

impl From<TextOperation> for Message {
    fn from(op: TextOperation) -> Self {
        Message::Operation(op)
    }
}
