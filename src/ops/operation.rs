//! Operation values: Insert, Delete, CursorMove
//!
//! `Operation` is the closed set of everything an input event can produce.
//! `TextOperation` is the subset that edits text, travels over the wire and
//! takes part in transformation; cursor moves stay local.

use super::id::OperationId;
use crate::error::{EditError, Result};
use crate::ClientID;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Insert `text` at character position `pos`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insert {
    /// Client that produced the edit
    pub client_id: ClientID,

    /// Globally unique id, used to match acknowledgments
    pub operation_id: OperationId,

    /// Document version the edit was computed against
    pub doc_version: u64,

    /// Character position of the first inserted character
    pub pos: usize,

    /// Inserted text (may contain colons and newlines)
    pub text: String,
}

impl Insert {
    /// Create an insert with an unassigned id at version 0
    pub fn new(text: impl Into<String>, pos: usize, client_id: impl Into<ClientID>) -> Self {
        Self {
            client_id: client_id.into(),
            operation_id: OperationId::default(),
            doc_version: 0,
            pos,
            text: text.into(),
        }
    }

    /// Set the operation id
    pub fn with_id(mut self, operation_id: OperationId) -> Self {
        self.operation_id = operation_id;
        self
    }

    /// Set the document version
    pub fn with_version(mut self, doc_version: u64) -> Self {
        self.doc_version = doc_version;
        self
    }

    /// Length of the inserted text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Delete `length` characters starting at `pos`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delete {
    pub client_id: ClientID,
    pub operation_id: OperationId,
    pub doc_version: u64,
    pub pos: usize,
    pub length: usize,
}

impl Delete {
    /// Create a delete with an unassigned id at version 0
    pub fn new(pos: usize, length: usize, client_id: impl Into<ClientID>) -> Self {
        Self {
            client_id: client_id.into(),
            operation_id: OperationId::default(),
            doc_version: 0,
            pos,
            length,
        }
    }

    /// Set the operation id
    pub fn with_id(mut self, operation_id: OperationId) -> Self {
        self.operation_id = operation_id;
        self
    }

    /// Set the document version
    pub fn with_version(mut self, doc_version: u64) -> Self {
        self.doc_version = doc_version;
        self
    }

    /// Position one past the last deleted character
    #[inline]
    pub fn end(&self) -> usize {
        self.pos + self.length
    }
}

/// Move the local cursor; never transformed, never sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorMove {
    pub pos: usize,
}

impl CursorMove {
    pub fn new(pos: usize) -> Self {
        Self { pos }
    }
}

/// Every operation an input event can produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Operation {
    Insert(Insert),
    Delete(Delete),
    CursorMove(CursorMove),
}

/// Discriminant of a [`TextOperation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Insert,
    Delete,
}

/// Text-editing operation: the unit of transformation and synchronization
///
/// # Example
///
/// ```rust
/// use coedit_core::ops::{Insert, TextOperation};
///
/// let op = TextOperation::from(Insert::new("Hi", 3, "c1").with_version(4));
/// assert_eq!(op.pos(), 3);
/// assert_eq!(op.doc_version(), 4);
/// assert_eq!(op.client_id(), "c1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TextOperation {
    Insert(Insert),
    Delete(Delete),
}

impl TextOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            TextOperation::Insert(_) => OperationKind::Insert,
            TextOperation::Delete(_) => OperationKind::Delete,
        }
    }

    pub fn client_id(&self) -> &str {
        match self {
            TextOperation::Insert(op) => &op.client_id,
            TextOperation::Delete(op) => &op.client_id,
        }
    }

    pub fn operation_id(&self) -> &OperationId {
        match self {
            TextOperation::Insert(op) => &op.operation_id,
            TextOperation::Delete(op) => &op.operation_id,
        }
    }

    pub fn doc_version(&self) -> u64 {
        match self {
            TextOperation::Insert(op) => op.doc_version,
            TextOperation::Delete(op) => op.doc_version,
        }
    }

    pub fn set_doc_version(&mut self, doc_version: u64) {
        match self {
            TextOperation::Insert(op) => op.doc_version = doc_version,
            TextOperation::Delete(op) => op.doc_version = doc_version,
        }
    }

    pub fn pos(&self) -> usize {
        match self {
            TextOperation::Insert(op) => op.pos,
            TextOperation::Delete(op) => op.pos,
        }
    }

    /// Check if applying this operation leaves the text unchanged
    pub fn is_noop(&self) -> bool {
        match self {
            TextOperation::Insert(op) => op.text.is_empty(),
            TextOperation::Delete(op) => op.length == 0,
        }
    }

    /// Zero-length delete carrying this operation's identity
    ///
    /// Stands in for an operation whose effect was fully absorbed by a
    /// concurrent one: it still advances versions and still acknowledges
    /// the originator, but edits nothing and shifts nothing.
    pub fn to_noop(&self) -> TextOperation {
        TextOperation::Delete(Delete {
            client_id: self.client_id().to_string(),
            operation_id: self.operation_id().clone(),
            doc_version: self.doc_version(),
            pos: self.pos(),
            length: 0,
        })
    }

    /// Encode in the colon-delimited wire format
    pub fn serialize(&self) -> String {
        crate::protocol::serialize_operation(self)
    }

    /// Decode from the colon-delimited wire format
    pub fn deserialize(message: &str) -> Result<Self> {
        crate::protocol::deserialize_operation(message)
    }
}

impl fmt::Display for TextOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for TextOperation {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self> {
        Self::deserialize(s)
    }
}

impl From<Insert> for TextOperation {
    fn from(op: Insert) -> Self {
        TextOperation::Insert(op)
    }
}

impl From<Delete> for TextOperation {
    fn from(op: Delete) -> Self {
        TextOperation::Delete(op)
    }
}

impl From<TextOperation> for Operation {
    fn from(op: TextOperation) -> Self {
        match op {
            TextOperation::Insert(op) => Operation::Insert(op),
            TextOperation::Delete(op) => Operation::Delete(op),
        }
    }
}

impl TryFrom<Operation> for TextOperation {
    type Error = EditError;

    fn try_from(op: Operation) -> Result<Self> {
        match op {
            Operation::Insert(op) => Ok(TextOperation::Insert(op)),
            Operation::Delete(op) => Ok(TextOperation::Delete(op)),
            Operation::CursorMove(op) => Err(EditError::Protocol(format!(
                "cursor move to {} is not a text operation",
                op.pos
            ))),
        }
    }
}
