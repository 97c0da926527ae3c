//! TextEngine: piece table plus version clock and cursor
//!
//! Applies operations to the buffer. Local edits are stamped with the
//! current version and move the cursor; incoming edits advance the version
//! past the sender's and leave the cursor alone.

use super::clock::VersionClock;
use super::transform;
use crate::buffer::PieceTable;
use crate::ops::{Delete, Insert, TextOperation};
use std::path::Path;

/// Result of applying an operation to the buffer
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The edit was applied and the version advanced
    Applied,

    /// The delete range ran past the end of the document; nothing changed
    SkippedOutOfBounds {
        pos: usize,
        length: usize,
        doc_len: usize,
    },
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied)
    }
}

/// Document state shared by client and server engines
///
/// # Example
///
/// ```rust
/// use coedit_core::engine::TextEngine;
/// use coedit_core::ops::{Delete, Insert};
///
/// let mut engine = TextEngine::new();
/// let mut hello = Insert::new("Hello", 0, "c1");
/// assert!(engine.insert_local(&mut hello).is_applied());
/// assert_eq!(hello.doc_version, 0);
/// assert_eq!(engine.cursor_position(), 5);
///
/// let mut trim = Delete::new(1, 3, "c1");
/// assert!(engine.delete_local(&mut trim).is_applied());
/// assert_eq!(engine.text(), "Ho");
/// assert_eq!(engine.doc_version(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextEngine {
    buffer: PieceTable,
    cursor: usize,
    version: VersionClock,
}

impl TextEngine {
    /// Create an engine over an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the document with `text`, resetting cursor and version
    pub fn read_string(&mut self, text: &str) {
        self.buffer.read_str(text);
        self.cursor = 0;
        self.version.reset();
    }

    /// Replace the document with the contents of `path`
    ///
    /// An unreadable file yields an empty document (logged by the buffer).
    pub fn read_file(&mut self, path: impl AsRef<Path>) {
        self.buffer.read(path);
        self.cursor = 0;
        self.version.reset();
    }

    /// Apply a locally produced insert; stamps `op.doc_version`
    pub fn insert_local(&mut self, op: &mut Insert) -> ApplyOutcome {
        op.doc_version = self.version.stamp();
        op.pos = op.pos.min(self.buffer.len());
        self.buffer.insert(&op.text, op.pos);
        self.cursor = op.pos + op.char_len();
        tracing::debug!(
            "Applied local insert {} at {} (v{})",
            op.operation_id,
            op.pos,
            op.doc_version
        );
        ApplyOutcome::Applied
    }

    /// Apply an insert received from a peer
    pub fn insert_incoming(&mut self, op: &Insert) -> ApplyOutcome {
        self.version.advance_past(op.doc_version);
        self.buffer.insert(&op.text, op.pos);
        tracing::debug!(
            "Applied incoming insert {} from {} at {} (now v{})",
            op.operation_id,
            op.client_id,
            op.pos,
            self.version.value()
        );
        ApplyOutcome::Applied
    }

    /// Apply a locally produced delete; stamps `op.doc_version`
    ///
    /// Skipped without any effect if the range runs past the end.
    pub fn delete_local(&mut self, op: &mut Delete) -> ApplyOutcome {
        if let Some(skipped) = self.check_bounds(op) {
            return skipped;
        }
        op.doc_version = self.version.stamp();
        self.buffer.remove(op.pos, op.end());
        self.cursor = op.pos;
        tracing::debug!(
            "Applied local delete {} of {} at {} (v{})",
            op.operation_id,
            op.length,
            op.pos,
            op.doc_version
        );
        ApplyOutcome::Applied
    }

    /// Apply a delete received from a peer
    ///
    /// Skipped without any effect if the range runs past the end.
    pub fn delete_incoming(&mut self, op: &Delete) -> ApplyOutcome {
        if let Some(skipped) = self.check_bounds(op) {
            return skipped;
        }
        self.version.advance_past(op.doc_version);
        self.buffer.remove(op.pos, op.end());
        tracing::debug!(
            "Applied incoming delete {} from {} of {} at {} (now v{})",
            op.operation_id,
            op.client_id,
            op.length,
            op.pos,
            self.version.value()
        );
        ApplyOutcome::Applied
    }

    /// Apply a locally produced text operation
    pub fn apply_local(&mut self, op: &mut TextOperation) -> ApplyOutcome {
        match op {
            TextOperation::Insert(op) => self.insert_local(op),
            TextOperation::Delete(op) => self.delete_local(op),
        }
    }

    /// Apply a text operation received from a peer
    pub fn apply_incoming(&mut self, op: &TextOperation) -> ApplyOutcome {
        match op {
            TextOperation::Insert(op) => self.insert_incoming(op),
            TextOperation::Delete(op) => self.delete_incoming(op),
        }
    }

    /// Transform `op1` as if `op2` had already been applied
    ///
    /// See [`transform`](super::transform()) for the rules.
    pub fn transform(op1: &TextOperation, op2: &TextOperation) -> Option<TextOperation> {
        transform::transform(op1, op2)
    }

    /// Move the cursor; no validation against document length
    pub fn set_cursor_position(&mut self, pos: usize) {
        self.cursor = pos;
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    pub fn doc_version(&self) -> u64 {
        self.version.value()
    }

    /// Full document text
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Document length in characters
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Underlying piece table
    pub fn buffer(&self) -> &PieceTable {
        &self.buffer
    }

    fn check_bounds(&self, op: &Delete) -> Option<ApplyOutcome> {
        // Zero-length deletes stand in for absorbed operations and always apply
        if op.length == 0 || op.end() <= self.buffer.len() {
            return None;
        }
        tracing::warn!(
            "Skipping delete {} from {}: range {}..{} exceeds document length {}",
            op.operation_id,
            op.client_id,
            op.pos,
            op.end(),
            self.buffer.len()
        );
        Some(ApplyOutcome::SkippedOutOfBounds {
            pos: op.pos,
            length: op.length,
            doc_len: self.buffer.len(),
        })
    }
}
