//! Client-side reconciliation
//!
//! Local edits are applied optimistically and parked in a pending queue
//! until the server echoes them back. Remote edits are transformed past
//! everything still pending before they touch the buffer, and the pending
//! queue is then transformed past the remote edit so it stays valid
//! against the new buffer.

use super::text_engine::TextEngine;
use super::transform::{transform, transform_through};
use crate::error::{EditError, Result};
use crate::ops::{OperationId, TextOperation};

/// Text engine plus the queue of unacknowledged local operations
#[derive(Debug, Clone, Default)]
pub struct ClientTextEngine {
    engine: TextEngine,
    pending: Vec<TextOperation>,
    acknowledged: Vec<TextOperation>,
}

impl ClientTextEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine(&self) -> &TextEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TextEngine {
        &mut self.engine
    }

    /// Replace the document with a server snapshot
    ///
    /// Pending operations refer to the old document and are discarded.
    pub fn load_document(&mut self, text: &str) {
        if !self.pending.is_empty() {
            tracing::warn!(
                "Discarding {} pending operations on document reload",
                self.pending.len()
            );
        }
        self.pending.clear();
        self.engine.read_string(text);
    }

    /// Queue a locally applied operation until the server confirms it
    pub fn add_pending_local_op(&mut self, op: TextOperation) {
        self.pending.push(op);
    }

    /// Operations applied locally and not yet confirmed, oldest first
    pub fn pending(&self) -> &[TextOperation] {
        &self.pending
    }

    /// Operations confirmed by the server, in confirmation order
    pub fn acknowledged(&self) -> &[TextOperation] {
        &self.acknowledged
    }

    /// Remove the pending entry with `operation_id` and return it
    ///
    /// An id that is not pending (never sent, or already acknowledged) is
    /// logged and reported as [`EditError::UnknownOperation`]; the queue is
    /// left untouched.
    pub fn acknowledge_pending_op(&mut self, operation_id: &OperationId) -> Result<TextOperation> {
        let Some(index) = self
            .pending
            .iter()
            .position(|op| op.operation_id() == operation_id)
        else {
            tracing::warn!("Acknowledgment for unknown operation {}", operation_id);
            return Err(EditError::UnknownOperation(operation_id.clone()));
        };

        let op = self.pending.remove(index);
        tracing::debug!(
            "Acknowledged {} ({} still pending)",
            operation_id,
            self.pending.len()
        );
        self.acknowledged.push(op.clone());
        Ok(op)
    }

    /// Reconcile and apply a remote operation; returns it as applied
    ///
    /// An incoming delete already covered by pending deletes is applied as
    /// a zero-length no-op so the version still advances. One that falls
    /// outside the buffer is skipped and leaves the pending queue alone.
    pub fn process_incoming_operation(&mut self, op: TextOperation) -> TextOperation {
        let mut incoming = transform_through(&op, &self.pending).unwrap_or_else(|| {
            tracing::debug!("Incoming {} absorbed by pending operations", op.operation_id());
            op.to_noop()
        });

        let outcome = self.engine.apply_incoming(&incoming);
        if !outcome.is_applied() {
            tracing::debug!(
                "Incoming {} from {} not applied: {:?}",
                incoming.operation_id(),
                incoming.client_id(),
                outcome
            );
            incoming = incoming.to_noop();
        }

        for pending in self.pending.iter_mut() {
            *pending = match transform(pending, &incoming) {
                Some(transformed) => transformed,
                None => pending.to_noop(),
            };
        }

        incoming
    }
}
