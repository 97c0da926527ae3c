//! Server-side reconciliation
//!
//! The server owns the authoritative document. Every incoming operation is
//! transformed against the history entries its author could not have seen,
//! stamped with the current authoritative version, applied, and recorded.
//!
//! The history is append-only and never compacted.

use super::text_engine::TextEngine;
use super::transform::transform_through;
use crate::ops::TextOperation;

/// Authoritative text engine plus the history of accepted operations
#[derive(Debug, Clone, Default)]
pub struct ServerTextEngine {
    engine: TextEngine,
    history: Vec<TextOperation>,
}

impl ServerTextEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine(&self) -> &TextEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TextEngine {
        &mut self.engine
    }

    /// Accepted operations in acceptance order, each with its final version
    pub fn history(&self) -> &[TextOperation] {
        &self.history
    }

    /// Reconcile, stamp, apply and record an operation
    ///
    /// Returns the accepted copy to broadcast. Only history entries with a
    /// version strictly greater than `op.doc_version()` take part in the
    /// transform. An operation fully absorbed along the way is accepted as a
    /// zero-length no-op, which still acknowledges its author. So is one that
    /// falls outside the document.
    pub fn process_incoming_operation(&mut self, op: TextOperation) -> TextOperation {
        let base = op.doc_version();
        let unseen = self.history.iter().filter(|entry| entry.doc_version() > base);
        let mut incoming = transform_through(&op, unseen).unwrap_or_else(|| {
            tracing::debug!("Incoming {} absorbed by history", op.operation_id());
            op.to_noop()
        });

        incoming.set_doc_version(self.engine.doc_version());
        let outcome = self.engine.apply_incoming(&incoming);
        if !outcome.is_applied() {
            tracing::warn!(
                "Operation {} from {} not applied: {:?}",
                incoming.operation_id(),
                incoming.client_id(),
                outcome
            );
            incoming = incoming.to_noop();
        }

        self.history.push(incoming.clone());
        incoming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{Delete, Insert};

    fn ins(text: &str, pos: usize, client: &str, version: u64) -> TextOperation {
        Insert::new(text, pos, client).with_version(version).into()
    }

    #[test]
    fn test_stamps_authoritative_version() {
        let mut server = ServerTextEngine::new();
        let first = server.process_incoming_operation(ins("Hello", 0, "c1", 0));
        assert_eq!(first.doc_version(), 0);
        assert_eq!(server.engine().doc_version(), 1);

        let second = server.process_incoming_operation(ins("!", 5, "c1", 1));
        assert_eq!(second.doc_version(), 1);
        assert_eq!(server.engine().text(), "Hello!");
        assert_eq!(server.history().len(), 2);
    }

    #[test]
    fn test_history_filter_skips_seen_entries() {
        let mut server = ServerTextEngine::new();
        server.engine_mut().read_string("abcdef");
        // Recorded at versions 0 and 1
        server.process_incoming_operation(ins("XX", 0, "c1", 0));
        server.process_incoming_operation(ins("YYY", 0, "c1", 1));
        assert_eq!(server.engine().text(), "YYYXXabcdef");

        // Computed at version 0: only the entry recorded at version 1 applies
        let op = server.process_incoming_operation(ins("z", 1, "c2", 0));
        assert_eq!(op.pos(), 4);
        assert_eq!(op.doc_version(), 2);
    }

    #[test]
    fn test_history_filter_with_current_version_transforms_nothing() {
        let mut server = ServerTextEngine::new();
        server.engine_mut().read_string("abc");
        server.process_incoming_operation(ins("1", 0, "c1", 0));
        server.process_incoming_operation(ins("2", 0, "c1", 1));

        let op = server.process_incoming_operation(ins("z", 2, "c2", 5));
        assert_eq!(op.pos(), 2);
    }

    #[test]
    fn test_absorbed_delete_is_recorded_as_noop() {
        let mut server = ServerTextEngine::new();
        server.engine_mut().read_string("Hello World");
        server.process_incoming_operation(ins("~", 11, "c1", 0));
        server.process_incoming_operation(Delete::new(0, 11, "c1").with_version(1).into());
        assert_eq!(server.engine().text(), "~");

        let op = server.process_incoming_operation(Delete::new(3, 2, "c2").with_version(0).into());
        assert!(op.is_noop());
        assert_eq!(op.client_id(), "c2");
        assert_eq!(server.engine().text(), "~");
        assert_eq!(server.history().len(), 3);
    }

    #[test]
    fn test_skipped_delete_is_recorded_as_noop() {
        let mut server = ServerTextEngine::new();
        server.engine_mut().read_string("abc");

        let op = server.process_incoming_operation(Delete::new(2, 5, "c1").into());
        assert!(op.is_noop());
        assert_eq!(server.engine().text(), "abc");
        assert!(server.history()[0].is_noop());

        // A later edit based on the same version is not shifted by it
        let op = server.process_incoming_operation(ins("X", 3, "c2", 0));
        assert_eq!(op.pos(), 3);
        assert_eq!(server.engine().text(), "abcX");
    }
}
