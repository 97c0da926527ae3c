//! Coedit Core - collaborative plain-text editing engine
//!
//! Several clients edit one shared document through a central server and
//! converge on identical text. This crate implements:
//! - Piece-table text storage
//! - Insert/Delete/CursorMove operations and their colon-delimited wire format
//! - Operational transformation of concurrent edits
//! - Client reconciliation (optimistic apply + pending queue)
//! - Server reconciliation (version-filtered history + authoritative stamping)
//! - A controller wiring input, engine and network together
//! - A tokio TCP server and client (`net` feature)
//!
//! # Examples
//!
//! ```rust
//! use coedit_core::{Controller, Incoming, TextInputEvent};
//!
//! let mut server = Controller::server();
//! server.set_initial_document("Hello World");
//!
//! let mut c1 = Controller::client("c1");
//! let mut c2 = Controller::client("c2");
//! c1.set_initial_document("Hello World");
//! c2.set_initial_document("Hello World");
//!
//! // Concurrent edits against the same base
//! let delete = c1.handle_text_input_event(TextInputEvent::delete(6, 5)).unwrap();
//! let insert = c2.handle_text_input_event(TextInputEvent::insert("!", 11)).unwrap();
//!
//! // The server accepts both in arrival order and broadcasts the results
//! let mut broadcasts = Vec::new();
//! for op in [delete, insert] {
//!     if let Incoming::Broadcast(accepted) = server.process_incoming_message(&op.serialize()) {
//!         broadcasts.push(accepted.serialize());
//!     }
//! }
//! for wire in &broadcasts {
//!     c1.process_incoming_message(wire);
//!     c2.process_incoming_message(wire);
//! }
//!
//! assert_eq!(server.text(), "Hello !");
//! assert_eq!(c1.text(), "Hello !");
//! assert_eq!(c2.text(), "Hello !");
//! ```

pub mod buffer;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod ops;
pub mod protocol;

#[cfg(feature = "net")]
pub mod net;

// Re-exports for convenience
pub use buffer::PieceTable;
pub use config::Config;
pub use controller::{Controller, CursorInputEvent, Incoming, TextInputEvent, Transport};
pub use engine::{transform, ApplyOutcome, ClientTextEngine, ServerTextEngine, TextEngine};
pub use error::{EditError, Result};
pub use ops::{Operation, OperationId, TextOperation};

/// Client identifier type
pub type ClientID = String;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_import() {
        // Smoke test that modules compile
        let _client_id: ClientID = "test-client".to_string();
        assert_eq!(Controller::server().client_id(), "Server");
    }
}
