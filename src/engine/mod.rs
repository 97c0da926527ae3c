//! Text engines and operational transformation
//!
//! - [`TextEngine`]: buffer, cursor and version clock
//! - [`transform`]: the OT primitive reconciling two concurrent operations
//! - [`ClientTextEngine`]: optimistic local edits plus a pending queue
//! - [`ServerTextEngine`]: authoritative document plus accepted history
//!
//! # Example
//!
//! ```rust
//! use coedit_core::engine::{ClientTextEngine, ServerTextEngine};
//! use coedit_core::ops::{Insert, TextOperation};
//!
//! let mut server = ServerTextEngine::new();
//! let mut alice = ClientTextEngine::new();
//!
//! // Alice types locally, then the server accepts and echoes it back
//! let mut op = TextOperation::from(Insert::new("hi", 0, "alice").with_id("alice_0_0".into()));
//! let _ = alice.engine_mut().apply_local(&mut op);
//! alice.add_pending_local_op(op.clone());
//!
//! let accepted = server.process_incoming_operation(op);
//! alice.acknowledge_pending_op(accepted.operation_id()).unwrap();
//!
//! assert_eq!(server.engine().text(), alice.engine().text());
//! assert!(alice.pending().is_empty());
//! ```

mod client;
mod clock;
mod server;
mod text_engine;
mod transform;

pub use client::ClientTextEngine;
pub use clock::VersionClock;
pub use server::ServerTextEngine;
pub use text_engine::{ApplyOutcome, TextEngine};
pub use transform::{transform, transform_through};
