//! Operation model
//!
//! Value types for the edits that flow between the input layer, the text
//! engines and the network:
//!
//! - [`Insert`] / [`Delete`]: text edits, stamped with client id, operation
//!   id and the document version they were computed against
//! - [`CursorMove`]: local-only cursor relocation
//!
//! [`TextOperation`] is the Insert/Delete subset; it is what gets
//! transformed, queued, recorded in history and serialized.

mod id;
mod operation;

pub use id::{OpIdGenerator, OperationId};
pub use operation::{CursorMove, Delete, Insert, Operation, OperationKind, TextOperation};
