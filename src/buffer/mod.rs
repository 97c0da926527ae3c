//! Piece table: append-only text storage for the shared document
//!
//! The document is never stored contiguously. Two buffers hold every
//! character that has ever existed in it:
//!
//! - **Original buffer**: loaded once (file or string), never mutated
//! - **Add buffer**: every inserted string is appended here, never edited
//!
//! An ordered list of [`Piece`]s says which spans of which buffer make up
//! the current text. Edits replace pieces wholesale; nothing is copied or
//! shifted.
//!
//! # Example
//!
//! ```rust
//! use coedit_core::buffer::PieceTable;
//!
//! let mut table = PieceTable::new();
//! table.read_str("Hello World");
//! table.insert(",", 5);
//! table.remove(6, 12);
//!
//! assert_eq!(table.text(), "Hello,");
//! ```

mod piece;
mod piece_table;

pub use piece::{BufferKind, Piece};
pub use piece_table::PieceTable;
