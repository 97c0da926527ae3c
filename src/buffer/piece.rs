//! Piece: a span of one of the piece table's two buffers
//!
//! A piece never owns text. It names a buffer and a character range in it;
//! concatenating the ranges of all pieces in order yields the document.

use serde::{Deserialize, Serialize};

/// Which backing buffer a [`Piece`] points into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BufferKind {
    /// Text loaded at read time, never mutated afterwards
    Original,

    /// Append-only buffer receiving every inserted string
    Add,
}

/// A contiguous run of the logical document
///
/// Pieces are immutable values: an edit replaces a piece with up to three
/// new ones instead of adjusting it. Offsets and lengths count `char`s,
/// not bytes, so a split can never land inside a UTF-8 sequence.
///
/// # Example
///
/// ```rust
/// use coedit_core::buffer::{BufferKind, Piece};
///
/// let piece = Piece::new(BufferKind::Add, 10, 5);
/// let (head, tail) = piece.split(2);
///
/// assert_eq!(head, Some(Piece::new(BufferKind::Add, 10, 2)));
/// assert_eq!(tail, Some(Piece::new(BufferKind::Add, 12, 3)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    /// Buffer this piece reads from
    pub buffer: BufferKind,

    /// Offset of the first character inside the buffer
    pub start: usize,

    /// Number of characters covered
    pub length: usize,
}

impl Piece {
    /// Create a new piece
    pub fn new(buffer: BufferKind, start: usize, length: usize) -> Self {
        Self {
            buffer,
            start,
            length,
        }
    }

    /// Buffer offset one past the last character
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Check if this piece covers no characters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The first `len` characters of this piece, if any
    pub fn head(&self, len: usize) -> Option<Piece> {
        let len = len.min(self.length);
        (len > 0).then(|| Piece::new(self.buffer, self.start, len))
    }

    /// Everything from `offset` to the end of this piece, if any
    pub fn tail(&self, offset: usize) -> Option<Piece> {
        let offset = offset.min(self.length);
        let remaining = self.length - offset;
        (remaining > 0).then(|| Piece::new(self.buffer, self.start + offset, remaining))
    }

    /// Split at `offset` into the surviving parts before and after it
    ///
    /// Empty halves come back as `None` so callers can splice the result
    /// straight into the piece list.
    pub fn split(&self, offset: usize) -> (Option<Piece>, Option<Piece>) {
        (self.head(offset), self.tail(offset))
    }
}
