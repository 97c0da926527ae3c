//! PieceTable: dual-buffer document storage
//!
//! Both buffers are ropes (ropey crate) so that slicing by character index
//! stays O(log n) no matter how much text has been appended.

use super::piece::{BufferKind, Piece};
use ropey::Rope;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Piece table text buffer
///
/// # Architecture
///
/// ```text
/// PieceTable {
///     original: "Hello World"          // fixed at load time
///     add:      ", big"                // append-only
///     pieces: [
///         Original 0..5   -> "Hello"
///         Add      0..5   -> ", big"
///         Original 5..11  -> " World"
///     ]
/// }
/// ```
///
/// # Invariants
///
/// - `original` is only replaced by [`read`](Self::read)/[`read_str`](Self::read_str)
/// - `add` only grows
/// - every piece lies inside its buffer
/// - the sum of piece lengths equals [`len`](Self::len)
///
/// All indices are character offsets into the logical document.
#[derive(Debug, Clone, Default)]
pub struct PieceTable {
    original: Rope,
    add: Rope,
    pieces: Vec<Piece>,
    length: usize,
}

impl PieceTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the table and load the file at `path` as the original buffer
    ///
    /// An unreadable file is logged and leaves the table empty; the caller
    /// simply sees an empty document.
    pub fn read(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.reset();

        let rope = match File::open(path).and_then(|file| Rope::from_reader(BufReader::new(file))) {
            Ok(rope) => rope,
            Err(err) => {
                tracing::warn!("Failed to read {}: {}", path.display(), err);
                return;
            }
        };

        self.load(rope);
        tracing::debug!("Loaded {} characters from {}", self.length, path.display());
    }

    /// Reset the table and load `text` as the original buffer
    pub fn read_str(&mut self, text: &str) {
        self.reset();
        self.load(Rope::from_str(text));
    }

    /// Insert `text` so that its first character lands at `index`
    ///
    /// Empty text is a no-op. An `index` past the end is clamped to the end.
    pub fn insert(&mut self, text: &str, index: usize) {
        if text.is_empty() {
            return;
        }
        let index = index.min(self.length);

        let add_start = self.add.len_chars();
        self.add.insert(add_start, text);
        let inserted = Piece::new(BufferKind::Add, add_start, self.add.len_chars() - add_start);

        let old_length = self.length;
        self.length += inserted.length;

        // Fast path: empty document or append at the end
        if self.pieces.is_empty() || index == old_length {
            self.pieces.push(inserted);
            return;
        }

        let Some((piece_idx, piece_offset)) = self.locate(index) else {
            self.pieces.push(inserted);
            return;
        };

        let piece = self.pieces[piece_idx];
        let (head, tail) = piece.split(index - piece_offset);
        let replacement = head.into_iter().chain(Some(inserted)).chain(tail);
        self.pieces.splice(piece_idx..=piece_idx, replacement);
    }

    /// Remove the characters in `start_index..end_index`
    ///
    /// No-op if `start_index` is at or past the end or the range is empty.
    /// `end_index` is clamped to the document length.
    pub fn remove(&mut self, start_index: usize, end_index: usize) {
        if start_index >= self.length || start_index >= end_index {
            return;
        }
        let end_index = end_index.min(self.length);

        let (Some((first_idx, first_offset)), Some((last_idx, last_offset))) =
            (self.locate(start_index), self.locate(end_index - 1))
        else {
            return;
        };

        // Leading remainder of the first piece, trailing remainder of the
        // last; everything between is dropped.
        let head = self.pieces[first_idx].head(start_index - first_offset);
        let tail = self.pieces[last_idx].tail(end_index - last_offset);
        self.pieces.splice(first_idx..=last_idx, head.into_iter().chain(tail));

        self.length -= end_index - start_index;
    }

    /// Reconstruct the full document text
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.length);
        for piece in &self.pieces {
            let slice = self.buffer(piece.buffer).slice(piece.start..piece.end());
            for chunk in slice.chunks() {
                out.push_str(chunk);
            }
        }
        out
    }

    /// Document length in characters
    pub fn len(&self) -> usize {
        self.length
    }

    /// Check if the document is empty
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Current piece list, in document order
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Number of characters ever appended to the add buffer
    pub fn add_buffer_len(&self) -> usize {
        self.add.len_chars()
    }

    fn reset(&mut self) {
        self.original = Rope::new();
        self.add = Rope::new();
        self.pieces.clear();
        self.length = 0;
    }

    fn load(&mut self, rope: Rope) {
        self.length = rope.len_chars();
        self.original = rope;
        if self.length > 0 {
            self.pieces.push(Piece::new(BufferKind::Original, 0, self.length));
        }
    }

    fn buffer(&self, kind: BufferKind) -> &Rope {
        match kind {
            BufferKind::Original => &self.original,
            BufferKind::Add => &self.add,
        }
    }

    /// Find the piece containing `index` by linear scan
    ///
    /// Returns the piece's position in the list and the document offset at
    /// which it starts.
    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        let mut offset = 0;
        for (i, piece) in self.pieces.iter().enumerate() {
            if index < offset + piece.length {
                return Some((i, offset));
            }
            offset += piece.length;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> PieceTable {
        let mut table = PieceTable::new();
        table.insert(text, 0);
        table
    }

    #[test]
    fn test_new_is_empty() {
        let table = PieceTable::new();
        assert!(table.is_empty());
        assert_eq!(table.text(), "");
        assert!(table.pieces().is_empty());
    }

    #[test]
    fn test_insert_into_empty() {
        let table = table("Hello");
        assert_eq!(table.text(), "Hello");
        assert_eq!(table.len(), 5);
        assert_eq!(table.pieces(), &[Piece::new(BufferKind::Add, 0, 5)]);
    }

    #[test]
    fn test_insert_at_start() {
        let mut table = table("World");
        table.insert("Hello ", 0);
        assert_eq!(table.text(), "Hello World");
        assert_eq!(table.pieces().len(), 2);
    }

    #[test]
    fn test_insert_at_exact_middle() {
        let mut table = table("Hello World");
        table.insert("inserted", 5);
        assert_eq!(table.text(), "Helloinserted World");
        assert_eq!(table.len(), 19);
        assert_eq!(table.pieces().len(), 3);
    }

    #[test]
    fn test_insert_at_end_does_not_split() {
        let mut table = table("Hello");
        table.insert(" World", 5);
        assert_eq!(table.text(), "Hello World");
        assert_eq!(
            table.pieces(),
            &[
                Piece::new(BufferKind::Add, 0, 5),
                Piece::new(BufferKind::Add, 5, 6),
            ]
        );
    }

    #[test]
    fn test_insert_beyond_end_appends() {
        let mut table = table("Hello World");
        table.insert("append", 111);
        assert_eq!(table.text(), "Hello Worldappend");
        assert_eq!(table.pieces().len(), 2);
    }

    #[test]
    fn test_insert_empty_is_noop() {
        let mut table = table("Hello World");
        table.insert("", 5);
        assert_eq!(table.text(), "Hello World");
        assert_eq!(table.pieces().len(), 1);
        assert_eq!(table.add_buffer_len(), 11);
    }

    #[test]
    fn test_insert_at_boundary_indices() {
        let mut table = table("Hello World");
        table.insert("a", 1);
        let len = table.len();
        table.insert("z", len - 1);
        assert_eq!(table.text(), "Haello Worlzd");
    }

    #[test]
    fn test_insert_unicode_in_middle() {
        let mut table = table("Hello World");
        table.insert("世界", 5);
        assert_eq!(table.text(), "Hello世界 World");
        assert_eq!(table.len(), 13);
        table.remove(5, 6);
        assert_eq!(table.text(), "Hello界 World");
    }

    #[test]
    fn test_remove_within_single_piece() {
        let mut table = table("Hello World");
        table.remove(2, 4);
        assert_eq!(table.text(), "Heo World");
        assert_eq!(table.len(), 9);
        assert_eq!(table.pieces().len(), 2);
    }

    #[test]
    fn test_remove_whole_piece() {
        let mut table = table("Hello");
        table.remove(0, 5);
        assert_eq!(table.text(), "");
        assert!(table.pieces().is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_remove_across_pieces() {
        let mut table = table("Hello");
        table.insert(" big", 5);
        table.insert(" World", 9);
        assert_eq!(table.pieces().len(), 3);

        // "Hel|lo big Wo|rld"
        table.remove(3, 12);
        assert_eq!(table.text(), "Helrld");
        assert_eq!(
            table.pieces(),
            &[
                Piece::new(BufferKind::Add, 0, 3),
                Piece::new(BufferKind::Add, 12, 3),
            ]
        );
    }

    #[test]
    fn test_remove_end_clamped() {
        let mut table = table("Hello World");
        table.remove(5, 500);
        assert_eq!(table.text(), "Hello");
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_remove_noop_cases() {
        let mut table = table("Hello");
        table.remove(5, 7);
        table.remove(3, 3);
        table.remove(4, 2);
        assert_eq!(table.text(), "Hello");
    }

    #[test]
    fn test_read_str_resets() {
        let mut table = table("scratch");
        table.read_str("Hello World");
        assert_eq!(table.text(), "Hello World");
        assert_eq!(table.pieces(), &[Piece::new(BufferKind::Original, 0, 11)]);
        assert_eq!(table.add_buffer_len(), 0);

        table.insert("!", 11);
        table.remove(0, 6);
        assert_eq!(table.text(), "World!");
    }

    #[test]
    fn test_read_missing_file_leaves_empty() {
        let mut table = table("stale");
        table.read("/definitely/not/a/real/path.txt");
        assert!(table.is_empty());
        assert_eq!(table.text(), "");
    }

    #[test]
    fn test_read_file() {
        let path = std::env::temp_dir().join(format!("coedit-read-{}.txt", uuid::Uuid::new_v4()));
        std::fs::write(&path, "line one\nline two\n").unwrap();

        let mut table = PieceTable::new();
        table.read(&path);
        assert_eq!(table.text(), "line one\nline two\n");
        assert_eq!(table.len(), 18);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_add_buffer_only_grows() {
        let mut table = table("abc");
        table.remove(0, 3);
        table.insert("de", 0);
        assert_eq!(table.add_buffer_len(), 5);
        assert_eq!(table.text(), "de");
    }
}
