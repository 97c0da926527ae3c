//! Operational transformation of concurrent text operations
//!
//! `transform(op1, op2)` rewrites `op1` so that it has the intended effect
//! on a document where `op2` has already been applied, both having been
//! computed against the same base state.
//!
//! | op1 \ op2 | Insert | Delete |
//! |-----------|--------|--------|
//! | Insert | shift right if `op2` is before, or at the same position with a client id that is not larger | shift left past a delete that ends at or before it; collapse into a delete that spans it |
//! | Delete | shift right if `op2` is at or before it | shift left; trim the overlapping part; vanish if fully covered |
//!
//! Ties between inserts at the same position are broken by comparing
//! client ids as strings, so every replica makes the same choice.

use crate::ops::{Delete, Insert, TextOperation};

/// Transform `op1` against `op2`
///
/// Returns `None` exactly when `op1` is a delete whose whole range was
/// already removed by `op2`.
///
/// # Example
///
/// ```rust
/// use coedit_core::engine::transform;
/// use coedit_core::ops::{Delete, Insert, TextOperation};
///
/// // "Hello World": c1 deletes "World", c2 appends "!" at the old end
/// let delete = TextOperation::from(Delete::new(6, 5, "c1"));
/// let insert = TextOperation::from(Insert::new("!", 11, "c2"));
///
/// let moved = transform(&insert, &delete).unwrap();
/// assert_eq!(moved.pos(), 6);
/// ```
pub fn transform(op1: &TextOperation, op2: &TextOperation) -> Option<TextOperation> {
    match (op1, op2) {
        (TextOperation::Insert(a), TextOperation::Insert(b)) => {
            Some(insert_after_insert(a, b).into())
        }
        (TextOperation::Insert(a), TextOperation::Delete(b)) => {
            Some(insert_after_delete(a, b).into())
        }
        (TextOperation::Delete(a), TextOperation::Insert(b)) => {
            Some(delete_after_insert(a, b).into())
        }
        (TextOperation::Delete(a), TextOperation::Delete(b)) => {
            delete_after_delete(a, b).map(Into::into)
        }
    }
}

/// Transform `op` through `ops` in order, feeding each result forward
///
/// Stops with `None` as soon as `op` is fully absorbed.
pub fn transform_through<'a, I>(op: &TextOperation, ops: I) -> Option<TextOperation>
where
    I: IntoIterator<Item = &'a TextOperation>,
{
    ops.into_iter()
        .try_fold(op.clone(), |current, other| transform(&current, other))
}

fn insert_after_insert(a: &Insert, b: &Insert) -> Insert {
    let mut out = a.clone();
    let shifts = match b.pos.cmp(&a.pos) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Equal => a.client_id >= b.client_id,
        std::cmp::Ordering::Greater => false,
    };
    if shifts {
        out.pos += b.char_len();
    }
    out
}

fn insert_after_delete(a: &Insert, b: &Delete) -> Insert {
    let mut out = a.clone();
    if b.end() <= a.pos {
        out.pos -= b.length;
    } else if b.pos < a.pos {
        // Insertion point was inside the deleted range
        out.pos = b.pos;
    }
    out
}

fn delete_after_insert(a: &Delete, b: &Insert) -> Delete {
    let mut out = a.clone();
    if b.pos <= a.pos {
        out.pos += b.char_len();
    }
    out
}

fn delete_after_delete(a: &Delete, b: &Delete) -> Option<Delete> {
    let mut out = a.clone();
    if b.end() <= a.pos {
        out.pos -= b.length;
    } else if b.pos <= a.pos {
        // b covers the start of a
        let overlap = (b.end() - a.pos).min(a.length);
        out.pos = b.pos;
        out.length = a.length - overlap;
        if out.length == 0 {
            return None;
        }
    } else if b.pos < a.end() {
        // b starts inside a; drop whatever part of a it already removed
        let overlap = b.end().min(a.end()) - b.pos;
        out.length = a.length - overlap;
    }
    Some(out)
}
