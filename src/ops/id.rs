//! Operation IDs: globally unique identifiers for text operations
//!
//! Each id is composed of:
//! - Client ID: the replica that created the operation
//! - Millisecond timestamp at creation
//! - Per-client monotonic sequence number
//!
//! rendered as `clientId_millis_seq`. The sequence counter lives in the
//! client session's [`OpIdGenerator`], not in process-wide state.

use crate::ClientID;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a text operation
///
/// Acknowledgments are matched on this id alone. An empty id is allowed
/// for hand-built operations that never travel through a client queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    /// Create an id from its parts
    pub fn new(client_id: &str, millis: i64, seq: u64) -> Self {
        Self(format!("{}_{}_{}", client_id, millis, seq))
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this id was never assigned
    pub fn is_unassigned(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for OperationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OperationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-client operation id generator
///
/// # Example
///
/// ```rust
/// use coedit_core::ops::OpIdGenerator;
///
/// let mut ids = OpIdGenerator::new("alice".to_string());
/// let first = ids.next_id();
/// let second = ids.next_id();
///
/// assert!(first.as_str().starts_with("alice_"));
/// assert!(first.as_str().ends_with("_0"));
/// assert_ne!(first, second);
/// ```
#[derive(Debug, Clone)]
pub struct OpIdGenerator {
    client_id: ClientID,
    seq: u64,
}

impl OpIdGenerator {
    /// Create a generator for `client_id`, starting at sequence 0
    pub fn new(client_id: ClientID) -> Self {
        Self { client_id, seq: 0 }
    }

    /// Client this generator stamps ids for
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Produce the next id
    pub fn next_id(&mut self) -> OperationId {
        let seq = self.seq;
        self.seq += 1;
        OperationId::new(&self.client_id, chrono::Utc::now().timestamp_millis(), seq)
    }
}
