//! Document version clock
//!
//! A Lamport-style counter that orders accepted edits:
//! - local edits are stamped with the current value, then the clock ticks
//! - remote edits move the clock to `max(local, remote) + 1`
//!
//! Cursor moves never touch it.

use serde::{Deserialize, Serialize};

/// Monotonically increasing document version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionClock {
    value: u64,
}

impl VersionClock {
    /// Create a new clock starting at 0
    pub fn new() -> Self {
        Self { value: 0 }
    }

    /// Get current value without incrementing
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Return the current value and advance by one (local edits)
    pub fn stamp(&mut self) -> u64 {
        let stamped = self.value;
        self.value += 1;
        stamped
    }

    /// Move past a remote version (remote edits)
    pub fn advance_past(&mut self, remote: u64) {
        self.value = self.value.max(remote) + 1;
    }

    /// Reset to 0 (document reloaded)
    pub fn reset(&mut self) {
        self.value = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_returns_pre_increment_value() {
        let mut clock = VersionClock::new();
        assert_eq!(clock.value(), 0);
        assert_eq!(clock.stamp(), 0);
        assert_eq!(clock.stamp(), 1);
        assert_eq!(clock.value(), 2);
    }

    #[test]
    fn test_advance_past() {
        let mut clock = VersionClock::new();
        clock.advance_past(5);
        assert_eq!(clock.value(), 6);

        // Older remote versions still advance by exactly one
        clock.advance_past(2);
        assert_eq!(clock.value(), 7);
    }

    #[test]
    fn test_reset() {
        let mut clock = VersionClock::new();
        clock.advance_past(9);
        clock.reset();
        assert_eq!(clock.value(), 0);
    }
}
