//! Worker identity.
//!
//! Workers are identified by a dense integer id `0..num_workers`. The letter
//! label (`A`, `B`, ...) is presentation only and is resolved to an id once,
//! during validation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest supported workforce (one letter label per worker).
pub const MAX_WORKERS: usize = 26;

/// Stable worker identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub usize);

impl WorkerId {
    /// Zero-based index.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }

    /// Display label: `A` for worker 0, `B` for worker 1, ...
    ///
    /// Ids beyond `Z` fall back to `W{index}`.
    pub fn label(self) -> String {
        if self.0 < MAX_WORKERS {
            char::from(b'A' + self.0 as u8).to_string()
        } else {
            format!("W{}", self.0)
        }
    }

    /// Parses a single-letter label (case-insensitive).
    ///
    /// Returns `None` for anything other than one ASCII letter.
    pub fn from_label(label: &str) -> Option<Self> {
        let mut chars = label.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => {
                Some(Self((c.to_ascii_uppercase() as u8 - b'A') as usize))
            }
            _ => None,
        }
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// All worker ids of a workforce of size `num_workers`.
pub fn workforce(num_workers: usize) -> impl Iterator<Item = WorkerId> {
    (0..num_workers).map(WorkerId)
}
