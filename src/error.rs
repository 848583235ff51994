//! Error types for the seating engine

use thiserror::Error;

/// Malformed input. Expected outcomes (capacity shortfall, unseated students)
/// are reported through `Allocation::warnings` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeatingError {
    #[error("invalid configuration for room '{room}': {reason}")]
    InvalidConfiguration { room: String, reason: String },

    #[error("roll number '{roll}' appears more than once")]
    DuplicateRoll { roll: String },
}

impl SeatingError {
    pub fn invalid(room: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            room: room.into(),
            reason: reason.into(),
        }
    }
}
