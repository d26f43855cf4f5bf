//! Error taxonomy for the gesture core.
//!
//! Almost nothing here reaches a host under normal operation: malformed
//! frames are downgraded to "no hand" by the interpreters, and every other
//! irregularity in the landmark stream is an explicit state transition.

use crate::landmark::LANDMARK_COUNT;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A landmark sequence shorter than a full hand was handed to code that
    /// needs all of it.
    #[error("invalid input: expected {expected} landmarks, got {actual}")]
    InvalidInput { expected: usize, actual: usize },

    /// `centroid` was asked for the mean of nothing.
    #[error("centroid requested over an empty point set")]
    EmptyCentroidInput,

    #[error("configuration error: {0}")]
    Config(String),

    /// The landmark detector could not be brought up. Terminal for the
    /// session that tried to open it.
    #[error("landmark detector failed to initialize: {0}")]
    DetectorInit(String),

    #[error("recording line {line}: {message}")]
    Recording { line: usize, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn short_hand(actual: usize) -> Self {
        Error::InvalidInput { expected: LANDMARK_COUNT, actual }
    }
}
