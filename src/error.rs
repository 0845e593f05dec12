// THEORY:
// The `error` module defines the single error type surfaced by the engine.
// A build either yields a finished mosaic or exactly one of these errors; the
// first failure inside a session wins and later failures for other tiles are
// swallowed. Struct variants carry the offending tile id where one exists so
// the caller can report which region of the image sank the build.

use std::fmt;

/// Main error type for all mosaic operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MosaicError {
    /// The input violated a precondition before any work was dispatched.
    InvalidInput {
        /// Description of what's wrong with the input.
        reason: String,
    },

    /// A pool member failed to process a color-averaging job.
    WorkerFailure {
        /// The tile whose job failed.
        tile_id: usize,
        /// Description of the failure.
        reason: String,
    },

    /// The resolver could not produce a reference image for a tile's color.
    ResolutionFailure {
        /// The tile whose resolution failed.
        tile_id: usize,
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { reason } => {
                write!(f, "Invalid input: {reason}")
            }
            Self::WorkerFailure { tile_id, reason } => {
                write!(f, "Worker failed on tile {tile_id}: {reason}")
            }
            Self::ResolutionFailure { tile_id, reason } => {
                write!(f, "Failed to resolve a reference image for tile {tile_id}: {reason}")
            }
        }
    }
}

impl std::error::Error for MosaicError {}

/// Convenience type alias for mosaic results.
pub type Result<T> = std::result::Result<T, MosaicError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_tile_id() {
        let err = MosaicError::ResolutionFailure {
            tile_id: 7,
            reason: "no reference image for color 0a0a0a".to_string(),
        };
        assert!(err.to_string().contains("tile 7"));
    }
}
