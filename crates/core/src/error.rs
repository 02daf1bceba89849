//! Fatal loading errors.
//!
//! These abort a run before any causality test is attempted. Failures of an
//! individual causality test are not represented here; they are captured as
//! [`crate::Outcome::Failure`] values by the runner.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a file into a [`crate::TimeSeriesPair`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// The input path does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The file exists but no usable table or recognised field was found.
    #[error("unparseable input: {0}")]
    UnparseableFormat(String),

    /// Fewer samples than the configured minimum survived loading or cleaning.
    #[error("too few valid samples: got {actual}, need at least {required}")]
    InsufficientSamples { actual: usize, required: usize },

    /// X and Y were extracted with different lengths.
    #[error("series length mismatch: x has {x} samples, y has {y}")]
    LengthMismatch { x: usize, y: usize },

    #[error("i/o error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// Returns true for the "series too short" family of failures.
    #[must_use]
    pub fn is_insufficient(&self) -> bool {
        matches!(self, Self::InsufficientSamples { .. })
    }
}
