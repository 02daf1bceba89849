//! Turns a data file into a validated [`TimeSeriesPair`].

pub mod binary;
pub mod delimited;

use causal_compare_core::{LoadError, SourceKind, TimeSeriesPair};
use std::path::Path;

pub use binary::load_binary;
pub use delimited::load_delimited;

/// Caller preference for how a file should be interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceHint {
    /// Decide from the file extension.
    #[default]
    Auto,
    Binary,
    Delimited,
}

impl SourceHint {
    /// Resolves the hint to a concrete source kind for `path`.
    #[must_use]
    pub fn resolve(self, path: &Path) -> SourceKind {
        match self {
            Self::Binary => SourceKind::Binary,
            Self::Delimited => SourceKind::Delimited,
            Self::Auto => {
                let is_mat = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("mat"));
                if is_mat {
                    SourceKind::Binary
                } else {
                    SourceKind::Delimited
                }
            }
        }
    }
}

/// Loads `path` as a pair with at least `min_samples` rows.
///
/// # Errors
/// `FileNotFound` before any parsing if the path does not exist; otherwise
/// whatever the selected loader reports.
pub fn load_pair(
    path: &Path,
    hint: SourceHint,
    min_samples: usize,
) -> Result<TimeSeriesPair, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound(path.to_path_buf()));
    }

    let kind = hint.resolve(path);
    tracing::info!("Loading {} as {} data", path.display(), kind);

    let pair = match kind {
        SourceKind::Binary => load_binary(path, min_samples)?,
        SourceKind::Delimited => load_delimited(path, min_samples)?,
    };

    tracing::info!("Loaded {} samples", pair.len());
    Ok(pair)
}
