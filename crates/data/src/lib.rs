pub mod loader;
pub mod quality;
pub mod synthetic;

pub use loader::{load_pair, SourceHint};
pub use quality::{check, check_and_clean, clean, QualityIssue, QualityReport, SeriesStats};
pub use synthetic::{generate_pair, write_csv, SyntheticConfig};
