pub mod config;
pub mod config_loader;
pub mod error;
pub mod pair;
pub mod result;
pub mod stats;

pub use config::{AnalysisConfig, EntropyConfig, GewekeConfig, LagConfig};
pub use config_loader::ConfigLoader;
pub use error::LoadError;
pub use pair::{SourceKind, TimeSeriesPair};
pub use result::{CausalityResult, Diagnostics, MethodId, Outcome, ResultSet, Verdict};
