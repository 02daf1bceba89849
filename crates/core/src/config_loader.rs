use crate::config::AnalysisConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "causal-compare.toml";

/// Environment variable prefix, e.g. `CAUSAL_ALPHA=0.01` or `CAUSAL_LAGS__BINARY=40`.
pub const ENV_PREFIX: &str = "CAUSAL_";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads analysis configuration by merging defaults, a TOML file, and environment variables.
    ///
    /// A missing TOML file is not an error; its values are simply absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file or an environment value cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<AnalysisConfig> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let config: AnalysisConfig = Self::figment(file).extract()?;
        tracing::debug!(?config, file = %file.display(), "Loaded analysis configuration");
        Ok(config)
    }

    fn figment(file: &Path) -> Figment {
        Figment::from(Serialized::defaults(AnalysisConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_without_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn load_merges_toml_over_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha = 0.01\n\n[lags]\nbinary = 30").unwrap();

        let config = ConfigLoader::load(Some(file.path())).unwrap();

        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.lags.binary, 30);
        assert_eq!(config.lags.delimited, 50);
    }
}
