use anyhow::{bail, Context as AnyhowContext, Result};
use codemap_analysis::{AnalysisConfig, OpenAiConfig};
use codemap_scanner::ScanOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub const ENV_BATCH_SIZE: &str = "CODEMAP_BATCH_SIZE";
pub const ENV_TIMEOUT_SECS: &str = "CODEMAP_TIMEOUT_SECS";
pub const ENV_MODEL: &str = "CODEMAP_MODEL";
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";

/// Everything a CLI run is configured with.
///
/// Layers, lowest first: built-in defaults, the TOML file given with `--config`,
/// environment variables, then command-line flags (applied by the caller).
///
/// ```toml
/// [analysis]
/// batch_size = 10
/// timeout_secs = 300
///
/// [analysis.chunker]
/// chunk_size = 1200
///
/// [openai]
/// model = "gpt-4o-mini"
///
/// [scan]
/// include_hidden = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub analysis: AnalysisConfig,
    pub openai: OpenAiConfig,
    pub scan: ScanOptions,
}

impl CliConfig {
    /// Defaults, then `path` (if any), then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Overlay values found through `lookup`; blank values are ignored
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = var(ENV_BATCH_SIZE) {
            self.analysis.batch_size = value
                .trim()
                .parse()
                .with_context(|| format!("{ENV_BATCH_SIZE} must be a positive integer"))?;
        }
        if let Some(value) = var(ENV_TIMEOUT_SECS) {
            self.analysis.timeout_secs = value
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} must be a number of seconds"))?;
        }
        if let Some(value) = var(ENV_MODEL) {
            self.openai.model = value;
        }
        if let Some(value) = var(ENV_API_KEY) {
            self.openai.api_key = Some(value);
        }
        if let Some(value) = var(ENV_BASE_URL) {
            self.openai.base_url = value;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if let Err(err) = self.analysis.validate() {
            bail!("Invalid analysis config: {err}");
        }
        if let Err(err) = self.openai.validate() {
            bail!("Invalid openai config: {err}");
        }
        if let Err(err) = self.scan.validate() {
            bail!("Invalid scan config: {err}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemap_analysis::SchedulingMode;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CliConfig::from_toml(
            r#"
            [analysis]
            batch_size = 4
            mode = "pooled"

            [analysis.chunker]
            chunk_size = 1200

            [openai]
            model = "gpt-4o-mini"
            "#,
        )
        .unwrap();

        assert_eq!(config.analysis.batch_size, 4);
        assert_eq!(config.analysis.mode, SchedulingMode::Pooled);
        assert_eq!(config.analysis.chunker.chunk_size, 1200);
        assert_eq!(config.analysis.chunker.chunk_overlap, 100);
        assert_eq!(config.analysis.timeout_secs, 120);
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.base_url, codemap_analysis::DEFAULT_BASE_URL);
        assert_eq!(config.scan, ScanOptions::default());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = CliConfig::from_toml("[analysis]\nbatch_size = 4\n").unwrap();
        config
            .apply_env(lookup(&[
                (ENV_BATCH_SIZE, "7"),
                (ENV_TIMEOUT_SECS, "30"),
                (ENV_API_KEY, "sk-env"),
                (ENV_MODEL, "  "),
            ]))
            .unwrap();

        assert_eq!(config.analysis.batch_size, 7);
        assert_eq!(config.analysis.timeout_secs, 30);
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.openai.model, codemap_analysis::DEFAULT_MODEL);
    }

    #[test]
    fn test_malformed_env_value_is_an_error() {
        let mut config = CliConfig::default();
        let err = config
            .apply_env(lookup(&[(ENV_BATCH_SIZE, "many")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_BATCH_SIZE));
    }

    #[test]
    fn test_validate_rejects_bad_layers() {
        assert!(CliConfig::default().validate().is_ok());

        let mut config = CliConfig::default();
        config.analysis.chunker.chunk_overlap = config.analysis.chunker.chunk_size;
        assert!(config.validate().is_err());

        let mut config = CliConfig::default();
        config.openai.model.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mistyped_toml_value_is_rejected() {
        assert!(CliConfig::from_toml("[analysis]\nbatch_size = \"ten\"\n").is_err());
    }
}
