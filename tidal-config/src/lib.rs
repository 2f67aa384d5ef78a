//! Shared configuration loader for tidal.
//!
//! `defaults/tidal.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`TidalConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use tidal::Limit;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/tidal.default.toml");

/// Top-level configuration consumed by tidal applications.
#[derive(Debug, Clone, Deserialize)]
pub struct TidalConfig {
    pub build: BuildConfig,
    pub output: OutputConfig,
}

/// How sequences are built.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub limit: Option<i64>,
    pub nest: bool,
    pub max_snapshots: usize,
}

impl BuildConfig {
    /// The configured limit; negative values stream forever.
    pub fn limit(&self) -> Option<Limit> {
        self.limit.map(Limit::from_signed)
    }

    /// Output cap, `None` when disabled.
    pub fn max_snapshots(&self) -> Option<usize> {
        (self.max_snapshots > 0).then_some(self.max_snapshots)
    }
}

/// How snapshots are written.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub pretty: bool,
    pub separator: String,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<TidalConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<TidalConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.build.limit(), None);
        assert!(config.build.nest);
        assert_eq!(config.build.max_snapshots(), Some(1000));
        assert!(!config.output.pretty);
        assert_eq!(config.output.separator, "\n");
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("build.limit", -1)
            .expect("override to apply")
            .set_override("build.max_snapshots", 0)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.build.limit(), Some(Limit::Unbounded));
        assert_eq!(config.build.max_snapshots(), None);
    }

    #[test]
    fn layers_user_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tidal.toml");
        let mut file = std::fs::File::create(&path).expect("temp file");
        writeln!(file, "[build]\nlimit = 3\n\n[output]\npretty = true").expect("write");

        let config = Loader::new().with_file(&path).build().expect("config to build");

        assert_eq!(config.build.limit(), Some(Limit::Count(3)));
        assert!(config.build.nest);
        assert!(config.output.pretty);
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("/definitely/not/here.toml")
            .build()
            .expect("config to build");
        assert!(config.build.nest);
    }
}
