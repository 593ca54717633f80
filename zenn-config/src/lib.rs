//! Shared configuration loader for the zenn markdown toolchain.
//!
//! `defaults/zenn.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`ZennConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;
use zenn_babel::formats::markdown::{ParseOptions, SerializeOptions};

const DEFAULT_TOML: &str = include_str!("../defaults/zenn.default.toml");

/// Top-level configuration consumed by zenn applications.
#[derive(Debug, Clone, Deserialize)]
pub struct ZennConfig {
    pub parse: ParseConfig,
    pub serialize: SerializeConfig,
    pub inspect: InspectConfig,
}

/// Markdown reading knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ParseConfig {
    pub embed_origin: String,
    pub front_matter: bool,
}

impl From<ParseConfig> for ParseOptions {
    fn from(config: ParseConfig) -> Self {
        ParseOptions {
            embed_origin: config.embed_origin,
            front_matter: config.front_matter,
        }
    }
}

impl From<&ParseConfig> for ParseOptions {
    fn from(config: &ParseConfig) -> Self {
        ParseOptions {
            embed_origin: config.embed_origin.clone(),
            front_matter: config.front_matter,
        }
    }
}

/// Mirrors the knobs exposed by the Markdown serializer.
#[derive(Debug, Clone, Deserialize)]
pub struct SerializeConfig {
    pub bullet_marker: char,
    pub emphasis_delimiter: char,
    pub strong_delimiter: String,
    pub horizontal_rule: String,
}

impl From<SerializeConfig> for SerializeOptions {
    fn from(config: SerializeConfig) -> Self {
        SerializeOptions {
            bullet_marker: config.bullet_marker,
            emphasis_delimiter: config.emphasis_delimiter,
            strong_delimiter: config.strong_delimiter,
            horizontal_rule: config.horizontal_rule,
        }
    }
}

impl From<&SerializeConfig> for SerializeOptions {
    fn from(config: &SerializeConfig) -> Self {
        SerializeOptions {
            bullet_marker: config.bullet_marker,
            emphasis_delimiter: config.emphasis_delimiter,
            strong_delimiter: config.strong_delimiter.clone(),
            horizontal_rule: config.horizontal_rule.clone(),
        }
    }
}

/// Controls `inspect` output.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectConfig {
    pub default_transform: String,
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

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<ZennConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<ZennConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.parse.embed_origin, "https://embed.zenn.studio");
        assert!(config.parse.front_matter);
        assert_eq!(config.inspect.default_transform, "tree-treeviz");
    }

    #[test]
    fn defaults_match_library_options() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(ParseOptions::from(&config.parse), ParseOptions::default());
        assert_eq!(
            SerializeOptions::from(config.serialize),
            SerializeOptions::default()
        );
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("serialize.bullet_marker", "*")
            .expect("override to apply")
            .set_override("parse.front_matter", false)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.serialize.bullet_marker, '*');
        assert!(!config.parse.front_matter);
    }

    #[test]
    fn layers_user_file_over_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[serialize]\nstrong_delimiter = \"__\"").expect("write config");

        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert_eq!(config.serialize.strong_delimiter, "__");
        assert_eq!(config.serialize.horizontal_rule, "---");
    }

    #[test]
    fn missing_optional_file_is_ignored() {
        let config = Loader::new()
            .with_optional_file("does/not/exist.toml")
            .build()
            .expect("config to build");
        assert_eq!(config.serialize.emphasis_delimiter, '*');
    }

    #[test]
    fn missing_required_file_fails() {
        assert!(Loader::new().with_file("does/not/exist.toml").build().is_err());
    }
}
