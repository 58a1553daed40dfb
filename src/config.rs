//! Import configuration, read from YAML.
//!
//! ```yaml
//! import:
//!   classes_as_nodes: true
//!   overwrite: true
//!   streaming_threshold: 100MB
//! logger:
//!   level: debug
//!   format: json
//! ```
//!
//! Every key is optional; missing ones take the defaults below.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use byte_unit::Byte;
use serde::{Deserialize, Serialize};

use crate::ontology::vocabulary::DUO_NAMESPACE;
use crate::ontology::Duo;
use crate::{Error, Result};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub import: ImportSettings,
    #[serde(default)]
    pub logger: LoggerSettings,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|err| {
            Error::Configuration(format!("cannot read `{}`: {err}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|err| Error::Configuration(format!("invalid configuration: {err}")))?;
        config.import.validate()?;
        Ok(config)
    }
}

/// Switches and limits of one import run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImportSettings {
    pub import_vocabularies: bool,
    pub import_nodes: bool,
    /// Also create nodes for the classes below each bundle class.
    pub classes_as_nodes: bool,
    /// With `classes_as_nodes`, only leaf classes become nodes.
    pub only_leaf_classes_as_nodes: bool,
    /// Replace nodes and vocabularies that already exist in the store.
    pub overwrite: bool,
    /// Ontologies larger than this are streamed instead of loaded.
    pub streaming_threshold: String,
    /// Namespace of the anchor classes and marker properties.
    pub namespace: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            import_vocabularies: true,
            import_nodes: true,
            classes_as_nodes: false,
            only_leaf_classes_as_nodes: false,
            overwrite: false,
            streaming_threshold: "100MB".to_string(),
            namespace: DUO_NAMESPACE.to_string(),
        }
    }
}

impl ImportSettings {
    /// Rejects settings that cannot be interpreted, before any work starts.
    pub fn validate(&self) -> Result<()> {
        self.threshold_bytes()?;
        self.duo()?;
        Ok(())
    }

    pub fn threshold_bytes(&self) -> Result<u64> {
        let byte = Byte::from_str(self.streaming_threshold.trim()).map_err(|err| {
            Error::Configuration(format!(
                "invalid streaming threshold `{}`: {err}",
                self.streaming_threshold
            ))
        })?;
        u64::try_from(byte.get_bytes()).map_err(|_| {
            Error::Configuration(format!(
                "streaming threshold `{}` is too large",
                self.streaming_threshold
            ))
        })
    }

    pub fn duo(&self) -> Result<Duo> {
        Duo::with_namespace(&self.namespace).map_err(|err| {
            Error::Configuration(format!("invalid namespace `{}`: {err}", self.namespace))
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerSettings {
    pub enable: bool,
    pub level: LogLevel,
    pub format: LogFormat,
    /// Also write the log to this file, as the progress view tails it.
    pub file: Option<PathBuf>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            enable: true,
            level: LogLevel::Info,
            format: LogFormat::Compact,
            file: None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Config, ImportSettings, LogFormat, LogLevel};
    use crate::Error;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_yaml("{}").expect("valid config");
        assert_eq!(config.import, ImportSettings::default());
        assert_eq!(config.import.threshold_bytes().expect("threshold"), 100_000_000);
        assert_eq!(config.logger.level, LogLevel::Info);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::from_yaml(
            "import:\n  overwrite: true\n  classes_as_nodes: true\nlogger:\n  format: json\n",
        )
        .expect("valid config");
        assert!(config.import.overwrite);
        assert!(config.import.classes_as_nodes);
        assert!(config.import.import_nodes);
        assert_eq!(config.logger.format, LogFormat::Json);
    }

    #[rstest]
    #[case("100MB", 100_000_000)]
    #[case("1KiB", 1_024)]
    #[case("512", 512)]
    fn thresholds_are_human_readable(#[case] threshold: &str, #[case] expected: u64) {
        let settings = ImportSettings {
            streaming_threshold: threshold.to_string(),
            ..ImportSettings::default()
        };
        assert_eq!(settings.threshold_bytes().expect("threshold"), expected);
    }

    #[rstest]
    #[case("import:\n  streaming_threshold: lots\n")]
    #[case("import:\n  namespace: \"not an iri\"\n")]
    #[case("import:\n  overwrite: maybe\n")]
    #[case("logger:\n  level: loud\n")]
    #[case("import: [1, 2\n")]
    fn invalid_settings_are_configuration_errors(#[case] yaml: &str) {
        let err = Config::from_yaml(yaml).expect_err("invalid");
        assert!(matches!(err, Error::Configuration(_)));
    }
}
