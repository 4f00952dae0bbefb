//! Analysis configuration.
//!
//! Loaded from TOML; every key is optional and unknown keys are rejected:
//!
//! ```toml
//! [builder]
//! synthesize_return_void = true
//!
//! [type_assigner]
//! max_iterations = 10000
//! split_conflicts = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default bound on worklist pops per body
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Body builder settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    /// Append `return` to void methods whose statements would fall off the end
    pub synthesize_return_void: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            synthesize_return_void: true,
        }
    }
}

/// Type assigner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeAssignerConfig {
    /// Worklist pops before giving up on a fixed point
    pub max_iterations: usize,
    /// Split locals used with incompatible types
    pub split_conflicts: bool,
}

impl Default for TypeAssignerConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            split_conflicts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub builder: BuilderConfig,
    pub type_assigner: TypeAssignerConfig,
}

impl AnalysisConfig {
    /// Parse a TOML document; missing sections and keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert!(config.builder.synthesize_return_void);
        assert_eq!(config.type_assigner.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert!(config.type_assigner.split_conflicts);
    }

    #[test]
    fn test_partial_section() {
        let config = AnalysisConfig::from_toml_str("[type_assigner]\nmax_iterations = 5\n").unwrap();
        assert_eq!(config.type_assigner.max_iterations, 5);
        assert!(config.type_assigner.split_conflicts);
        assert_eq!(config.builder, BuilderConfig::default());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = AnalysisConfig::from_toml_str("[builder]\nsynthesise = false\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{:?}", err);

        let err = AnalysisConfig::from_toml_str("[printer]\nindent = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{:?}", err);
    }
}
