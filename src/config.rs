//! Scan options and verifier configuration.
//!
//! The parsing core holds no global state. Anything a caller wants to tune
//! is passed in explicitly through these values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How a harness's enclosing module path is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModulePathStrategy {
    /// Reverse index from module name to nested function names. Same-named
    /// functions in unrelated modules share one concatenated path.
    #[default]
    ReverseIndex,
    /// The real outer-to-inner chain of modules enclosing each function.
    AncestorChain,
}

impl std::str::FromStr for ModulePathStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reverse-index" => Ok(ModulePathStrategy::ReverseIndex),
            "ancestor-chain" => Ok(ModulePathStrategy::AncestorChain),
            _ => Err(format!(
                "Unknown module path strategy: {}. Expected: reverse-index, ancestor-chain",
                s
            )),
        }
    }
}

/// Options for one scan pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    pub module_paths: ModulePathStrategy,
}

/// Where and how to invoke the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Path to the `cargo-kani` binary.
    pub cargo_kani: PathBuf,
    /// Package passed with `-p`, if any.
    pub package: Option<String>,
    /// Appended verbatim after the generated arguments.
    pub extra_args: Vec<String>,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        VerifierConfig {
            cargo_kani: PathBuf::from("cargo-kani"),
            package: None,
            extra_args: Vec::new(),
        }
    }
}

impl VerifierConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "ancestor-chain".parse::<ModulePathStrategy>(),
            Ok(ModulePathStrategy::AncestorChain)
        );
        assert_eq!(
            "Reverse-Index".parse::<ModulePathStrategy>(),
            Ok(ModulePathStrategy::ReverseIndex)
        );
        assert!("sideways".parse::<ModulePathStrategy>().is_err());
    }

    #[test]
    fn test_config_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "package": "my-crate" }}"#).unwrap();

        let config = VerifierConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.package.as_deref(), Some("my-crate"));
        assert_eq!(config.cargo_kani, PathBuf::from("cargo-kani"));
        assert!(config.extra_args.is_empty());
    }

    #[test]
    fn test_config_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = VerifierConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
