//! Validation policy configuration.
//!
//! Defines the YAML-serializable settings that control which packages are
//! validated and how deprecated properties are treated.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! exclude:
//!   - legacy-agent
//! deprecated: warn
//! fail_fast: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How packages setting a deprecated property are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeprecatedPolicy {
    /// Accept silently.
    Allow,
    /// Accept, but record a warning in the report (the default).
    #[default]
    Warn,
    /// Reject the package.
    Deny,
}

/// Top-level validation configuration.
///
/// Loaded from a YAML file (typically `.package-model.yml` next to the
/// package documents). Every key except `version` is optional.
///
/// # Examples
///
/// ```
/// use package_model_db::{DeprecatedPolicy, ValidationConfig};
///
/// let config: ValidationConfig = serde_yaml::from_str("version: \"1.0\"").unwrap();
/// assert!(config.exclude.is_empty());
/// assert_eq!(config.deprecated, DeprecatedPolicy::Warn);
/// assert!(!config.fail_fast);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Package names to skip entirely.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Treatment of deprecated properties.
    #[serde(default)]
    pub deprecated: DeprecatedPolicy,
    /// Stop at the first package that fails validation.
    #[serde(default)]
    pub fail_fast: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            exclude: Vec::new(),
            deprecated: DeprecatedPolicy::default(),
            fail_fast: false,
        }
    }
}

impl ValidationConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CatalogError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::CatalogError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CatalogError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::CatalogError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns `true` if `package` is in the exclusion list.
    pub fn is_excluded(&self, package: &str) -> bool {
        self.exclude.iter().any(|p| p == package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
exclude:
  - legacy-agent
  - old-tools
deprecated: deny
fail_fast: true
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: ValidationConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.exclude, vec!["legacy-agent", "old-tools"]);
        assert_eq!(config.deprecated, DeprecatedPolicy::Deny);
        assert!(config.fail_fast);
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: ValidationConfig = serde_yaml::from_str("version: \"1.0\"\n").unwrap();
        assert_eq!(config, ValidationConfig::default());
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let yaml = "version: \"1.0\"\ndeprecated: sometimes\n";
        assert!(serde_yaml::from_str::<ValidationConfig>(yaml).is_err());
    }

    #[test]
    fn test_is_excluded() {
        let config: ValidationConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert!(config.is_excluded("legacy-agent"));
        assert!(!config.is_excluded("httpd"));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");

        let original: ValidationConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = ValidationConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
