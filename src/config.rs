// WHY: Selects the language and which built-in passes run, from defaults, a JSON file and CLI flags
// Missing keys fall back to the defaults so partial config files stay valid

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Configuration for the preprocessing pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessorConfig {
    /// Language code used to pick spacing rules
    pub language: String,
    /// Turn XML tags and comments into tag tokens
    pub xml_tags: bool,
    /// Replace character entities in the working text
    pub unescape_entities: bool,
    /// Collapse whitespace runs to a single space
    pub normalize_whitespace: bool,
    /// Mark words and punctuation
    pub tokenize: bool,
    /// Idle builders kept between inputs
    pub pool_size: usize,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            xml_tags: true,
            unescape_entities: true,
            normalize_whitespace: true,
            tokenize: true,
            pool_size: 8,
        }
    }
}

impl PreprocessorConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"language": "fr", "xml_tags": false}}"#).unwrap();

        let config = PreprocessorConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.language, "fr");
        assert!(!config.xml_tags);
        assert!(config.tokenize);
        assert_eq!(config.pool_size, 8);
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = PreprocessorConfig::from_json_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = PreprocessorConfig::from_json_file("/nonexistent/textprep.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
