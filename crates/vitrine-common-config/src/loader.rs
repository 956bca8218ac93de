//! Configuration file loading and parsing.

use crate::env::EnvError;
use crate::types::VitrineConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error(transparent)]
    Env(#[from] EnvError),
}

/// Relative location of the project config file.
pub const CONFIG_FILE: &str = ".vitrine/config.yaml";

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env var pattern is valid")
    })
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the config file this loader reads and writes.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(CONFIG_FILE)
    }

    /// Load configuration from `.vitrine/config.yaml`, or defaults if the
    /// file does not exist.
    pub fn load(&self) -> Result<VitrineConfig, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(VitrineConfig::default());
        }

        Self::load_file(&config_path)
    }

    /// Load configuration from an explicit file. The file must exist.
    pub fn load_file(path: &Path) -> Result<VitrineConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let expanded = expand_env_vars(&contents)?;

        let config: VitrineConfig = serde_yaml::from_str(&expanded).map_err(|e| {
            ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            }
        })?;

        validate(&config)?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, config: &VitrineConfig) -> Result<PathBuf, ConfigError> {
        let config_path = self.config_path();
        if let Some(dir) = config_path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(&config_path, yaml)?;
        Ok(config_path)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
pub fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();

    for cap in env_var_pattern().captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}

/// Validate configuration values.
pub fn validate(config: &VitrineConfig) -> Result<(), ConfigError> {
    let templates = &config.templates;

    if templates.timeout_ms == 0 {
        return Err(ConfigError::ValidationError {
            message: "templates.timeout_ms must be greater than 0".to_string(),
        });
    }

    if templates.extension.is_empty() {
        return Err(ConfigError::ValidationError {
            message: "templates.extension must not be empty".to_string(),
        });
    }

    if templates.extension.starts_with('.') {
        return Err(ConfigError::ValidationError {
            message: "templates.extension must not start with '.'".to_string(),
        });
    }

    if config.http.connect_timeout_ms == 0 {
        return Err(ConfigError::ValidationError {
            message: "http.connect_timeout_ms must be greater than 0".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(dir: &Path, contents: &str) {
        let config_dir = dir.join(".vitrine");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("config.yaml"), contents).unwrap();
    }

    #[test]
    fn test_load_defaults_when_no_file() {
        let dir = tempdir().unwrap();
        let loader = ConfigLoader::new(dir.path());
        let config = loader.load().unwrap();
        assert_eq!(config, VitrineConfig::default());
    }

    #[test]
    fn test_load_config_from_yaml_file() {
        let dir = tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
templates:
  base_path: site/partials/
  extension: html
  max_retries: 1
  timeout_ms: 2500
http:
  user_agent: landing-bot
"#,
        );

        let config = ConfigLoader::new(dir.path()).load().unwrap();

        assert_eq!(config.templates.base_path, "site/partials/");
        assert_eq!(config.templates.extension, "html");
        assert_eq!(config.templates.max_retries, 1);
        assert_eq!(config.templates.timeout_ms, 2500);
        assert_eq!(config.http.user_agent.as_deref(), Some("landing-bot"));

        assert_eq!(config.templates.retry_delay_ms, 1000);
    }

    #[test]
    fn test_load_file_missing() {
        let dir = tempdir().unwrap();
        let result = ConfigLoader::load_file(&dir.path().join("nope.yaml"));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_env_var_expansion() {
        std::env::set_var("VITRINE_LOADER_TEST_VAR", "test_value");
        let result = expand_env_vars("key: ${VITRINE_LOADER_TEST_VAR}").unwrap();
        assert_eq!(result, "key: test_value");
        std::env::remove_var("VITRINE_LOADER_TEST_VAR");
    }

    #[test]
    fn test_env_var_default() {
        let result = expand_env_vars("key: ${VITRINE_NONEXISTENT:-default}").unwrap();
        assert_eq!(result, "key: default");
    }

    #[test]
    fn test_env_var_missing_error() {
        let result = expand_env_vars("key: ${VITRINE_MISSING_VAR}");
        match result.unwrap_err() {
            ConfigError::EnvVarNotFound { var } => assert_eq!(var, "VITRINE_MISSING_VAR"),
            other => panic!("Expected EnvVarNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_env_var_expansion_in_config() {
        std::env::set_var("VITRINE_LOADER_CDN", "https://cdn.example.com/");

        let dir = tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
templates:
  base_path: ${VITRINE_LOADER_CDN}
  timeout_ms: ${VITRINE_LOADER_TIMEOUT:-750}
"#,
        );

        let config = ConfigLoader::new(dir.path()).load().unwrap();
        assert_eq!(config.templates.base_path, "https://cdn.example.com/");
        assert_eq!(config.templates.timeout_ms, 750);

        std::env::remove_var("VITRINE_LOADER_CDN");
    }

    #[test]
    fn test_validation_errors() {
        let mut config = VitrineConfig::default();
        config.templates.timeout_ms = 0;
        match validate(&config).unwrap_err() {
            ConfigError::ValidationError { message } => assert!(message.contains("timeout_ms")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }

        let mut config = VitrineConfig::default();
        config.templates.extension = ".hbs".to_string();
        match validate(&config).unwrap_err() {
            ConfigError::ValidationError { message } => assert!(message.contains("extension")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }

        let mut config = VitrineConfig::default();
        config.templates.extension.clear();
        assert!(validate(&config).is_err());

        // Zero retries is a valid single-attempt policy.
        let mut config = VitrineConfig::default();
        config.templates.max_retries = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_parse_error_with_line_number() {
        let dir = tempdir().unwrap();
        write_config(
            dir.path(),
            r#"
templates:
  base_path: templates/
  invalid_yaml: [unclosed
"#,
        );

        match ConfigLoader::new(dir.path()).load().unwrap_err() {
            ConfigError::ParseError { line, .. } => assert!(line.is_some()),
            other => panic!("Expected ParseError with line number, got {:?}", other),
        }
    }

    #[test]
    fn test_save_config() {
        let dir = tempdir().unwrap();
        let loader = ConfigLoader::new(dir.path());

        let mut config = VitrineConfig::default();
        config.templates.base_path = "https://example.com/t/".to_string();
        config.templates.max_retries = 5;

        let path = loader.save(&config).unwrap();
        assert_eq!(path, dir.path().join(".vitrine/config.yaml"));
        assert!(path.exists());

        let loaded = loader.load().unwrap();
        assert_eq!(loaded, config);
    }
}
