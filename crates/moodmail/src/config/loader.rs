use std::path::{Path, PathBuf};

use secrecy::SecretString;

use crate::config::schema::{ClassifierConfig, Config, DatabaseConfig, LogFormat};
use crate::error::ConfigError;
use crate::secrets::resolve_secret_optional;

/// Environment variable naming a JSON config file.
pub const CONFIG_PATH_ENV_VAR: &str = "MOODMAIL_CONFIG";

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

/// Overlays environment variables onto `config`. `lookup` is normally
/// `std::env::var(..).ok()`.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("HOST") {
        config.server.host = host;
    }
    if let Some(port) = lookup("PORT") {
        config.server.port = port.trim().parse().map_err(|_| ConfigError::Validation {
            message: format!("PORT must be a number between 1 and 65535, got '{}'", port),
        })?;
    }
    if let Some(path) = lookup("DATABASE_PATH") {
        config.database.path = Some(PathBuf::from(path));
    }
    if let Some(url) = lookup("CLASSIFIER_URL") {
        config.classifier.base_url = url;
    }
    if let Some(model) = lookup("CLASSIFIER_MODEL") {
        config.classifier.model = model;
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = lookup("LOG_FORMAT") {
        config.logging.format = match format.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            other => {
                return Err(ConfigError::Validation {
                    message: format!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
                })
            }
        };
    }
    Ok(())
}

/// Loads the effective configuration: the JSON file at `path` (or the
/// `MOODMAIL_CONFIG` path, or built-in defaults), then environment
/// overrides.
pub fn resolve_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let from_env = std::env::var(CONFIG_PATH_ENV_VAR).ok().map(PathBuf::from);
    let mut config = match path.map(Path::to_path_buf).or(from_env) {
        Some(path) => {
            log::info!("Loading config from {}", path.display());
            load_config(&path)?
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::Validation {
            message: "server.port must not be 0".to_string(),
        });
    }

    if config.classifier.model.trim().is_empty() {
        return Err(ConfigError::Validation {
            message: "classifier.model must not be empty".to_string(),
        });
    }

    let url = config.classifier.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::Validation {
            message: format!("classifier.baseUrl must be an http(s) URL, got '{}'", url),
        });
    }

    Ok(())
}

impl ClassifierConfig {
    /// Resolves the API token. A missing token is allowed; requests are
    /// then sent without credentials.
    pub fn resolve_token(&self) -> Result<Option<SecretString>, ConfigError> {
        let token = resolve_secret_optional(
            self.token.as_deref(),
            self.token_file.as_deref(),
            self.token_env_var.as_deref(),
        )?;
        if token.is_none() {
            log::warn!("No classifier token configured; calling {} anonymously", self.base_url);
        }
        Ok(token)
    }
}

impl DatabaseConfig {
    /// Configured path, or the per-user default.
    pub fn resolved_path(&self) -> Result<PathBuf, ConfigError> {
        self.path
            .clone()
            .or_else(crate::db::default_database_path)
            .ok_or_else(|| ConfigError::Validation {
                message: "database.path is not set and no home directory was found".to_string(),
            })
    }
}
