//! Secret resolution for the classifier API token.
//!
//! A token can come from three places, checked in this order:
//!
//! 1. **Direct value** in the config file (`token`)
//! 2. **File reference** for mounted secrets (`tokenFile: /run/secrets/hf_token`)
//! 3. **Env var reference** (`tokenEnvVar: HUGGINGFACE_API_TOKEN`)

use secrecy::SecretString;
use std::fs;

/// Error type for secret resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No secret source provided (need one of: direct value, file path, or env var name)")]
    NoSourceProvided,

    #[error("Failed to read secret from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{name}' not set")]
    EnvVarNotSet { name: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

/// Result type for secret resolution.
pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves a secret from the first non-empty source: direct value, then
/// file contents, then environment variable.
///
/// # Examples
///
/// ```ignore
/// use moodmail::secrets::resolve_secret;
///
/// let token = resolve_secret(None, Some("/run/secrets/hf_token"), Some("HUGGINGFACE_API_TOKEN"))?;
/// ```
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<SecretString> {
    if let Some(value) = direct {
        if !value.is_empty() {
            return Ok(SecretString::from(value.to_string()));
        }
    }

    if let Some(path) = file_path {
        if !path.is_empty() {
            let expanded = expand_home(path);
            return match fs::read_to_string(&expanded) {
                Ok(content) => Ok(SecretString::from(content.trim().to_string())),
                Err(e) => Err(SecretError::FileReadError {
                    path: expanded,
                    source: e,
                }),
            };
        }
    }

    if let Some(var_name) = env_var {
        if !var_name.is_empty() {
            return match std::env::var(var_name) {
                // Env files often leave a trailing newline.
                Ok(value) => Ok(SecretString::from(value.trim())),
                Err(std::env::VarError::NotPresent) => Err(SecretError::EnvVarNotSet {
                    name: var_name.to_string(),
                }),
                Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
                    name: var_name.to_string(),
                }),
            };
        }
    }

    Err(SecretError::NoSourceProvided)
}

/// Resolves a secret, returning `None` if no source is provided or the
/// referenced environment variable is unset.
pub fn resolve_secret_optional(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: Option<&str>,
) -> Result<Option<SecretString>> {
    match resolve_secret(direct, file_path, env_var) {
        Ok(secret) => Ok(Some(secret)),
        Err(SecretError::NoSourceProvided) | Err(SecretError::EnvVarNotSet { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Expands a leading `~` to the user's home directory. `~user/path` is not
/// supported.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            let home = home.to_string_lossy();
            if path == "~" {
                return home.into_owned();
            }
            return path.replacen('~', &home, 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // Tests that modify environment variables must run serially to avoid race conditions
    #[test]
    #[serial]
    fn test_direct_value_takes_priority() {
        std::env::set_var("MOODMAIL_TEST_SECRET_1", "env_value");
        let result =
            resolve_secret(Some("direct_value"), None, Some("MOODMAIL_TEST_SECRET_1")).unwrap();
        assert_eq!(result.expose_secret(), "direct_value");
        std::env::remove_var("MOODMAIL_TEST_SECRET_1");
    }

    #[test]
    #[serial]
    fn test_file_takes_priority_over_env() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "file_value").unwrap();

        std::env::set_var("MOODMAIL_TEST_SECRET_2", "env_value");
        let result = resolve_secret(
            None,
            Some(temp_file.path().to_str().unwrap()),
            Some("MOODMAIL_TEST_SECRET_2"),
        )
        .unwrap();
        assert_eq!(result.expose_secret(), "file_value");
        std::env::remove_var("MOODMAIL_TEST_SECRET_2");
    }

    #[test]
    #[serial]
    fn test_env_var_fallback() {
        std::env::set_var("MOODMAIL_TEST_SECRET_3", "  env_value\n");
        let result = resolve_secret(None, None, Some("MOODMAIL_TEST_SECRET_3")).unwrap();
        assert_eq!(result.expose_secret(), "env_value");
        std::env::remove_var("MOODMAIL_TEST_SECRET_3");
    }

    #[test]
    fn test_no_source_error() {
        let result = resolve_secret(None, None, None);
        assert!(matches!(result, Err(SecretError::NoSourceProvided)));
    }

    #[test]
    fn test_file_not_found_error() {
        let result = resolve_secret(None, Some("/nonexistent/path/to/secret"), None);
        assert!(matches!(result, Err(SecretError::FileReadError { .. })));
    }

    #[test]
    fn test_optional_treats_unset_env_as_absent() {
        let result =
            resolve_secret_optional(None, None, Some("MOODMAIL_DEFINITELY_NOT_SET_12345")).unwrap();
        assert!(result.is_none());
        assert!(resolve_secret_optional(None, None, None).unwrap().is_none());
    }

    #[test]
    fn test_optional_still_reports_unreadable_file() {
        let result = resolve_secret_optional(None, Some("/nonexistent/secret"), None);
        assert!(matches!(result, Err(SecretError::FileReadError { .. })));
    }

    #[test]
    fn test_expand_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_home("~"), home.to_string_lossy());
        assert_eq!(
            expand_home("~/secrets/token"),
            format!("{}/secrets/token", home.to_string_lossy())
        );
        assert_eq!(expand_home("/abs/path"), "/abs/path");
    }
}
