//! Configuration types for EDITS components.
//!
//! Defaults are hardcoded; `FetchConfig::from_env` lets the provider concurrency be
//! tuned through `EDITS_FETCH_CONCURRENCY`. Provider records themselves are read from
//! a YAML list, by default `providers.yaml` in the working directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_yaml::Value;

use crate::error::AppError;

/// File name of the provider list.
pub const PROVIDERS_FILE: &str = "providers.yaml";

/// Environment variable overriding [`FetchConfig::concurrency`].
pub const CONCURRENCY_ENV: &str = "EDITS_FETCH_CONCURRENCY";

/// HTTP client configuration for retrieving provider files.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("edits/{} (metadata-harvester)", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Fetch pipeline configuration.
///
/// `concurrency` bounds how many providers are fetched at once. Files of a
/// single provider are always fetched one after the other.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

impl FetchConfig {
    /// Builds a config from defaults, overridden by `EDITS_FETCH_CONCURRENCY` when set.
    ///
    /// Unparseable or zero values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(CONCURRENCY_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => config.concurrency = n,
                _ => tracing::warn!("Ignoring invalid {}={:?}", CONCURRENCY_ENV, raw),
            }
        }
        config
    }
}

/// Returns the default location of the provider list.
///
/// `./providers.yaml` when it exists, otherwise `<config dir>/edits/providers.yaml`
/// (e.g. `~/.config/edits/providers.yaml` on Linux).
pub fn default_providers_path() -> Option<PathBuf> {
    let local = PathBuf::from(PROVIDERS_FILE);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir().map(|p| p.join("edits").join(PROVIDERS_FILE))
}

/// Reads the raw provider records from a YAML file.
///
/// The file must contain a YAML sequence; an empty file yields no entries.
/// Records are returned unvalidated, see [`crate::registry::load_providers`].
pub fn load_provider_entries(path: &Path) -> Result<Vec<Value>, AppError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AppError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
    })?;
    parse_provider_entries(&content, &path.display().to_string())
}

/// Parses the raw provider records from YAML text.
pub fn parse_provider_entries(content: &str, origin: &str) -> Result<Vec<Value>, AppError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_yaml::from_str(content)
        .map_err(|e| AppError::ConfigError(format!("Invalid YAML in {}: {}", origin, e)))?;

    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(entries) => Ok(entries),
        _ => Err(AppError::ConfigError(format!(
            "{} must contain a list of provider entries",
            origin
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("edits/"));
    }

    #[test]
    fn test_fetch_config_defaults() {
        let config = FetchConfig::default();
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn test_load_provider_entries_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "- id: acme\n  contact: {{name: A, email: a@example.org}}\n  files: [https://x/a.yaml]\n- id: other\n"
        )
        .unwrap();

        let entries = load_provider_entries(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["id"].as_str(), Some("acme"));
    }

    #[test]
    fn test_load_provider_entries_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_provider_entries(&dir.path().join("nope.yaml"));
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_parse_provider_entries_empty() {
        assert!(parse_provider_entries("", "providers.yaml").unwrap().is_empty());
    }

    #[test]
    fn test_parse_provider_entries_not_a_list() {
        let result = parse_provider_entries("id: acme\n", "providers.yaml");
        assert!(matches!(result, Err(AppError::ConfigError(msg)) if msg.contains("list")));
    }
}
