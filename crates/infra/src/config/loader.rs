//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Seed the process environment from `.env` if one exists
//! 2. Load from environment variables when `ADOPTLY_API_BASE_URL` is set
//! 3. Otherwise load the first config file found by [`probe_config_paths`]
//! 4. Otherwise use the built-in defaults
//!
//! Whatever the source, the result goes through [`validate`].
//!
//! ## Environment Variables
//! - `ADOPTLY_API_BASE_URL`: Backend base URL (required for env loading)
//! - `ADOPTLY_API_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `ADOPTLY_DEDUPE_INTERVAL_MS`: Dedupe window for both caches
//! - `ADOPTLY_ERROR_RETRY_COUNT`: Retries after a failed fetch, both caches
//! - `ADOPTLY_ERROR_RETRY_INTERVAL_MS`: Base retry delay, both caches
//! - `ADOPTLY_REVALIDATE_ON_FOCUS`: Dashboard focus revalidation (true/false)
//! - `ADOPTLY_LOG_FORMAT`: `plain` or `json`
//! - `ADOPTLY_LOG_FILTER`: Filter used when `RUST_LOG` is unset
//!
//! ## File Locations
//! `adoptly.toml`, `adoptly.json`, `config.toml` and `config.json`, looked
//! up in the working directory, its two parents, and the executable's
//! directory.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use adoptly_domain::{Config, ConfigError, ConfigResult, LogFormat};
use url::Url;

const CONFIG_FILE_NAMES: [&str; 4] = ["adoptly.toml", "adoptly.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback
///
/// # Errors
/// Returns [`ConfigError`] if a source that is present holds invalid
/// values. Missing sources fall through to the next one.
pub fn load() -> ConfigResult<Config> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Seeded environment from .env");
    }

    let config = match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            config
        }
        Err(ConfigError::Missing(key)) => {
            tracing::debug!(%key, "Environment incomplete, trying config file");
            match load_from_file(None) {
                Ok(config) => config,
                Err(ConfigError::NotFound(_)) => {
                    tracing::info!("No configuration found, using defaults");
                    Config::default()
                }
                Err(err) => return Err(err),
            }
        }
        Err(err) => return Err(err),
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration from environment variables
///
/// Only `ADOPTLY_API_BASE_URL` is required; every other variable overrides
/// the matching default when set.
///
/// # Errors
/// [`ConfigError::Missing`] without a base URL, [`ConfigError::Invalid`]
/// when a variable does not parse.
pub fn load_from_env() -> ConfigResult<Config> {
    let mut config = Config::default();
    config.api.base_url = env_var("ADOPTLY_API_BASE_URL")?;

    if let Some(timeout) = env_parse::<u64>("ADOPTLY_API_TIMEOUT_SECS")? {
        config.api.timeout_secs = timeout;
    }

    let dedupe = env_parse::<u64>("ADOPTLY_DEDUPE_INTERVAL_MS")?;
    let retry_count = env_parse::<u32>("ADOPTLY_ERROR_RETRY_COUNT")?;
    let retry_interval = env_parse::<u64>("ADOPTLY_ERROR_RETRY_INTERVAL_MS")?;
    for cache in [&mut config.dashboard_cache, &mut config.recommendation_cache] {
        if let Some(dedupe) = dedupe {
            cache.dedupe_interval_ms = dedupe;
        }
        if let Some(count) = retry_count {
            cache.error_retry_count = count;
        }
        if let Some(interval) = retry_interval {
            cache.error_retry_interval_ms = interval;
        }
    }

    config.dashboard_cache.revalidate_on_focus =
        env_bool("ADOPTLY_REVALIDATE_ON_FOCUS", config.dashboard_cache.revalidate_on_focus);

    if let Some(format) = env_parse::<LogFormat>("ADOPTLY_LOG_FORMAT")? {
        config.logging.format = format;
    }
    if let Ok(filter) = std::env::var("ADOPTLY_LOG_FILTER") {
        config.logging.filter = filter;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. The format is picked
/// from the extension; fields left out keep their defaults.
///
/// # Errors
/// [`ConfigError::NotFound`] when there is no file, [`ConfigError::Io`] or
/// [`ConfigError::Parse`] when it cannot be read.
pub fn load_from_file(path: Option<PathBuf>) -> ConfigResult<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound(p.display().to_string()));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConfigError::NotFound("no config file in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents =
        std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io(e.to_string()))?;

    parse_config(&contents, &config_path)
}

/// Check values no source can be trusted with
///
/// # Errors
/// [`ConfigError::Invalid`] for a base URL that is not absolute http(s), or
/// a zero timeout.
pub fn validate(config: &Config) -> ConfigResult<()> {
    let base_url = Url::parse(config.api.base_url.trim())
        .map_err(|e| invalid("api.base_url", e.to_string()))?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(invalid("api.base_url", format!("unsupported scheme {}", base_url.scheme())));
    }
    if config.api.timeout_secs == 0 {
        return Err(invalid("api.timeout_secs", "must be greater than zero".into()));
    }
    Ok(())
}

/// First existing config file in the standard locations
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend(cwd.ancestors().take(3).map(Path::to_path_buf));
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn parse_config(contents: &str, path: &Path) -> ConfigResult<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| ConfigError::Parse { format: "TOML", message: e.to_string() }),
        "json" => serde_json::from_str(contents)
            .map_err(|e| ConfigError::Parse { format: "JSON", message: e.to_string() }),
        other => Err(ConfigError::Parse {
            format: "config",
            message: format!("unsupported extension {other}"),
        }),
    }
}

fn env_var(key: &str) -> ConfigResult<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key.to_owned())),
    }
}

/// Parse an optional environment variable; unset means `None`
fn env_parse<T>(key: &str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| invalid(key, e.to_string())),
        Err(_) => Ok(None),
    }
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn invalid(key: &str, message: String) -> ConfigError {
    ConfigError::Invalid { key: key.to_owned(), message }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use adoptly_domain::CacheSettings;
    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: [&str; 8] = [
        "ADOPTLY_API_BASE_URL",
        "ADOPTLY_API_TIMEOUT_SECS",
        "ADOPTLY_DEDUPE_INTERVAL_MS",
        "ADOPTLY_ERROR_RETRY_COUNT",
        "ADOPTLY_ERROR_RETRY_INTERVAL_MS",
        "ADOPTLY_REVALIDATE_ON_FOCUS",
        "ADOPTLY_LOG_FORMAT",
        "ADOPTLY_LOG_FILTER",
    ];

    fn clear_env() {
        for key in VARS {
            std::env::remove_var(key);
        }
    }

    fn write_config(contents: &str, extension: &str) -> (NamedTempFile, PathBuf) {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        let path = temp_file.path().with_extension(extension);
        std::fs::copy(temp_file.path(), &path).unwrap();
        (temp_file, path)
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for (value, expected) in [("1", true), ("YES", true), ("on", true), ("0", false)] {
            std::env::set_var("ADOPTLY_TEST_BOOL", value);
            assert_eq!(env_bool("ADOPTLY_TEST_BOOL", !expected), expected, "{value}");
        }
        std::env::remove_var("ADOPTLY_TEST_BOOL");
        assert!(env_bool("ADOPTLY_TEST_BOOL", true));
    }

    #[test]
    fn test_load_from_env_overrides_defaults() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("ADOPTLY_API_BASE_URL", "https://api.adoptly.test");
        std::env::set_var("ADOPTLY_API_TIMEOUT_SECS", "10");
        std::env::set_var("ADOPTLY_ERROR_RETRY_COUNT", "5");
        std::env::set_var("ADOPTLY_REVALIDATE_ON_FOCUS", "off");
        std::env::set_var("ADOPTLY_LOG_FORMAT", "JSON");

        let config = load_from_env().expect("config from env");
        clear_env();

        assert_eq!(config.api.base_url, "https://api.adoptly.test");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.dashboard_cache.error_retry_count, 5);
        assert_eq!(config.recommendation_cache.error_retry_count, 5);
        assert!(!config.dashboard_cache.revalidate_on_focus);
        assert_eq!(
            config.recommendation_cache.stale_after_ms,
            CacheSettings::recommendation().stale_after_ms
        );
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_from_env_missing_base_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("ADOPTLY_API_TIMEOUT_SECS", "10");
        let result = load_from_env();
        clear_env();

        assert_eq!(result, Err(ConfigError::Missing("ADOPTLY_API_BASE_URL".into())));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("ADOPTLY_API_BASE_URL", "http://localhost:8000");
        std::env::set_var("ADOPTLY_DEDUPE_INTERVAL_MS", "soon");
        let result = load_from_env();
        clear_env();

        assert!(
            matches!(
                result,
                Err(ConfigError::Invalid { ref key, .. }) if key == "ADOPTLY_DEDUPE_INTERVAL_MS"
            ),
            "got {result:?}"
        );
    }

    #[test]
    fn test_load_from_file_toml_keeps_defaults_for_missing_fields() {
        let (_temp, path) = write_config(
            r#"
[api]
base_url = "https://api.adoptly.test"

[recommendation_cache]
error_retry_count = 1
revalidate_on_focus = false
stale_after_ms = 30000
"#,
            "toml",
        );

        let config = load_from_file(Some(path.clone())).expect("config from TOML");
        std::fs::remove_file(path).ok();

        assert_eq!(config.api.base_url, "https://api.adoptly.test");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.dashboard_cache, CacheSettings::dashboard());
        assert_eq!(config.recommendation_cache.error_retry_count, 1);
        assert_eq!(config.recommendation_cache.stale_after_ms, Some(30_000));
    }

    #[test]
    fn test_load_from_file_json() {
        let (_temp, path) = write_config(
            r#"{"api": {"base_url": "http://127.0.0.1:9000", "timeout_secs": 3},
                "logging": {"format": "json"}}"#,
            "json",
        );

        let config = load_from_file(Some(path.clone())).expect("config from JSON");
        std::fs::remove_file(path).ok();

        assert_eq!(config.api.timeout_secs, 3);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_from_file_errors() {
        let missing = load_from_file(Some(PathBuf::from("/nonexistent/adoptly.toml")));
        assert!(matches!(missing, Err(ConfigError::NotFound(_))));

        let (_temp, path) = write_config(r#"{ "api": "#, "json");
        let broken = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();
        assert!(matches!(broken, Err(ConfigError::Parse { format: "JSON", .. })));

        let unsupported = parse_config("a: 1", Path::new("adoptly.yaml"));
        assert!(matches!(unsupported, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validate() {
        assert_eq!(validate(&Config::default()), Ok(()));

        let mut config = Config::default();
        config.api.base_url = "ftp://files.adoptly.test".into();
        assert!(matches!(validate(&config), Err(ConfigError::Invalid { .. })));

        let mut config = Config::default();
        config.api.base_url = "localhost".into();
        assert!(validate(&config).is_err());

        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert_eq!(
            validate(&config),
            Err(ConfigError::Invalid {
                key: "api.timeout_secs".into(),
                message: "must be greater than zero".into()
            })
        );
    }
}
