use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub directory: DirectoryConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
  /// Base url of the directory service; `/api/projects` is appended
  pub url: String,
  /// Per-request timeout
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// When false every query fetches the full list from the directory
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Absolute lifetime of the project snapshot
  #[serde(default = "default_ttl_secs")]
  pub ttl_secs: u64,
  /// Let concurrent queries that miss share a single directory fetch
  #[serde(default)]
  pub coalesce_fetches: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      ttl_secs: default_ttl_secs(),
      coalesce_fetches: false,
    }
  }
}

impl CacheConfig {
  pub fn ttl(&self) -> Duration {
    Duration::from_secs(self.ttl_secs)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
  /// Default filter directive; `RUST_LOG` takes precedence
  #[serde(default = "default_level", deserialize_with = "deserialize_lowercase")]
  pub level: String,
  /// Write daily-rotated log files here instead of stderr
  pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_level(),
      dir: None,
    }
  }
}

fn default_timeout_secs() -> u64 {
  30
}

fn default_ttl_secs() -> u64 {
  600
}

fn default_true() -> bool {
  true
}

fn default_level() -> String {
  "info".to_string()
}

fn deserialize_lowercase<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let s = String::deserialize(deserializer)?;
  Ok(s.trim().to_lowercase())
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./catalog.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/project-catalog/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/project-catalog/config.yaml"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("catalog.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("project-catalog").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;

    if config.cache.enabled && config.cache.ttl_secs == 0 {
      return Err(eyre!("cache.ttl_secs must be positive while the cache is enabled"));
    }

    Ok(config)
  }

  /// Get the directory API token from environment variables.
  ///
  /// Checks CATALOG_DIRECTORY_TOKEN first, then DIRECTORY_API_TOKEN as
  /// fallback. No token means anonymous requests.
  pub fn get_api_token() -> Option<String> {
    std::env::var("CATALOG_DIRECTORY_TOKEN")
      .or_else(|_| std::env::var("DIRECTORY_API_TOKEN"))
      .ok()
      .filter(|token| !token.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = Config::parse("directory:\n  url: http://directory.local\n").unwrap();
    assert_eq!(config.directory.timeout_secs, 30);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.ttl(), Duration::from_secs(600));
    assert!(!config.cache.coalesce_fetches);
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.dir.is_none());
  }

  #[test]
  fn test_full_config() {
    let config = Config::parse(
      r#"
directory:
  url: https://directory.example.com/depository
  timeout_secs: 5
cache:
  ttl_secs: 120
  coalesce_fetches: true
logging:
  level: " DEBUG "
  dir: /var/log/catalog
"#,
    )
    .unwrap();
    assert_eq!(config.directory.timeout_secs, 5);
    assert_eq!(config.cache.ttl_secs, 120);
    assert!(config.cache.coalesce_fetches);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.dir, Some(PathBuf::from("/var/log/catalog")));
  }

  #[test]
  fn test_missing_directory_section_is_an_error() {
    assert!(Config::parse("cache:\n  enabled: false\n").is_err());
  }

  #[test]
  fn test_zero_ttl_rejected_only_when_enabled() {
    let enabled = "directory:\n  url: http://d\ncache:\n  ttl_secs: 0\n";
    assert!(Config::parse(enabled).is_err());

    let disabled = "directory:\n  url: http://d\ncache:\n  enabled: false\n  ttl_secs: 0\n";
    assert!(Config::parse(disabled).is_ok());
  }

  #[test]
  fn test_load_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "directory:\n  url: http://directory.local").unwrap();

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.directory.url, "http://directory.local");
  }

  #[test]
  fn test_load_missing_explicit_path() {
    let err = Config::load(Some(Path::new("/nonexistent/catalog.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
