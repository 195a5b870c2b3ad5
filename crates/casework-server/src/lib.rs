//! Configuration for the Casework server binary.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use config::{ConfigError, Environment, File, FileFormat, Source};
use serde::Deserialize;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STORE_PATH: &str = "~/.local/share/casework/casework.db";
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;

/// Runtime server configuration: defaults, then `config.toml`, then
/// `CASEWORK_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  /// Upper bound for every live-store call, in milliseconds.
  pub fetch_timeout_ms: u64,
}

impl ServerConfig {
  /// Load from `path` (optional) and the environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_source(File::from(path).required(false))
  }

  /// Load from TOML text and the environment.
  pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
    Self::from_source(File::from_str(text, FileFormat::Toml))
  }

  fn from_source(file: impl Source + Send + Sync + 'static) -> Result<Self, ConfigError> {
    config::Config::builder()
      .set_default("host", DEFAULT_HOST)?
      .set_default("port", i64::from(DEFAULT_PORT))?
      .set_default("store_path", DEFAULT_STORE_PATH)?
      .set_default("fetch_timeout_ms", DEFAULT_FETCH_TIMEOUT_MS as i64)?
      .add_source(file)
      .add_source(Environment::with_prefix("CASEWORK"))
      .build()?
      .try_deserialize()
  }

  pub fn fetch_timeout(&self) -> Duration { Duration::from_millis(self.fetch_timeout_ms) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_file_uses_defaults() {
    let cfg = ServerConfig::from_toml("").unwrap();
    assert_eq!(cfg.host, DEFAULT_HOST);
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.fetch_timeout(), Duration::from_secs(5));
  }

  #[test]
  fn file_values_override_defaults() {
    let cfg = ServerConfig::from_toml(
      r#"
        host = "0.0.0.0"
        port = 9100
        store_path = "/var/lib/casework/cases.db"
        fetch_timeout_ms = 1500
      "#,
    )
    .unwrap();
    assert_eq!(cfg.address(), "0.0.0.0:9100");
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/casework/cases.db"));
    assert_eq!(cfg.fetch_timeout(), Duration::from_millis(1500));
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/casework.toml")).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
  }

  #[test]
  fn absolute_paths_are_left_alone() {
    let p = Path::new("/tmp/casework.db");
    assert_eq!(expand_tilde(p), p);
  }
}
