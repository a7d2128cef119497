//! User configuration.
//!
//! Configuration is read from a TOML file, `$RIA_CONFIG` if set, otherwise
//! `config.toml` in the platform config directory:
//!
//! ```toml
//! archiver = "/usr/bin/7z"
//! ssh = "ssh"
//!
//! [url."ria+ssh://store.example.org/data"]
//! insteadof = ["store:", "ria+ssh://old-store.example.org/data"]
//! ```
//!
//! `RIA_ARCHIVER` and `RIA_SSH` override the respective file settings.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::{DEFAULT_ARCHIVER, DEFAULT_SSH};
use crate::platform::paths::config_file;

pub const CONFIG_ENV: &str = "RIA_CONFIG";
pub const ARCHIVER_ENV: &str = "RIA_ARCHIVER";
pub const SSH_ENV: &str = "RIA_SSH";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse config file {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Archiver program, `7z` from `PATH` when unset.
  pub archiver: Option<PathBuf>,
  /// ssh client program, `ssh` from `PATH` when unset.
  pub ssh: Option<PathBuf>,
  /// URL aliases applied before a RIA URL is verified.
  #[serde(rename = "url")]
  pub url_rewrites: UrlRewrites,
}

impl Config {
  /// Load the configuration for this process.
  ///
  /// An explicitly configured file (`RIA_CONFIG`) must exist; the default file
  /// is optional.
  pub fn load() -> Result<Self, ConfigError> {
    let mut config = match std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
      Some(path) => Self::from_file(Path::new(&path))?,
      None => match config_file() {
        Some(path) if path.is_file() => Self::from_file(&path)?,
        _ => {
          debug!("no config file found, using defaults");
          Self::default()
        }
      },
    };
    config.apply_env();
    Ok(config)
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  fn apply_env(&mut self) {
    if let Some(archiver) = std::env::var_os(ARCHIVER_ENV).filter(|v| !v.is_empty()) {
      self.archiver = Some(PathBuf::from(archiver));
    }
    if let Some(ssh) = std::env::var_os(SSH_ENV).filter(|v| !v.is_empty()) {
      self.ssh = Some(PathBuf::from(ssh));
    }
  }

  pub fn archiver_program(&self) -> PathBuf {
    self.archiver.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVER))
  }

  pub fn ssh_program(&self) -> PathBuf {
    self.ssh.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_SSH))
  }
}

/// A base URL and the aliases that stand in for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewriteRule {
  #[serde(rename = "insteadof", alias = "insteadOf")]
  pub instead_of: Vec<String>,
}

/// Git-style `insteadOf` URL aliasing.
///
/// Keys are the base URLs to substitute in, values list the prefixes they
/// replace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct UrlRewrites {
  rules: BTreeMap<String, RewriteRule>,
}

impl UrlRewrites {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register `alias` as a stand-in for `base`.
  pub fn insert(&mut self, base: impl Into<String>, alias: impl Into<String>) -> &mut Self {
    self.rules.entry(base.into()).or_default().instead_of.push(alias.into());
    self
  }

  pub fn is_empty(&self) -> bool {
    self.rules.values().all(|rule| rule.instead_of.is_empty())
  }

  /// Rewrite `url` using the longest matching alias.
  ///
  /// URLs no alias applies to are returned unchanged.
  pub fn rewrite(&self, url: &str) -> String {
    let mut best: Option<(&str, &str)> = None;
    for (base, rule) in &self.rules {
      for alias in &rule.instead_of {
        if alias.is_empty() || !url.starts_with(alias.as_str()) {
          continue;
        }
        match best {
          Some((best_alias, best_base)) if alias.len() == best_alias.len() => {
            if best_base != base {
              warn!(url, alias = %alias, first = best_base, second = %base, "ambiguous URL rewrite, keeping first");
            }
          }
          Some((best_alias, _)) if alias.len() < best_alias.len() => {}
          _ => best = Some((alias.as_str(), base.as_str())),
        }
      }
    }

    match best {
      Some((alias, base)) => {
        let rewritten = format!("{base}{}", &url[alias.len()..]);
        debug!(from = url, to = %rewritten, "rewrote URL");
        rewritten
      }
      None => url.to_string(),
    }
  }
}
