//! Storage I/O capability used to initialize stores.
//!
//! Store bootstrap only needs four primitives (plus an exclusive create).
//! They are expressed as the [`StorageIo`] trait with two backends:
//! - [`LocalIo`] for `ria+file://` stores on the local filesystem
//! - [`SshIo`] for `ria+ssh://` stores reached through the `ssh` client

mod local;
mod ssh;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::Config;
use crate::url::{Protocol, RiaUrl};

pub use local::LocalIo;
pub use ssh::SshIo;

#[derive(Debug, Error)]
pub enum StorageIoError {
  #[error("failed to {op} {}: {source}", path.display())]
  Local {
    op: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("remote {op} of {} on {host} failed with exit code {code:?}: {stderr}", path.display())]
  Remote {
    op: &'static str,
    host: String,
    path: PathBuf,
    code: Option<i32>,
    stderr: String,
  },

  #[error("failed to launch {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  #[error("remote path is not valid UTF-8: {}", .0.display())]
  NonUtf8Path(PathBuf),

  #[error("ssh store URL has no host: {0}")]
  MissingHost(String),
}

/// File operations needed to bootstrap a store, independent of where it lives.
///
/// Both backends must behave identically for every operation.
pub trait StorageIo {
  /// Whether anything exists at `path`.
  fn exists(&self, path: &Path) -> Result<bool, StorageIoError>;

  /// Read the whole file at `path` as UTF-8 text.
  fn read_file(&self, path: &Path) -> Result<String, StorageIoError>;

  /// Write `content` to `path`, replacing any previous content.
  fn write_file(&self, path: &Path, content: &str) -> Result<(), StorageIoError>;

  /// Write `content` to `path` only if nothing exists there yet.
  ///
  /// Returns `Ok(false)` without touching the file when `path` already exists.
  fn create_file(&self, path: &Path, content: &str) -> Result<bool, StorageIoError>;

  /// Create the directory `path` including all missing parents.
  fn mkdir(&self, path: &Path) -> Result<(), StorageIoError>;
}

/// Select the storage backend matching the transport of a verified URL.
pub fn open_storage(url: &RiaUrl, config: &Config) -> Result<Box<dyn StorageIo>, StorageIoError> {
  match url.protocol {
    Protocol::File => Ok(Box::new(LocalIo)),
    Protocol::Ssh => {
      let host = url
        .host
        .as_deref()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| StorageIoError::MissingHost(url.url.clone()))?;
      Ok(Box::new(SshIo::new(host).with_program(config.ssh_program())))
    }
  }
}
