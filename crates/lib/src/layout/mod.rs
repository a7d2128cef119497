//! Canonical locations inside a RIA store.
//!
//! A store keeps one bare repository per dataset. Datasets are sharded into a
//! two-level tree keyed by their ID so that no single directory accumulates
//! an unbounded number of entries:
//!
//! ```text
//! <store>/
//! ├── ria-layout-version          # store tree version stamp
//! ├── error_logs/
//! └── <id[0:3]>/
//!     └── <id[3:]>/               # bare dataset repository
//!         ├── ria-layout-version  # object tree version stamp
//!         ├── archives/
//!         └── annex/objects/
//! ```

mod stamp;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::consts::{ANNEX_DIR, ARCHIVES_DIR, OBJECTS_DIR, VERSION_FILE};

pub use stamp::VersionStamp;

/// Store (dataset tree) layout versions introduced so far.
pub const KNOWN_STORE_VERSIONS: &[&str] = &["1"];

/// Dataset (object tree) layout versions introduced so far.
pub const KNOWN_OBJECT_VERSIONS: &[&str] = &["1", "2"];

/// Number of leading ID characters forming the first directory level.
const SHARD_PREFIX_LEN: usize = 3;

/// Which of the two independently versioned trees a version refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeKind {
  /// The layout of datasets within a store.
  Store,
  /// The layout of objects within a single dataset.
  Object,
}

impl TreeKind {
  /// The version tags recognized for this tree.
  pub fn known_versions(self) -> &'static [&'static str] {
    match self {
      TreeKind::Store => KNOWN_STORE_VERSIONS,
      TreeKind::Object => KNOWN_OBJECT_VERSIONS,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      TreeKind::Store => "RIA store",
      TreeKind::Object => "dataset",
    }
  }

  /// Returns the version part of `version` if it is a known tag for this tree.
  ///
  /// Configuration flags after a `|` are ignored for the check.
  pub fn validate(self, version: &str) -> Result<&str, LayoutError> {
    let tag = VersionStamp::parse(version).version;
    if self.known_versions().contains(&tag) {
      Ok(tag)
    } else {
      Err(LayoutError::UnknownVersion {
        tree: self,
        version: version.to_string(),
      })
    }
  }
}

impl fmt::Display for TreeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
  #[error(
    "{tree} layout version unknown: {version}. Supported versions: {}",
    tree.known_versions().join(", ")
  )]
  UnknownVersion { tree: TreeKind, version: String },

  #[error("invalid dataset ID: {0:?}")]
  InvalidDatasetId(String),
}

/// Locations of a single dataset inside a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetLocation {
  /// The bare dataset repository.
  pub repo_dir: PathBuf,
  /// Directory holding archive files of the dataset.
  pub archive_dir: PathBuf,
  /// The annex object directory.
  pub object_dir: PathBuf,
}

impl DatasetLocation {
  /// Path of the object tree version stamp.
  pub fn version_file(&self) -> PathBuf {
    self.repo_dir.join(VERSION_FILE)
  }
}

/// Compute the locations of dataset `dataset_id` in the store at `base_path`.
///
/// Only store layout version `1` is defined. This is pure path arithmetic and
/// never touches the filesystem.
pub fn resolve_dataset_location(version: u32, base_path: &Path, dataset_id: &str) -> Result<DatasetLocation, LayoutError> {
  if version != 1 {
    return Err(LayoutError::UnknownVersion {
      tree: TreeKind::Store,
      version: version.to_string(),
    });
  }

  let (prefix, rest) = split_dataset_id(dataset_id)?;

  let mut repo_dir = base_path.join(prefix);
  if !rest.is_empty() {
    repo_dir.push(rest);
  }
  let archive_dir = repo_dir.join(ARCHIVES_DIR);
  let object_dir = repo_dir.join(ANNEX_DIR).join(OBJECTS_DIR);

  Ok(DatasetLocation {
    repo_dir,
    archive_dir,
    object_dir,
  })
}

/// Split a dataset ID into its shard prefix and the remainder.
///
/// IDs of up to three characters have an empty remainder.
fn split_dataset_id(dataset_id: &str) -> Result<(&str, &str), LayoutError> {
  let invalid = dataset_id.is_empty()
    || dataset_id == "."
    || dataset_id == ".."
    || dataset_id.contains(['/', '\\'])
    || dataset_id.contains('\0');
  if invalid {
    return Err(LayoutError::InvalidDatasetId(dataset_id.to_string()));
  }

  let split_at = dataset_id
    .char_indices()
    .nth(SHARD_PREFIX_LEN)
    .map(|(idx, _)| idx)
    .unwrap_or(dataset_id.len());
  let (prefix, rest) = dataset_id.split_at(split_at);

  // "abc.." would resolve to the parent of the shard directory.
  if rest == "." || rest == ".." {
    return Err(LayoutError::InvalidDatasetId(dataset_id.to_string()));
  }

  Ok((prefix, rest))
}
