//! One-time initialization of RIA stores and the datasets inside them.
//!
//! Both the store and every dataset carry a `ria-layout-version` stamp. A
//! stamp is written once and afterwards only verified: initializing a
//! location again with the same version is accepted, a different version is
//! a conflict.
//!
//! Stamps are written with [`StorageIo::create_file`], so when two
//! initializers race the first writer wins and the loser verifies the
//! winner's stamp instead of overwriting it.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::consts::{ERROR_LOGS_DIR, VERSION_FILE};
use crate::io::{StorageIo, StorageIoError};
use crate::layout::{DatasetLocation, LayoutError, TreeKind, VersionStamp, resolve_dataset_location};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error(transparent)]
  Layout(#[from] LayoutError),

  #[error("conflicting {tree} layout version found at {}: {existing} (requested {requested})", path.display())]
  ConflictingVersion {
    tree: TreeKind,
    path: PathBuf,
    existing: String,
    requested: String,
  },

  #[error(transparent)]
  Io(#[from] StorageIoError),
}

impl StoreError {
  /// Whether this error reports an unrecognized layout version.
  pub fn is_unknown_version(&self) -> bool {
    matches!(self, StoreError::Layout(LayoutError::UnknownVersion { .. }))
  }
}

/// What an initialization call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InitOutcome {
  /// The version stamp was written by this call.
  Created,
  /// A matching version stamp was already in place.
  Existing,
}

/// Initialize a RIA store at `base_path` with store layout `version`.
///
/// `version` may carry configuration flags (`1|<flags>`), which are written
/// verbatim but ignored when comparing against an existing stamp. If the
/// store is already stamped with the same version nothing is touched.
pub fn create_store(io: &dyn StorageIo, base_path: &Path, version: &str) -> Result<InitOutcome, StoreError> {
  TreeKind::Store.validate(version)?;

  let error_logs = base_path.join(ERROR_LOGS_DIR);
  let version_file = base_path.join(VERSION_FILE);

  if io.exists(&version_file)? {
    verify_stamp(io, TreeKind::Store, &version_file, version)?;
    debug!(store = %base_path.display(), version, "store already initialized");
    return Ok(InitOutcome::Existing);
  }

  // Creates the base path as well.
  io.mkdir(&error_logs)?;

  if !io.create_file(&version_file, version)? {
    verify_stamp(io, TreeKind::Store, &version_file, version)?;
    debug!(store = %base_path.display(), "store initialized concurrently");
    return Ok(InitOutcome::Existing);
  }

  info!(store = %base_path.display(), version, "created RIA store");
  Ok(InitOutcome::Created)
}

/// Initialize dataset `dataset_id` in the store at `base_path`.
///
/// `store_version` selects the dataset tree layout used to locate the
/// dataset, `object_version` is the object tree layout recorded for the
/// dataset itself. Unlike [`create_store`], the dataset directories are
/// (re)ensured even if a matching stamp already exists.
pub fn create_dataset_in_store(
  io: &dyn StorageIo,
  base_path: &Path,
  dataset_id: &str,
  object_version: &str,
  store_version: &str,
) -> Result<DatasetLocation, StoreError> {
  let location = locate_dataset(base_path, dataset_id, store_version)?;
  TreeKind::Object.validate(object_version)?;

  let version_file = location.version_file();

  if io.exists(&version_file)? {
    verify_stamp(io, TreeKind::Object, &version_file, object_version)?;
  }

  io.mkdir(&location.archive_dir)?;
  io.mkdir(&location.object_dir)?;

  if io.create_file(&version_file, object_version)? {
    info!(dataset = dataset_id, repo = %location.repo_dir.display(), version = object_version, "created dataset in store");
  } else {
    verify_stamp(io, TreeKind::Object, &version_file, object_version)?;
    debug!(dataset = dataset_id, "dataset already initialized");
  }

  Ok(location)
}

/// Resolve the locations of a dataset for a store layout given as a string.
pub fn locate_dataset(base_path: &Path, dataset_id: &str, store_version: &str) -> Result<DatasetLocation, StoreError> {
  let unknown = || LayoutError::UnknownVersion {
    tree: TreeKind::Store,
    version: store_version.to_string(),
  };
  let version: u32 = VersionStamp::parse(store_version).version.parse().map_err(|_| unknown())?;

  resolve_dataset_location(version, base_path, dataset_id).map_err(|err| match err {
    LayoutError::UnknownVersion { .. } => StoreError::Layout(unknown()),
    other => StoreError::Layout(other),
  })
}

/// Read the stamp at `version_file` and fail if it records another version.
fn verify_stamp(io: &dyn StorageIo, tree: TreeKind, version_file: &Path, requested: &str) -> Result<(), StoreError> {
  let content = io.read_file(version_file)?;
  let existing = VersionStamp::parse(&content);
  let wanted = VersionStamp::parse(requested);

  if existing.same_version(&wanted) {
    return Ok(());
  }

  Err(StoreError::ConflictingVersion {
    tree,
    path: version_file.to_path_buf(),
    existing: existing.version.to_string(),
    requested: wanted.version.to_string(),
  })
}
