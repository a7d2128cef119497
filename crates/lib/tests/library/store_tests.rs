//! End-to-end store bootstrap through the public API.

use std::fs;

use riastore_lib::config::Config;
use riastore_lib::io::open_storage;
use riastore_lib::layout::resolve_dataset_location;
use riastore_lib::store::{InitOutcome, StoreError, create_dataset_in_store, create_store};
use riastore_lib::url::verify_ria_url;

use super::common::{DSID, TestStore};

#[test]
fn bootstrap_store_and_dataset_from_url() {
  let store = TestStore::new();
  let config = Config::default();

  let url = verify_ria_url(&store.url(), &config.url_rewrites).unwrap();
  assert_eq!(url.base_path, store.base());

  let io = open_storage(&url, &config).unwrap();
  assert_eq!(create_store(io.as_ref(), &url.base_path, "1").unwrap(), InitOutcome::Created);

  let location = create_dataset_in_store(io.as_ref(), &url.base_path, DSID, "2", "1").unwrap();

  let expected = resolve_dataset_location(1, &store.base(), DSID).unwrap();
  assert_eq!(location, expected);
  assert_eq!(fs::read_to_string(store.base().join("ria-layout-version")).unwrap(), "1");
  assert_eq!(fs::read_to_string(location.version_file()).unwrap(), "2");
  assert!(store.base().join("error_logs").is_dir());
  assert!(location.archive_dir.is_dir());
  assert!(location.object_dir.is_dir());
}

#[test]
fn several_datasets_share_one_store() {
  let store = TestStore::new();
  let io = open_storage(
    &verify_ria_url(&store.url(), &Default::default()).unwrap(),
    &Config::default(),
  )
  .unwrap();

  create_store(io.as_ref(), &store.base(), "1").unwrap();
  let first = create_dataset_in_store(io.as_ref(), &store.base(), "abc111", "1", "1").unwrap();
  let second = create_dataset_in_store(io.as_ref(), &store.base(), "abc222", "2", "1").unwrap();

  // Same shard directory, separate repositories with their own versions.
  assert_eq!(first.repo_dir.parent(), second.repo_dir.parent());
  assert_eq!(fs::read_to_string(first.version_file()).unwrap(), "1");
  assert_eq!(fs::read_to_string(second.version_file()).unwrap(), "2");
}

#[test]
fn stamp_without_directories_is_recovered_by_dataset_init() {
  let store = TestStore::new();
  let io = open_storage(
    &verify_ria_url(&store.url(), &Default::default()).unwrap(),
    &Config::default(),
  )
  .unwrap();

  let location = resolve_dataset_location(1, &store.base(), DSID).unwrap();
  fs::create_dir_all(&location.repo_dir).unwrap();
  fs::write(location.version_file(), "2|imported").unwrap();

  create_dataset_in_store(io.as_ref(), &store.base(), DSID, "2", "1").unwrap();

  assert!(location.archive_dir.is_dir());
  assert!(location.object_dir.is_dir());
  assert_eq!(fs::read_to_string(location.version_file()).unwrap(), "2|imported");
}

#[test]
fn store_conflict_leaves_store_untouched() {
  let store = TestStore::new();
  fs::create_dir_all(store.base()).unwrap();
  fs::write(store.base().join("ria-layout-version"), "3").unwrap();

  let io = open_storage(
    &verify_ria_url(&store.url(), &Default::default()).unwrap(),
    &Config::default(),
  )
  .unwrap();
  let err = create_store(io.as_ref(), &store.base(), "1").unwrap_err();

  assert!(matches!(err, StoreError::ConflictingVersion { ref existing, .. } if existing == "3"));
  assert!(!store.base().join("error_logs").exists());
}
