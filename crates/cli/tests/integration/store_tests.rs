//! Store and dataset initialization integration tests.

use predicates::prelude::*;

use super::common::{DSID, TestEnv};

#[test]
fn init_store_creates_stamp_and_error_logs() {
  let env = TestEnv::new();

  env
    .ria_cmd()
    .args(["init-store", &env.store_url()])
    .assert()
    .success()
    .stdout(predicate::str::contains("Created RIA store"));

  let store = env.store_path();
  assert_eq!(std::fs::read_to_string(store.join("ria-layout-version")).unwrap(), "1");
  assert!(store.join("error_logs").is_dir());
}

#[test]
fn init_store_twice_reports_existing() {
  let env = TestEnv::new();
  env.ria_cmd().args(["init-store", &env.store_url()]).assert().success();

  let output = env
    .ria_cmd()
    .args(["-o", "json", "init-store", &env.store_url()])
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["outcome"], "existing");
  assert_eq!(json["version"], "1");
}

#[test]
fn init_store_keeps_flags_verbatim() {
  let env = TestEnv::new();

  env
    .ria_cmd()
    .args(["init-store", &env.store_url(), "--layout", "1|l3"])
    .assert()
    .success();

  let stamp = std::fs::read_to_string(env.store_path().join("ria-layout-version")).unwrap();
  assert_eq!(stamp, "1|l3");
}

#[test]
fn init_store_unknown_version_creates_nothing() {
  let env = TestEnv::new();

  env
    .ria_cmd()
    .args(["init-store", &env.store_url(), "--layout", "3"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("layout version unknown: 3"));

  assert!(!env.store_path().exists());
}

#[test]
fn init_store_conflicting_stamp_fails() {
  let env = TestEnv::new();
  env.write_file("store/ria-layout-version", "2");

  env
    .ria_cmd()
    .args(["init-store", &env.store_url()])
    .assert()
    .failure()
    .stderr(predicate::str::contains("conflicting RIA store layout version"));

  let stamp = std::fs::read_to_string(env.store_path().join("ria-layout-version")).unwrap();
  assert_eq!(stamp, "2");
}

#[test]
fn init_dataset_creates_tree() {
  let env = TestEnv::new();
  env.ria_cmd().args(["init-store", &env.store_url()]).assert().success();

  env
    .ria_cmd()
    .args(["init-dataset", &env.store_url(), DSID])
    .assert()
    .success()
    .stdout(predicate::str::contains(format!("Dataset {DSID} ready")));

  let repo = env.store_path().join(&DSID[..3]).join(&DSID[3..]);
  assert!(repo.join("archives").is_dir());
  assert!(repo.join("annex").join("objects").is_dir());
  assert_eq!(std::fs::read_to_string(repo.join("ria-layout-version")).unwrap(), "2");
}

#[test]
fn store_root_holds_only_layout_entries() {
  let env = TestEnv::new();
  env.ria_cmd().args(["init-store", &env.store_url()]).assert().success();
  env.ria_cmd().args(["init-dataset", &env.store_url(), DSID]).assert().success();

  let mut entries: Vec<_> = std::fs::read_dir(env.store_path())
    .unwrap()
    .map(|e| e.unwrap().file_name().into_string().unwrap())
    .collect();
  entries.sort();
  assert_eq!(entries, vec![DSID[..3].to_string(), "error_logs".into(), "ria-layout-version".into()]);
}

#[cfg(unix)]
#[test]
fn init_store_on_read_only_store_is_verified() {
  use std::os::unix::fs::PermissionsExt;

  let env = TestEnv::new();
  env.ria_cmd().args(["init-store", &env.store_url()]).assert().success();
  let store = env.store_path();
  std::fs::set_permissions(&store, std::fs::Permissions::from_mode(0o555)).unwrap();

  let assert = env
    .ria_cmd()
    .args(["init-store", &env.store_url()])
    .assert();

  std::fs::set_permissions(&store, std::fs::Permissions::from_mode(0o755)).unwrap();
  assert
    .success()
    .stdout(predicate::str::contains("RIA store already initialized"));
}

#[test]
fn init_dataset_conflicting_object_layout_fails() {
  let env = TestEnv::new();
  env
    .ria_cmd()
    .args(["init-dataset", &env.store_url(), DSID, "--object-layout", "1"])
    .assert()
    .success();

  env
    .ria_cmd()
    .args(["init-dataset", &env.store_url(), DSID, "--object-layout", "2"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("conflicting dataset layout version"));
}

#[test]
fn init_dataset_rejects_unknown_store_layout() {
  let env = TestEnv::new();

  env
    .ria_cmd()
    .args(["init-dataset", &env.store_url(), DSID, "--store-layout", "x"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("layout version unknown: x"));

  assert!(!env.store_path().exists());
}

#[test]
fn locate_prints_paths_without_touching_disk() {
  let env = TestEnv::new();
  let output = env
    .ria_cmd()
    .args(["-o", "json", "locate", &env.store_url(), DSID])
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  let repo = env.store_path().join(&DSID[..3]).join(&DSID[3..]);
  assert_eq!(json["dataset_id"], DSID);
  assert_eq!(json["repo_dir"], repo.display().to_string());
  assert_eq!(json["archive_dir"], repo.join("archives").display().to_string());
  assert!(!env.store_path().exists());
}

#[test]
fn locate_rejects_path_like_ids() {
  let env = TestEnv::new();

  env
    .ria_cmd()
    .args(["locate", &env.store_url(), "../escape"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid dataset ID"));
}
