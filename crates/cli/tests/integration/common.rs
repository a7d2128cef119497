//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Dataset ID used throughout the store tests.
pub const DSID: &str = "4b9c3a2e-6f0d-11ee-8f3b-0242ac120002";

/// Isolated test environment.
///
/// Each test gets its own temporary directory with an isolated configuration
/// directory and a store location.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Store base path (not created).
  pub fn store_path(&self) -> PathBuf {
    let root = dunce::canonicalize(self.temp.path()).unwrap();
    root.join("store")
  }

  /// `ria+file://` URL of [`Self::store_path`].
  pub fn store_url(&self) -> String {
    format!("ria+file://{}", self.store_path().display())
  }

  /// Working directory for archive tests.
  pub fn work_path(&self) -> PathBuf {
    let p = self.temp.path().join("work");
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Get a pre-configured Command for the ria binary.
  ///
  /// Points the configuration lookup at an empty per-test directory and
  /// clears the environment overrides.
  pub fn ria_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("ria");
    cmd.env("XDG_CONFIG_HOME", self.temp.path().join("config"));
    cmd.env("APPDATA", self.temp.path().join("config")); // For Windows
    cmd.env_remove("RIA_CONFIG");
    cmd.env_remove("RIA_ARCHIVER");
    cmd.env_remove("RIA_SSH");
    cmd
  }

  /// Install a fake `7z` that logs its arguments instead of archiving.
  ///
  /// Each call appends `<cwd>: <args>` to `archiver.log` next to the script.
  #[cfg(unix)]
  pub fn fake_archiver(&self, exit_code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let dir = self.temp.path().join("bin");
    std::fs::create_dir_all(&dir).unwrap();
    let log = dir.join("archiver.log");
    let script = dir.join("7z");
    let body = format!(
      "#!/bin/sh\n\
       [ \"$1\" = i ] && exit 0\n\
       echo \"$(pwd -P): $*\" >> '{log}'\n\
       case \" $* \" in *' -si '*) cat > /dev/null ;; esac\n\
       case \" $* \" in *' -so '*) echo tar-stream ;; esac\n\
       exit {exit_code}\n",
      log = log.display(),
    );
    std::fs::write(&script, body).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
  }

  /// Lines logged by [`Self::fake_archiver`].
  pub fn archiver_calls(&self) -> Vec<String> {
    read_lines(&self.temp.path().join("bin").join("archiver.log"))
  }
}

fn read_lines(path: &Path) -> Vec<String> {
  std::fs::read_to_string(path)
    .unwrap_or_default()
    .lines()
    .map(str::to_string)
    .collect()
}
