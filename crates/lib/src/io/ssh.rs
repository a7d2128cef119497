use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::debug;

use super::{StorageIo, StorageIoError};
use crate::consts::DEFAULT_SSH;

/// Exit code the exclusive-create script uses to signal an existing target.
const EXISTS_EXIT_CODE: i32 = 17;

/// Storage on a remote host, driven through the `ssh` client.
///
/// Every operation runs one short POSIX shell command on the remote side.
/// Authentication must not prompt (`BatchMode=yes`).
#[derive(Debug, Clone)]
pub struct SshIo {
  host: String,
  program: PathBuf,
}

impl SshIo {
  pub fn new(host: impl Into<String>) -> Self {
    Self {
      host: host.into(),
      program: PathBuf::from(DEFAULT_SSH),
    }
  }

  /// Use a different ssh client binary.
  pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
    self.program = program.into();
    self
  }

  fn run(&self, op: &'static str, path: &Path, script: &str, stdin: Option<&str>) -> Result<Output, StorageIoError> {
    debug!(host = %self.host, op, path = %path.display(), script, "running remote command");

    let mut command = Command::new(&self.program);
    command
      .args(["-o", "BatchMode=yes"])
      .arg(&self.host)
      .arg(script)
      .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
      .stdout(Stdio::piped())
      .stderr(Stdio::piped());

    let spawn_err = |source| StorageIoError::Spawn {
      program: self.program.display().to_string(),
      source,
    };

    let mut child = command.spawn().map_err(spawn_err)?;
    if let (Some(content), Some(mut pipe)) = (stdin, child.stdin.take()) {
      pipe.write_all(content.as_bytes()).map_err(spawn_err)?;
      // Dropping the pipe signals EOF to the remote `cat`.
    }
    let output = child.wait_with_output().map_err(spawn_err)?;

    debug!(host = %self.host, op, code = ?output.status.code(), "remote command finished");
    Ok(output)
  }

  fn failure(&self, op: &'static str, path: &Path, output: &Output) -> StorageIoError {
    StorageIoError::Remote {
      op,
      host: self.host.clone(),
      path: path.to_path_buf(),
      code: output.status.code(),
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
  }
}

/// Quote `value` as a single POSIX shell word.
fn shell_quote(value: &str) -> String {
  format!("'{}'", value.replace('\'', r"'\''"))
}

fn remote_path(path: &Path) -> Result<String, StorageIoError> {
  path
    .to_str()
    .map(shell_quote)
    .ok_or_else(|| StorageIoError::NonUtf8Path(path.to_path_buf()))
}

impl StorageIo for SshIo {
  fn exists(&self, path: &Path) -> Result<bool, StorageIoError> {
    let target = remote_path(path)?;
    let output = self.run("inspect", path, &format!("test -e {target}"), None)?;
    match output.status.code() {
      Some(0) => Ok(true),
      Some(1) => Ok(false),
      _ => Err(self.failure("inspect", path, &output)),
    }
  }

  fn read_file(&self, path: &Path) -> Result<String, StorageIoError> {
    let target = remote_path(path)?;
    let output = self.run("read", path, &format!("cat {target}"), None)?;
    if !output.status.success() {
      return Err(self.failure("read", path, &output));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
  }

  fn write_file(&self, path: &Path, content: &str) -> Result<(), StorageIoError> {
    let target = remote_path(path)?;
    let output = self.run("write", path, &format!("cat > {target}"), Some(content))?;
    if !output.status.success() {
      return Err(self.failure("write", path, &output));
    }
    Ok(())
  }

  fn create_file(&self, path: &Path, content: &str) -> Result<bool, StorageIoError> {
    let target = remote_path(path)?;
    // With noclobber the redirection fails on an existing target; the exit code
    // is only translated if the target exists afterwards.
    let script = format!(
      "set -C; cat > {target} && exit 0; status=$?; test -e {target} && exit {EXISTS_EXIT_CODE}; exit $status"
    );
    let output = self.run("create", path, &script, Some(content))?;
    match output.status.code() {
      Some(0) => Ok(true),
      Some(EXISTS_EXIT_CODE) => Ok(false),
      _ => Err(self.failure("create", path, &output)),
    }
  }

  fn mkdir(&self, path: &Path) -> Result<(), StorageIoError> {
    let target = remote_path(path)?;
    let output = self.run("create directory", path, &format!("mkdir -p {target}"), None)?;
    if !output.status.success() {
      return Err(self.failure("create directory", path, &output));
    }
    Ok(())
  }
}
