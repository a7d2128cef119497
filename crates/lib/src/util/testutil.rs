//! Test utilities for riastore-lib.
//!
//! Stand-ins for the external programs the crate drives (`ssh`, `7z`), so
//! tests never depend on the host having them installed.

#![cfg_attr(not(unix), allow(dead_code, unused_imports))]

use std::fs;
use std::path::{Path, PathBuf};

/// Write an executable shell script named `name` into `dir`.
#[cfg(unix)]
pub fn fake_program(dir: &Path, name: &str, body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let path = dir.join(name);
  fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
  fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// An `ssh` replacement that runs the remote command locally.
///
/// Options and the host argument are dropped, the last argument is the
/// command. Stdin is passed through.
#[cfg(unix)]
pub fn fake_ssh(dir: &Path) -> PathBuf {
  fake_program(
    dir,
    "fake-ssh",
    r#"while [ "$1" = "-o" ]; do shift 2; done
shift
exec /bin/sh -c "$1""#,
  )
}

/// A `7z` replacement that records every invocation.
///
/// The availability probe (`7z i`) is answered silently. Every other call
/// appends `<cwd>: <args>` to `<dir>/archiver.log`. With `-so` it writes a
/// marker to stdout, with `-si` it appends stdin to `<dir>/archiver.stdin`.
/// Exits with `exit_code`.
#[cfg(unix)]
pub fn fake_archiver(dir: &Path, exit_code: i32) -> PathBuf {
  let log = dir.join("archiver.log");
  let stdin = dir.join("archiver.stdin");
  fake_program(
    dir,
    "fake-7z",
    &format!(
      r#"if [ "$1" = "i" ]; then exit 0; fi
echo "$(pwd -P): $*" >> '{log}'
for arg in "$@"; do
  if [ "$arg" = "-si" ]; then cat >> '{stdin}'; fi
  if [ "$arg" = "-so" ]; then printf 'tar-stream'; fi
done
exit {exit_code}"#,
      log = log.display(),
      stdin = stdin.display(),
    ),
  )
}

/// Lines recorded by [`fake_archiver`] in `dir`.
#[cfg(unix)]
pub fn archiver_calls(dir: &Path) -> Vec<String> {
  fs::read_to_string(dir.join("archiver.log"))
    .unwrap_or_default()
    .lines()
    .map(str::to_string)
    .collect()
}
