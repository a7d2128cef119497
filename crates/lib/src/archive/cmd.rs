//! Blocking execution of archiver processes.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread;

use tracing::{debug, info};

use super::ArchiveError;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation {
  program: PathBuf,
  args: Vec<OsString>,
}

impl Invocation {
  pub(crate) fn new(program: &Path) -> Self {
    Self {
      program: program.to_path_buf(),
      args: Vec::new(),
    }
  }

  pub(crate) fn arg(mut self, arg: impl Into<OsString>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub(crate) fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  fn command(&self, cwd: Option<&Path>) -> Command {
    let mut command = Command::new(&self.program);
    command.args(&self.args);
    if let Some(dir) = cwd {
      command.current_dir(dir);
    }
    command
  }

  fn spawn_error(&self, source: io::Error) -> ArchiveError {
    ArchiveError::Spawn {
      cmd: self.to_string(),
      source,
    }
  }

  fn check(&self, output: &Output) -> Result<(), ArchiveError> {
    if output.status.success() {
      return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "command stderr");
    }
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "command stdout");
    }

    Err(ArchiveError::Failed {
      cmd: self.to_string(),
      code: output.status.code(),
      stderr,
    })
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program.display())?;
    for arg in &self.args {
      write!(f, " {}", arg.to_string_lossy())?;
    }
    Ok(())
  }
}

/// Run a single command to completion.
pub(crate) fn run(invocation: &Invocation, cwd: Option<&Path>) -> Result<(), ArchiveError> {
  info!(cmd = %invocation, "executing command");
  debug!(working_dir = ?cwd, "spawning process");

  let output = invocation
    .command(cwd)
    .stdin(Stdio::null())
    .output()
    .map_err(|e| invocation.spawn_error(e))?;

  invocation.check(&output)
}

/// Run `producer | consumer`, connected by an OS pipe.
///
/// A failing consumer is reported in preference to the producer, whose
/// failure is then usually a broken pipe.
pub(crate) fn run_pipeline(producer: &Invocation, consumer: &Invocation, cwd: Option<&Path>) -> Result<(), ArchiveError> {
  info!(cmd = %format!("{producer} | {consumer}"), "executing pipeline");
  debug!(working_dir = ?cwd, "spawning processes");

  let mut upstream = producer
    .command(cwd)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
    .map_err(|e| producer.spawn_error(e))?;

  let Some(pipe) = upstream.stdout.take() else {
    let _ = upstream.kill();
    let _ = upstream.wait();
    return Err(producer.spawn_error(io::Error::other("stdout of producer not captured")));
  };

  let downstream = match consumer
    .command(cwd)
    .stdin(Stdio::from(pipe))
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .spawn()
  {
    Ok(child) => child,
    Err(e) => {
      let _ = upstream.kill();
      let _ = upstream.wait();
      return Err(consumer.spawn_error(e));
    }
  };

  // Both ends are drained concurrently so neither can stall on a full
  // stderr pipe while the other is being waited on.
  let (upstream_output, downstream_output) = thread::scope(|scope| {
    let consumer_wait = scope.spawn(move || downstream.wait_with_output());
    let upstream_output = upstream.wait_with_output();
    let downstream_output = consumer_wait
      .join()
      .unwrap_or_else(|_| Err(io::Error::other("waiting for consumer panicked")));
    (upstream_output, downstream_output)
  });

  let downstream_output = downstream_output.map_err(|e| consumer.spawn_error(e))?;
  let upstream_output = upstream_output.map_err(|e| producer.spawn_error(e))?;

  consumer.check(&downstream_output)?;
  producer.check(&upstream_output)
}
