//! Compression and extraction through the external `7z` archiver.
//!
//! Compressed tarballs (`*.tar.gz`, `*.tar.xz`, ...) take two archiver passes
//! joined by a pipe: one for the compression layer and one for the tar
//! stream. Every other archive type is handled by a single invocation.

mod cmd;

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, ConfigError};
use cmd::{Invocation, run, run_pipeline};

#[derive(Debug, Error)]
pub enum ArchiveError {
  #[error("target archive {} already exists and overwrite is forbidden", path.display())]
  TargetExists { path: PathBuf },

  #[error("archiver {program} is not available; install 7-Zip or point RIA_ARCHIVER at the 7z binary")]
  ArchiverMissing { program: String },

  #[error("failed to launch {cmd}: {source}")]
  Spawn {
    cmd: String,
    #[source]
    source: io::Error,
  },

  #[error("command failed with exit code {code:?}: {cmd}")]
  Failed {
    cmd: String,
    code: Option<i32>,
    stderr: String,
  },

  #[error("failed to {op} {}: {source}", path.display())]
  Io {
    op: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// How an archive file has to be processed, judged by its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
  /// Any format the archiver handles in one pass (`.zip`, `.7z`, `.tar`, ...).
  Plain,
  /// A tarball wrapped in a compression layer (`.tar.gz`, `.tar.bz2`, ...).
  CompressedTar,
}

impl ArchiveKind {
  /// Classify `path` by its second-to-last suffix being `.tar`.
  pub fn classify(path: &Path) -> Self {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
      return ArchiveKind::Plain;
    };
    if name.ends_with('.') {
      return ArchiveKind::Plain;
    }

    let suffixes: Vec<&str> = name.trim_start_matches('.').split('.').skip(1).collect();
    match suffixes.as_slice() {
      [.., "tar", _] => ArchiveKind::CompressedTar,
      _ => ArchiveKind::Plain,
    }
  }
}

/// Handle to the external archiver program.
///
/// Whether the program can be launched is probed once and cached; operations
/// on a missing archiver fail with [`ArchiveError::ArchiverMissing`].
#[derive(Debug)]
pub struct Archiver {
  program: PathBuf,
  available: OnceLock<bool>,
}

impl Archiver {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      available: OnceLock::new(),
    }
  }

  pub fn from_config(config: &Config) -> Self {
    Self::new(config.archiver_program())
  }

  /// Process-wide archiver built from the loaded configuration.
  ///
  /// The configuration is read on first use only, so the availability probe
  /// also runs at most once per process.
  pub fn system() -> Result<&'static Archiver, ConfigError> {
    static SYSTEM: OnceLock<Archiver> = OnceLock::new();
    if let Some(archiver) = SYSTEM.get() {
      return Ok(archiver);
    }
    let config = Config::load()?;
    Ok(SYSTEM.get_or_init(|| Archiver::from_config(&config)))
  }

  pub fn program(&self) -> &Path {
    &self.program
  }

  /// Whether the archiver can be launched. Probed on first call only.
  pub fn probe(&self) -> bool {
    *self.available.get_or_init(|| {
      let launched = std::process::Command::new(&self.program)
        .arg("i")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
      match launched {
        Ok(_) => true,
        Err(err) => {
          debug!(program = %self.program.display(), error = %err, "archiver probe failed");
          false
        }
      }
    })
  }

  fn ensure_available(&self) -> Result<(), ArchiveError> {
    if self.probe() {
      Ok(())
    } else {
      Err(ArchiveError::ArchiverMissing {
        program: self.program.display().to_string(),
      })
    }
  }

  /// Extract `archive` into `target_dir`, creating the directory if needed.
  ///
  /// A relative `archive` is resolved against the current directory of the
  /// process, not against `target_dir`, even though the archiver runs inside
  /// `target_dir`. This differs from [`Archiver::compress`], where a relative
  /// archive is interpreted in the archiver's working directory.
  pub fn decompress(&self, archive: &Path, target_dir: &Path) -> Result<(), ArchiveError> {
    self.ensure_available()?;

    let archive = std::path::absolute(archive).map_err(|source| ArchiveError::Io {
      op: "resolve",
      path: archive.to_path_buf(),
      source,
    })?;
    std::fs::create_dir_all(target_dir).map_err(|source| ArchiveError::Io {
      op: "create directory",
      path: target_dir.to_path_buf(),
      source,
    })?;

    match ArchiveKind::classify(&archive) {
      ArchiveKind::CompressedTar => {
        let unwrap = Invocation::new(&self.program).arg("x").arg(&archive).arg("-so");
        let untar = Invocation::new(&self.program).args(["x", "-si", "-ttar"]);
        run_pipeline(&unwrap, &untar, Some(target_dir))?;
      }
      ArchiveKind::Plain => {
        let extract = Invocation::new(&self.program).arg("x").arg(&archive);
        run(&extract, Some(target_dir))?;
      }
    }

    info!(archive = %archive.display(), target = %target_dir.display(), "extracted archive");
    Ok(())
  }

  /// Pack `files` into `archive`.
  ///
  /// The archiver runs in `cwd` (the current directory if `None`), so relative
  /// `files` and a relative `archive` are interpreted there. An existing
  /// archive is replaced when `overwrite` is set and is an error otherwise.
  pub fn compress<P: AsRef<Path>>(
    &self,
    files: &[P],
    archive: &Path,
    cwd: Option<&Path>,
    overwrite: bool,
  ) -> Result<(), ArchiveError> {
    self.ensure_available()?;

    let target = match cwd {
      Some(dir) if archive.is_relative() => dir.join(archive),
      _ => archive.to_path_buf(),
    };

    if target.exists() {
      if !overwrite {
        return Err(ArchiveError::TargetExists { path: target });
      }
      debug!(archive = %target.display(), "removing existing archive");
      std::fs::remove_file(&target).map_err(|source| ArchiveError::Io {
        op: "remove",
        path: target.clone(),
        source,
      })?;
    }

    let files = files.iter().map(|f| f.as_ref().as_os_str().to_owned());
    match ArchiveKind::classify(&target) {
      ArchiveKind::CompressedTar => {
        let tar = Invocation::new(&self.program).args(["u", ".tar", "-so", "--"]).args(files);
        let wrap = Invocation::new(&self.program).args(["u", "-si", "--"]).arg(&target);
        run_pipeline(&tar, &wrap, cwd)?;
      }
      ArchiveKind::Plain => {
        let update = Invocation::new(&self.program).arg("u").arg(&target).arg("--").args(files);
        run(&update, cwd)?;
      }
    }

    info!(archive = %target.display(), "created archive");
    Ok(())
  }
}
