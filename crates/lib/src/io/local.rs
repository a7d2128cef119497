use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use super::{StorageIo, StorageIoError};

/// Storage on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalIo;

fn local_err<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> StorageIoError + 'a {
  move |source| StorageIoError::Local {
    op,
    path: path.to_path_buf(),
    source,
  }
}

impl StorageIo for LocalIo {
  fn exists(&self, path: &Path) -> Result<bool, StorageIoError> {
    path.try_exists().map_err(local_err("inspect", path))
  }

  fn read_file(&self, path: &Path) -> Result<String, StorageIoError> {
    fs::read_to_string(path).map_err(local_err("read", path))
  }

  fn write_file(&self, path: &Path, content: &str) -> Result<(), StorageIoError> {
    debug!(path = %path.display(), "writing file");
    fs::write(path, content).map_err(local_err("write", path))
  }

  fn create_file(&self, path: &Path, content: &str) -> Result<bool, StorageIoError> {
    let dir = match path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent,
      _ => Path::new("."),
    };

    // Write the full content to a sibling first and link it into place, so the
    // target either does not exist or is complete.
    let mut builder = tempfile::Builder::new();
    builder.prefix(".ria-staged-");
    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      // Subject to the umask, like a plain `fs::write`.
      builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut staged = builder.tempfile_in(dir).map_err(local_err("create", path))?;
    staged
      .write_all(content.as_bytes())
      .and_then(|_| staged.flush())
      .map_err(local_err("write", path))?;

    match staged.persist_noclobber(path) {
      Ok(_) => {
        debug!(path = %path.display(), "created file");
        Ok(true)
      }
      Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
        debug!(path = %path.display(), "file already exists, leaving it untouched");
        Ok(false)
      }
      Err(err) => Err(StorageIoError::Local {
        op: "create",
        path: path.to_path_buf(),
        source: err.error,
      }),
    }
  }

  fn mkdir(&self, path: &Path) -> Result<(), StorageIoError> {
    fs::create_dir_all(path).map_err(local_err("create directory", path))
  }
}
