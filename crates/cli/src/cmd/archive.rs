use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use riastore_lib::archive::Archiver;

use crate::output::{OutputFormat, print_json, print_stat, print_success};

#[derive(Serialize)]
struct ArchiveReport<'a> {
  archive: &'a Path,
  directory: &'a Path,
}

fn archiver() -> Result<&'static Archiver> {
  Archiver::system().context("Failed to load configuration")
}

pub fn cmd_compress(
  archive: &Path,
  files: &[PathBuf],
  directory: Option<&Path>,
  overwrite: bool,
  output: OutputFormat,
) -> Result<()> {
  archiver()?
    .compress(files, archive, directory, overwrite)
    .with_context(|| format!("Failed to create {}", archive.display()))?;

  let directory = directory.unwrap_or(Path::new("."));
  if output.is_json() {
    return print_json(&ArchiveReport { archive, directory });
  }

  print_success(&format!("Created {}", archive.display()));
  print_stat("Files", &files.len().to_string());
  print_stat("Directory", &directory.display().to_string());

  Ok(())
}

pub fn cmd_extract(archive: &Path, directory: &Path, output: OutputFormat) -> Result<()> {
  archiver()?
    .decompress(archive, directory)
    .with_context(|| format!("Failed to extract {}", archive.display()))?;

  if output.is_json() {
    return print_json(&ArchiveReport { archive, directory });
  }

  print_success(&format!("Extracted {}", archive.display()));
  print_stat("Directory", &directory.display().to_string());

  Ok(())
}
