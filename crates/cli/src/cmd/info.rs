use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use riastore_lib::archive::Archiver;
use riastore_lib::config::{CONFIG_ENV, Config};
use riastore_lib::platform::paths::config_file;

use crate::output::{OutputFormat, print_info, print_json, print_stat, print_warning};

#[derive(Serialize)]
struct Info {
  version: &'static str,
  config_file: Option<PathBuf>,
  archiver: PathBuf,
  archiver_available: bool,
  ssh: PathBuf,
  url_aliases: bool,
}

pub fn cmd_info(output: OutputFormat) -> Result<()> {
  let config = Config::load().context("Failed to load configuration")?;
  let archiver = Archiver::from_config(&config);

  let config_path = std::env::var_os(CONFIG_ENV)
    .filter(|v| !v.is_empty())
    .map(PathBuf::from)
    .or_else(|| config_file().filter(|p| p.is_file()));

  let info = Info {
    version: env!("CARGO_PKG_VERSION"),
    config_file: config_path,
    archiver: archiver.program().to_path_buf(),
    archiver_available: archiver.probe(),
    ssh: config.ssh_program(),
    url_aliases: !config.url_rewrites.is_empty(),
  };

  if output.is_json() {
    return print_json(&info);
  }

  print_info(&format!("ria v{}", info.version));
  match &info.config_file {
    Some(path) => print_stat("Config", &path.display().to_string()),
    None => print_stat("Config", "(defaults)"),
  }
  print_stat("Archiver", &info.archiver.display().to_string());
  print_stat("SSH", &info.ssh.display().to_string());
  print_stat("URL aliases", if info.url_aliases { "yes" } else { "no" });

  if !info.archiver_available {
    print_warning("Archiver not found; compress and extract are unavailable");
  }

  Ok(())
}
