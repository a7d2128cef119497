//! Implementation of the `ria init-store`, `ria init-dataset` and `ria locate`
//! commands.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use riastore_lib::io::open_storage;
use riastore_lib::layout::DatasetLocation;
use riastore_lib::store::{InitOutcome, create_dataset_in_store, create_store, locate_dataset};

use crate::cmd::resolve_url;
use crate::output::{OutputFormat, print_info, print_json, print_stat, print_success};

#[derive(Serialize)]
struct StoreReport<'a> {
  url: &'a str,
  base_path: &'a Path,
  version: &'a str,
  outcome: InitOutcome,
}

#[derive(Serialize)]
struct DatasetReport<'a> {
  url: &'a str,
  dataset_id: &'a str,
  #[serde(flatten)]
  location: &'a DatasetLocation,
}

pub fn cmd_init_store(url: &str, layout: &str, output: OutputFormat) -> Result<()> {
  let (config, ria_url) = resolve_url(url)?;
  let io = open_storage(&ria_url, &config)?;
  debug!(url = %ria_url.url, protocol = %ria_url.protocol, "initializing store");

  let outcome = create_store(io.as_ref(), &ria_url.base_path, layout)
    .with_context(|| format!("Failed to initialize store at {}", ria_url.url))?;

  if output.is_json() {
    return print_json(&StoreReport {
      url: &ria_url.url,
      base_path: &ria_url.base_path,
      version: layout,
      outcome,
    });
  }

  match outcome {
    InitOutcome::Created => print_success("Created RIA store"),
    InitOutcome::Existing => print_info("RIA store already initialized"),
  }
  print_stat("Base path", &ria_url.base_path.display().to_string());
  print_stat("Layout", layout);

  Ok(())
}

pub fn cmd_init_dataset(
  url: &str,
  dataset_id: &str,
  object_layout: &str,
  store_layout: &str,
  output: OutputFormat,
) -> Result<()> {
  let (config, ria_url) = resolve_url(url)?;
  let io = open_storage(&ria_url, &config)?;
  debug!(url = %ria_url.url, dataset = dataset_id, "initializing dataset");

  let location = create_dataset_in_store(io.as_ref(), &ria_url.base_path, dataset_id, object_layout, store_layout)
    .with_context(|| format!("Failed to initialize dataset {dataset_id} in {}", ria_url.url))?;

  if output.is_json() {
    return print_json(&DatasetReport {
      url: &ria_url.url,
      dataset_id,
      location: &location,
    });
  }

  print_success(&format!("Dataset {dataset_id} ready"));
  print_location(&location);

  Ok(())
}

pub fn cmd_locate(url: &str, dataset_id: &str, store_layout: &str, output: OutputFormat) -> Result<()> {
  let (_, ria_url) = resolve_url(url)?;
  let location = locate_dataset(&ria_url.base_path, dataset_id, store_layout)?;

  if output.is_json() {
    return print_json(&DatasetReport {
      url: &ria_url.url,
      dataset_id,
      location: &location,
    });
  }

  if let Some(host) = &ria_url.host {
    print_stat("Host", host);
  }
  print_location(&location);

  Ok(())
}

fn print_location(location: &DatasetLocation) {
  print_stat("Repository", &location.repo_dir.display().to_string());
  print_stat("Archives", &location.archive_dir.display().to_string());
  print_stat("Objects", &location.object_dir.display().to_string());
}
