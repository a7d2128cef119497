mod archive;
mod info;
mod store;
mod url;

pub use archive::{cmd_compress, cmd_extract};
pub use info::cmd_info;
pub use store::{cmd_init_dataset, cmd_init_store, cmd_locate};
pub use url::cmd_url;

use anyhow::{Context, Result};
use riastore_lib::config::Config;
use riastore_lib::url::{RiaUrl, verify_ria_url};

/// Load the configuration and verify `url` against its rewrites.
fn resolve_url(url: &str) -> Result<(Config, RiaUrl)> {
  let config = Config::load().context("Failed to load configuration")?;
  let ria_url = verify_ria_url(url, &config.url_rewrites).with_context(|| format!("Invalid store URL {url:?}"))?;
  Ok((config, ria_url))
}
