use anyhow::Result;

use crate::cmd::resolve_url;
use crate::output::{OutputFormat, print_json, print_stat, print_success};

pub fn cmd_url(url: &str, output: OutputFormat) -> Result<()> {
  let (_, ria_url) = resolve_url(url)?;

  if output.is_json() {
    return print_json(&ria_url);
  }

  print_success("Valid RIA URL");
  print_stat("URL", &ria_url.url);
  print_stat("Protocol", ria_url.protocol.as_str());
  if let Some(host) = &ria_url.host {
    print_stat("Host", host);
  }
  print_stat("Base path", &ria_url.base_path.display().to_string());

  Ok(())
}
