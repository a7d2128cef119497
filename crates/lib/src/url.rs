//! Verification and decoding of RIA store URLs.
//!
//! Accepted forms:
//!
//! ```text
//! ria+ssh://<host>[:<port>]/<path>
//! ria+file:///<path>
//! ```

use std::fmt;
use std::path::PathBuf;

use percent_encoding::percent_decode_str;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use url::{Host, Url};

use crate::config::UrlRewrites;
use crate::consts::RIA_SCHEME_PREFIX;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
  #[error("got no URL")]
  Empty,

  #[error("invalid URL {url}: {reason}")]
  Parse { url: String, reason: String },

  #[error("missing ria+ prefix in final URL: {0}")]
  MissingPrefix(String),

  #[error("unexpected fragment in RIA-store URL: {0}")]
  Fragment(String),

  #[error("unsupported protocol: {0}. Supported: ssh, file")]
  UnsupportedProtocol(String),
}

/// Transport used to reach a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
  Ssh,
  File,
}

impl Protocol {
  pub fn as_str(self) -> &'static str {
    match self {
      Protocol::Ssh => "ssh",
      Protocol::File => "file",
    }
  }
}

impl fmt::Display for Protocol {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A verified RIA store URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiaUrl {
  pub protocol: Protocol,
  /// Remote host, only set for `ssh`.
  pub host: Option<String>,
  /// Base path of the store on its host.
  pub base_path: PathBuf,
  /// The URL after applying rewrites.
  pub url: String,
}

/// Apply `rewrites` to `url`, then verify and decode the result.
pub fn verify_ria_url(url: &str, rewrites: &UrlRewrites) -> Result<RiaUrl, UrlError> {
  if url.is_empty() {
    return Err(UrlError::Empty);
  }

  let url = rewrites.rewrite(url);
  let parsed = Url::parse(&url).map_err(|e| UrlError::Parse {
    url: url.clone(),
    reason: e.to_string(),
  })?;

  let Some(transport) = parsed.scheme().strip_prefix(RIA_SCHEME_PREFIX) else {
    return Err(UrlError::MissingPrefix(url));
  };

  if let Some(fragment) = parsed.fragment().filter(|f| !f.is_empty()) {
    return Err(UrlError::Fragment(fragment.to_string()));
  }

  let protocol = match transport {
    "ssh" => Protocol::Ssh,
    "file" => Protocol::File,
    other => return Err(UrlError::UnsupportedProtocol(other.to_string())),
  };

  let host = match protocol {
    Protocol::Ssh => parsed.host().map(|host| match host {
      Host::Domain(name) => name.to_ascii_lowercase(),
      Host::Ipv4(addr) => addr.to_string(),
      Host::Ipv6(addr) => addr.to_string(),
    }),
    Protocol::File => None,
  };
  let base_path = PathBuf::from(percent_decode_str(parsed.path()).decode_utf8_lossy().into_owned());

  debug!(url = %url, %protocol, ?host, base_path = %base_path.display(), "verified RIA URL");

  Ok(RiaUrl {
    protocol,
    host,
    base_path,
    url,
  })
}
