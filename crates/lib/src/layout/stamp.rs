//! The `ria-layout-version` stamp format.

/// A parsed version stamp: `<version>` or `<version>|<flags>`.
///
/// Only `version` takes part in conflict detection; `flags` is free-form
/// configuration carried along verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionStamp<'a> {
  pub version: &'a str,
  pub flags: Option<&'a str>,
}

impl<'a> VersionStamp<'a> {
  /// Parse stamp content. Only the first line is significant.
  pub fn parse(content: &'a str) -> Self {
    let line = content.lines().next().unwrap_or_default();
    match line.split_once('|') {
      Some((version, flags)) => VersionStamp {
        version: version.trim(),
        flags: Some(flags.trim()),
      },
      None => VersionStamp {
        version: line.trim(),
        flags: None,
      },
    }
  }

  /// Whether two stamps record the same layout version.
  pub fn same_version(&self, other: &VersionStamp<'_>) -> bool {
    self.version == other.version
  }
}
