use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EngineVersion {
  pub major: u32,
  pub minor: u32,
  pub patch: u32,
}

/// Hosting side collaborator that inspects an opened project and reports the
/// engine version it targets, so the editor can gate this feature by version.
/// Returns `None` when no engine installation can be detected.
pub trait EngineVersionResolver {
  fn resolve_engine_version(&self, solution: &Path) -> Option<EngineVersion>;
}
