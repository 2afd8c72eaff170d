use crate::*;

/// Callback invoked by the hosting editor whenever the set of selected
/// objects changes. May fire from any thread.
pub type SelectionChangedListener = Arc<dyn Fn() + Send + Sync>;

/// Seam to the editor's selection subsystem. The feature subscribes once at
/// registration; the subscription ends when the service drops its listeners.
pub trait SelectionService: Send + Sync {
  /// When true the highlight renders at full opacity, ignoring the fade.
  fn display_mask_forced(&self) -> bool;

  fn subscribe_changes(&self, listener: SelectionChangedListener);
}
