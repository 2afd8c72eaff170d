use crate::*;

/// The highlight fades out linearly over this span after the last selection
/// change, then stays invisible.
pub const DEFAULT_FADE_DURATION: Duration = Duration::from_secs(1);

/// Tracks the time of the last selection change. The change notification may
/// arrive from another thread than the render thread, so the timestamp is a
/// single atomic; a render thread read never observes a torn value.
pub struct FadeTimer {
  epoch: Instant,
  last_change_micros: AtomicU64,
  duration: Duration,
}

impl FadeTimer {
  pub fn new(duration: Duration) -> Self {
    Self {
      epoch: Instant::now(),
      last_change_micros: AtomicU64::new(0),
      duration,
    }
  }

  /// The one designated write path. Resets the fade origin to now.
  pub fn notify_selection_changed(&self) {
    let now = self.epoch.elapsed().as_micros() as u64;
    self.last_change_micros.store(now, Ordering::Relaxed);
  }

  pub fn compute_alpha(&self, forced_mask: bool) -> f32 {
    if forced_mask {
      return 1.0;
    }
    let now = self.epoch.elapsed().as_micros() as u64;
    let last = self.last_change_micros.load(Ordering::Relaxed);
    fade_alpha(
      Duration::from_micros(now.saturating_sub(last)),
      self.duration,
    )
  }

  /// A callback suitable for a selection service subscription.
  pub fn listener(self: &Arc<Self>) -> SelectionChangedListener {
    let timer = Arc::clone(self);
    Arc::new(move || timer.notify_selection_changed())
  }
}

pub fn fade_alpha(elapsed: Duration, duration: Duration) -> f32 {
  let ratio = elapsed.as_secs_f32() / duration.as_secs_f32();
  (1.0 - ratio).clamp(0.0, 1.0)
}
