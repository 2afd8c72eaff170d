use crate::*;

/// Overlay appearance knobs, rgba colors carry their base opacity in the
/// fourth channel and get scaled by the fade alpha at draw time.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WireframeOverlayConfig {
  pub line_width: f32,
  pub occluded_color: [f32; 4],
  pub non_occluded_color: [f32; 4],
  pub fade_seconds: f32,
  /// Slightly above one so the overlay wins depth fights with its own mesh.
  pub world_scale_bias: f32,
}

impl Default for WireframeOverlayConfig {
  fn default() -> Self {
    Self {
      line_width: 3.0,
      occluded_color: [1.0, 1.0, 0.878, 0.02],
      non_occluded_color: [1.0, 1.0, 0.0, 0.3],
      fade_seconds: 1.0,
      world_scale_bias: 1.0001,
    }
  }
}

impl WireframeOverlayConfig {
  /// Deserialized configs can carry anything, a non-finite or non-positive
  /// value falls back to the default span instead of panicking.
  pub fn fade_duration(&self) -> Duration {
    if self.fade_seconds.is_finite() && self.fade_seconds > 0.0 {
      Duration::from_secs_f32(self.fade_seconds)
    } else {
      DEFAULT_FADE_DURATION
    }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn malformed_fade_seconds_falls_back_to_the_default() {
    let valid = WireframeOverlayConfig {
      fade_seconds: 0.5,
      ..Default::default()
    };
    assert_eq!(valid.fade_duration(), Duration::from_millis(500));

    for bad in [-2.0, 0.0, f32::NAN, f32::INFINITY] {
      let config = WireframeOverlayConfig {
        fade_seconds: bad,
        ..Default::default()
      };
      assert_eq!(config.fade_duration(), DEFAULT_FADE_DURATION);
    }
  }
}
