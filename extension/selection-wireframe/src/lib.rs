mod config;
mod draw;
mod effect;
mod fade;
mod node;
mod service;
mod version;

#[cfg(test)]
mod test;

use std::{
  sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
  },
  time::{Duration, Instant},
};

use glam::{Mat4, Vec2, Vec4};
pub use sceneview_webgpu::*;
use sceneview_webgpu::wgpu as gpu;

pub use config::*;
pub use draw::*;
pub use effect::*;
pub use fade::*;
pub use node::*;
pub use service::*;
pub use version::*;

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
  #[error("failed to load the selection wireframe shader: {reason}")]
  ShaderLoad { reason: String },
}

/// Draws an animated x-ray wireframe over the selected objects of a view.
/// Each object gets two passes, first everywhere ignoring depth at a faint
/// opacity, then depth tested at full strength, so the selection stays
/// readable through occluding geometry.
pub struct SelectionWireframeFeature {
  effect: WireframeEffect,
  description: RenderPipelineDescription,
  pipelines: PipelineStateCache,
  fade: Arc<FadeTimer>,
  selection: Option<Arc<dyn SelectionService>>,
  missing_service_warned: bool,
  config: WireframeOverlayConfig,
}

impl SelectionWireframeFeature {
  pub fn new(device: &GPUDevice, config: WireframeOverlayConfig) -> Result<Self, OverlayError> {
    let effect = WireframeEffect::load(device)?;

    // fields below stay fixed for the feature lifetime, only depth mode,
    // topology and target formats change per draw
    let description = RenderPipelineDescription {
      label: "selection-wireframe".into(),
      shader: effect.shader_id(),
      layout: effect.layout_id(),
      vertex_layouts: vec![standard_vertex_layout()],
      blend: BlendMode::NonPremultiplied,
      cull_mode: None,
      polygon_mode: gpu::PolygonMode::Line,
      ..Default::default()
    };

    Ok(Self {
      effect,
      description,
      pipelines: Default::default(),
      fade: Arc::new(FadeTimer::new(config.fade_duration())),
      selection: None,
      missing_service_warned: false,
      config,
    })
  }

  /// Hooks the editor's selection subsystem up to the fade animation. Without
  /// this the feature still draws, using the time based fade only.
  pub fn register_selection_service(&mut self, service: Arc<dyn SelectionService>) {
    service.subscribe_changes(self.fade.listener());
    self.selection = Some(service);
  }

  pub fn fade_timer(&self) -> &Arc<FadeTimer> {
    &self.fade
  }

  fn frame_alpha(&mut self) -> f32 {
    match &self.selection {
      Some(service) => self.fade.compute_alpha(service.display_mask_forced()),
      None => {
        if !self.missing_service_warned {
          log::warn!("selection service not registered, highlight fades on time only");
          self.missing_service_warned = true;
        }
        self.fade.compute_alpha(false)
      }
    }
  }

  /// Marks the frame boundary. Call once per frame, before the first view's
  /// `draw` and after the previous frame was submitted; the uniform slots of
  /// the previous submission are recycled here and nowhere else.
  pub fn begin_frame(&mut self) {
    self.effect.begin_frame();
  }

  /// Renders the overlay for one view. May run several times per frame, one
  /// per view, all into the same submission. Nodes are drawn in list order;
  /// the borrows in `ctx` are not retained past the call.
  pub fn draw(
    &mut self,
    ctx: &mut FrameDrawContext,
    view: &RenderView,
    nodes: &[RenderNode<Arc<gpu::Buffer>>],
  ) {
    self.description.color_format = ctx.color_format;
    self.description.depth_format = Some(ctx.depth_format);
    self.description.sample_count = ctx.sample_count;

    let alpha = self.frame_alpha();
    self.effect.begin_view();

    let mut pass_ctx = WgpuOverlayCtx {
      device: ctx.device,
      queue: ctx.queue,
      pass: &mut *ctx.pass,
      effect: &mut self.effect,
      pipelines: &mut self.pipelines,
    };
    draw_overlay(
      &mut pass_ctx,
      &mut self.description,
      &self.config,
      alpha,
      view,
      nodes,
    );
  }
}
