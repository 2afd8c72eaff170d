use crate::*;

/// Everything the per object draw loop needs from the surrounding pass.
/// Abstract over the buffer and pipeline types so the loop runs against a
/// recording double in tests, without a device.
pub trait OverlayPassCtx {
  type Buffer;
  type Pipeline;

  fn resolve_pipeline(&mut self, description: &RenderPipelineDescription) -> Self::Pipeline;
  fn set_pipeline(&mut self, pipeline: &Self::Pipeline);
  fn set_vertex_buffer(&mut self, slot: u32, binding: &VertexBufferBinding<Self::Buffer>);
  fn set_index_buffer(&mut self, binding: &IndexBufferBinding<Self::Buffer>);
  fn apply_params(&mut self, params: &WireframeParams);
  fn draw(&mut self, command: &DrawCommand);
}

pub fn fade_color(base: [f32; 4], alpha: f32) -> Vec4 {
  Vec4::new(base[0], base[1], base[2], base[3] * alpha)
}

/// Core of the overlay: two depth configurations per object, occluded first.
/// Nodes are processed in list order and an alpha of zero still draws, the
/// fade must not change which pipelines the frame exercises.
pub fn draw_overlay<C: OverlayPassCtx>(
  ctx: &mut C,
  description: &mut RenderPipelineDescription,
  config: &WireframeOverlayConfig,
  alpha: f32,
  view: &RenderView,
  nodes: &[RenderNode<C::Buffer>],
) {
  let bias = config.world_scale_bias;

  for node in nodes {
    let Some(mesh) = &node.drawable else {
      continue;
    };

    for (slot, binding) in mesh.vertex_buffers.iter().enumerate() {
      ctx.set_vertex_buffer(slot as u32, binding);
    }

    let mut params = WireframeParams {
      world_view_projection: view.view_projection * node.world,
      line_color: Vec4::ZERO,
      world_scale: Vec4::new(bias, bias, bias, config.line_width),
      viewport: Vec4::new(view.viewport_size.x, view.viewport_size.y, 0.0, 0.0),
    };
    description.topology = mesh.topology;

    // visible through scene geometry, at a faint opacity
    description.depth_stencil = DepthStencilMode::Disabled;
    let pipeline = ctx.resolve_pipeline(description);
    ctx.set_pipeline(&pipeline);
    if let Some(index) = &mesh.index_buffer {
      ctx.set_index_buffer(index);
    }
    params.line_color = fade_color(config.occluded_color, alpha);
    ctx.apply_params(&params);
    let command = mesh.draw_command();
    ctx.draw(&command);

    // depth tested against the scene, the bright part of the highlight
    description.depth_stencil = DepthStencilMode::ReadOnly;
    let pipeline = ctx.resolve_pipeline(description);
    ctx.set_pipeline(&pipeline);
    params.line_color = fade_color(config.non_occluded_color, alpha);
    ctx.apply_params(&params);
    ctx.draw(&command);
  }
}

/// Pass scoped borrows handed to the feature once per view per frame. None of
/// them are retained past the draw call.
pub struct FrameDrawContext<'a, 'p> {
  pub device: &'a GPUDevice,
  pub queue: &'a gpu::Queue,
  pub pass: &'a mut GPURenderPass<'p>,
  pub color_format: gpu::TextureFormat,
  pub depth_format: gpu::TextureFormat,
  pub sample_count: u32,
}

pub(crate) struct WgpuOverlayCtx<'a, 'p> {
  pub device: &'a GPUDevice,
  pub queue: &'a gpu::Queue,
  pub pass: &'a mut GPURenderPass<'p>,
  pub effect: &'a mut WireframeEffect,
  pub pipelines: &'a mut PipelineStateCache,
}

impl OverlayPassCtx for WgpuOverlayCtx<'_, '_> {
  type Buffer = Arc<gpu::Buffer>;
  type Pipeline = GPURenderPipeline;

  fn resolve_pipeline(&mut self, description: &RenderPipelineDescription) -> GPURenderPipeline {
    let WgpuOverlayCtx {
      device,
      effect,
      pipelines,
      ..
    } = self;
    pipelines.resolve(description, |d| effect.create_pipeline(device, d))
  }

  fn set_pipeline(&mut self, pipeline: &GPURenderPipeline) {
    self.pass.set_pipeline_shared(pipeline)
  }

  fn set_vertex_buffer(&mut self, slot: u32, binding: &VertexBufferBinding<Arc<gpu::Buffer>>) {
    self.pass.set_vertex_buffer_binding(slot, binding)
  }

  fn set_index_buffer(&mut self, binding: &IndexBufferBinding<Arc<gpu::Buffer>>) {
    self.pass.set_index_buffer_binding(binding)
  }

  fn apply_params(&mut self, params: &WireframeParams) {
    self.effect.apply(params, self.device, self.queue, self.pass)
  }

  fn draw(&mut self, command: &DrawCommand) {
    self.pass.draw_by_command(command)
  }
}
