use bytemuck::Zeroable;

use crate::*;

pub const WIREFRAME_SHADER: &str = include_str!("shaders/selection_wireframe.wgsl");

/// Per draw shader parameters, mirroring the uniform block the shader
/// declares. Typed and layout checked at compile time.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WireframeParams {
  pub world_view_projection: Mat4,
  pub line_color: Vec4,
  /// xyz: vertex scale, w: line width in pixels
  pub world_scale: Vec4,
  /// xy: viewport size in pixels
  pub viewport: Vec4,
}

/// Owns the overlay shader and its binding state. Parameter uploads follow
/// the set many, apply once discipline: consecutive setters accumulate into
/// the cpu side state and `apply` uploads at most one uniform slot per draw.
pub struct WireframeEffect {
  shader: gpu::ShaderModule,
  bind_layout: GPUBindGroupLayout,
  pipeline_layout: gpu::PipelineLayout,
  params: DiffState<WireframeParams>,
  slab: UniformSlab<WireframeParams>,
  bind_group: gpu::BindGroup,
  current_offset: u32,
  shader_id: ResourceId,
  layout_id: ResourceId,
}

impl WireframeEffect {
  /// Creates and validates the shader module. Blocks on validation, which is
  /// acceptable at initialization only.
  pub fn load(device: &GPUDevice) -> Result<Self, OverlayError> {
    device.push_error_scope(gpu::ErrorFilter::Validation);
    let shader = device.create_shader_module(gpu::ShaderModuleDescriptor {
      label: Some("selection-wireframe"),
      source: gpu::ShaderSource::Wgsl(WIREFRAME_SHADER.into()),
    });
    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
      return Err(OverlayError::ShaderLoad {
        reason: error.to_string(),
      });
    }

    let bind_layout = device.create_and_cache_bindgroup_layout(&[gpu::BindGroupLayoutEntry {
      binding: 0,
      visibility: gpu::ShaderStages::VERTEX | gpu::ShaderStages::FRAGMENT,
      ty: gpu::BindingType::Buffer {
        ty: gpu::BufferBindingType::Uniform,
        has_dynamic_offset: true,
        min_binding_size: None,
      },
      count: None,
    }]);

    let pipeline_layout = device.create_pipeline_layout(&gpu::PipelineLayoutDescriptor {
      label: Some("selection-wireframe"),
      bind_group_layouts: &[bind_layout.inner.as_ref()],
      push_constant_ranges: &[],
    });

    let slab = UniformSlab::create(device, 64);
    let bind_group = Self::create_bind_group(device, &bind_layout, &slab);

    Ok(Self {
      shader,
      bind_layout,
      pipeline_layout,
      params: DiffState::new(WireframeParams::zeroed()),
      slab,
      bind_group,
      current_offset: 0,
      shader_id: alloc_resource_id(),
      layout_id: alloc_resource_id(),
    })
  }

  fn create_bind_group(
    device: &GPUDevice,
    layout: &GPUBindGroupLayout,
    slab: &UniformSlab<WireframeParams>,
  ) -> gpu::BindGroup {
    device.create_bind_group(&gpu::BindGroupDescriptor {
      label: Some("selection-wireframe"),
      layout: layout.inner.as_ref(),
      entries: &[gpu::BindGroupEntry {
        binding: 0,
        resource: slab.binding(),
      }],
    })
  }

  /// Identity of the shader module for pipeline descriptions.
  pub fn shader_id(&self) -> ResourceId {
    self.shader_id
  }

  /// Identity of the pipeline layout for pipeline descriptions.
  pub fn layout_id(&self) -> ResourceId {
    self.layout_id
  }

  pub fn create_pipeline(
    &self,
    device: &GPUDevice,
    description: &RenderPipelineDescription,
  ) -> GPURenderPipeline {
    description.create_pipeline(device, &self.shader, &self.pipeline_layout)
  }

  /// Recycles the uniform slots of the previous frame. Must run once per
  /// frame, after the previous frame's submission; rewinding between the
  /// views of one submission would alias slots that recorded draws still
  /// read. The first apply after this always uploads, so no draw can read a
  /// stale slot.
  pub fn begin_frame(&mut self) {
    self.slab.reset();
    self.params.invalidate();
  }

  /// Starts a view within the current frame. Slots keep accumulating, only
  /// the parameter diff is forced so the view's first apply uploads.
  pub fn begin_view(&mut self) {
    self.params.invalidate();
  }

  /// Uploads the parameter batch if it changed since the last apply and binds
  /// the slot holding the current values. Must run after the setters of a
  /// draw and before the draw itself.
  pub fn apply(
    &mut self,
    params: &WireframeParams,
    device: &GPUDevice,
    queue: &gpu::Queue,
    pass: &mut GPURenderPass,
  ) {
    self.params.set(*params);
    if let Some(value) = self.params.take_changed() {
      if self.slab.is_full() {
        self.slab.grow(device);
        self.bind_group = Self::create_bind_group(device, &self.bind_layout, &self.slab);
      }
      self.current_offset = self.slab.push(value, queue);
    }
    pass.set_bind_group(0, &self.bind_group, &[self.current_offset]);
  }
}
