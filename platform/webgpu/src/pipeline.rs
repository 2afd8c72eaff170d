use crate::*;

pub struct GPURenderPipeline {
  pub inner: Arc<gpu::RenderPipeline>,
}

impl GPURenderPipeline {
  pub fn new(pipeline: gpu::RenderPipeline) -> Self {
    Self {
      inner: Arc::new(pipeline),
    }
  }
}

impl Clone for GPURenderPipeline {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
    }
  }
}

impl Deref for GPURenderPipeline {
  type Target = gpu::RenderPipeline;

  fn deref(&self) -> &Self::Target {
    &self.inner
  }
}

/// Vertex buffer layout with owned attribute storage so the full pipeline
/// description stays a plain hashable value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VertexBufferLayoutOwned {
  pub array_stride: u64,
  pub step_mode: gpu::VertexStepMode,
  pub attributes: Vec<gpu::VertexAttribute>,
}

impl VertexBufferLayoutOwned {
  pub fn as_raw(&self) -> gpu::VertexBufferLayout {
    gpu::VertexBufferLayout {
      array_stride: self.array_stride,
      step_mode: self.step_mode,
      attributes: self.attributes.as_slice(),
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendMode {
  Opaque,
  NonPremultiplied,
  Premultiplied,
}

impl BlendMode {
  pub fn state(&self) -> Option<gpu::BlendState> {
    match self {
      BlendMode::Opaque => None,
      BlendMode::NonPremultiplied => Some(gpu::BlendState::ALPHA_BLENDING),
      BlendMode::Premultiplied => Some(gpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
    }
  }
}

/// The depth configurations an overlay style draw switches between. `Disabled`
/// always passes the depth test, `ReadOnly` tests against the existing depth
/// buffer without writing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DepthStencilMode {
  Disabled,
  ReadOnly,
  ReadWrite,
}

impl DepthStencilMode {
  pub fn state(&self, format: gpu::TextureFormat) -> gpu::DepthStencilState {
    let (depth_write_enabled, depth_compare) = match self {
      DepthStencilMode::Disabled => (false, gpu::CompareFunction::Always),
      DepthStencilMode::ReadOnly => (false, gpu::CompareFunction::Less),
      DepthStencilMode::ReadWrite => (true, gpu::CompareFunction::Less),
    };
    gpu::DepthStencilState {
      format,
      depth_write_enabled,
      depth_compare,
      stencil: Default::default(),
      bias: Default::default(),
    }
  }
}

/// Mutable description of everything a render pipeline needs. The caller keeps
/// one value alive, sets the stable fields once, flips the per draw fields as
/// it goes, and resolves a compiled pipeline through [`PipelineStateCache`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RenderPipelineDescription {
  pub label: String,
  pub shader: ResourceId,
  pub layout: ResourceId,
  pub vertex_layouts: Vec<VertexBufferLayoutOwned>,
  pub blend: BlendMode,
  pub cull_mode: Option<gpu::Face>,
  pub polygon_mode: gpu::PolygonMode,
  pub depth_stencil: DepthStencilMode,
  pub topology: gpu::PrimitiveTopology,
  pub color_format: gpu::TextureFormat,
  pub depth_format: Option<gpu::TextureFormat>,
  pub sample_count: u32,
}

impl Default for RenderPipelineDescription {
  fn default() -> Self {
    Self {
      label: String::new(),
      shader: 0,
      layout: 0,
      vertex_layouts: Vec::new(),
      blend: BlendMode::Opaque,
      cull_mode: Some(gpu::Face::Back),
      polygon_mode: gpu::PolygonMode::Fill,
      depth_stencil: DepthStencilMode::ReadWrite,
      topology: gpu::PrimitiveTopology::TriangleList,
      color_format: gpu::TextureFormat::Bgra8UnormSrgb,
      depth_format: None,
      sample_count: 1,
    }
  }
}

impl RenderPipelineDescription {
  pub fn content_hash(&self) -> u64 {
    let mut hasher = FastHasher::default();
    self.hash(&mut hasher);
    hasher.finish()
  }

  pub fn create_pipeline(
    &self,
    device: &GPUDevice,
    shader: &gpu::ShaderModule,
    layout: &gpu::PipelineLayout,
  ) -> GPURenderPipeline {
    let vertex_buffers: Vec<_> = self.vertex_layouts.iter().map(|l| l.as_raw()).collect();
    let targets = [Some(gpu::ColorTargetState {
      format: self.color_format,
      blend: self.blend.state(),
      write_mask: gpu::ColorWrites::ALL,
    })];

    let pipeline = device.create_render_pipeline(&gpu::RenderPipelineDescriptor {
      label: Some(self.label.as_str()),
      layout: Some(layout),
      vertex: gpu::VertexState {
        module: shader,
        entry_point: Some("vs_main"),
        compilation_options: Default::default(),
        buffers: vertex_buffers.as_slice(),
      },
      fragment: Some(gpu::FragmentState {
        module: shader,
        entry_point: Some("fs_main"),
        compilation_options: Default::default(),
        targets: &targets,
      }),
      primitive: gpu::PrimitiveState {
        topology: self.topology,
        strip_index_format: None,
        front_face: gpu::FrontFace::Ccw,
        cull_mode: self.cull_mode,
        unclipped_depth: false,
        polygon_mode: self.polygon_mode,
        conservative: false,
      },
      depth_stencil: self.depth_format.map(|format| self.depth_stencil.state(format)),
      multisample: gpu::MultisampleState {
        count: self.sample_count,
        mask: !0,
        alpha_to_coverage_enabled: false,
      },
      multiview: None,
      cache: None,
    });

    GPURenderPipeline::new(pipeline)
  }
}

/// Content keyed pipeline cache. Resolving an unchanged description returns
/// the previously compiled object without touching the device, so consecutive
/// draws sharing state cost a hash lookup only.
pub struct PipelineStateCache<P = GPURenderPipeline> {
  pipelines: FastHashMap<u64, P>,
}

impl<P> Default for PipelineStateCache<P> {
  fn default() -> Self {
    Self {
      pipelines: Default::default(),
    }
  }
}

impl<P: Clone> PipelineStateCache<P> {
  pub fn resolve(
    &mut self,
    description: &RenderPipelineDescription,
    create: impl FnOnce(&RenderPipelineDescription) -> P,
  ) -> P {
    let key = description.content_hash();
    self
      .pipelines
      .entry(key)
      .or_insert_with(|| {
        log::debug!("pipeline cache miss for {}", description.label);
        create(description)
      })
      .clone()
  }

  pub fn len(&self) -> usize {
    self.pipelines.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pipelines.is_empty()
  }

  pub fn clear(&mut self) {
    self.pipelines.clear();
  }
}
