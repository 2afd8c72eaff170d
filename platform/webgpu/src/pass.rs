use crate::*;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DrawCommand {
  Indexed {
    base_vertex: i32,
    indices: Range<u32>,
    instances: Range<u32>,
  },
  Array {
    vertices: Range<u32>,
    instances: Range<u32>,
  },
}

/// One entry of an object's ordered vertex buffer list. The stride is the one
/// the bound pipeline's vertex layout declares for the slot.
#[derive(Clone, Debug)]
pub struct VertexBufferBinding<B> {
  pub buffer: B,
  pub offset: u64,
  pub stride: u64,
}

#[derive(Clone, Debug)]
pub struct IndexBufferBinding<B> {
  pub buffer: B,
  pub offset: u64,
  pub format: gpu::IndexFormat,
}

impl<B> IndexBufferBinding<B> {
  pub fn new(buffer: B, offset: u64, is_32bit: bool) -> Self {
    let format = if is_32bit {
      gpu::IndexFormat::Uint32
    } else {
      gpu::IndexFormat::Uint16
    };
    Self {
      buffer,
      offset,
      format,
    }
  }
}

pub struct GPURenderPass<'a> {
  pass: gpu::RenderPass<'a>,
}

impl<'a> Deref for GPURenderPass<'a> {
  type Target = gpu::RenderPass<'a>;

  fn deref(&self) -> &Self::Target {
    &self.pass
  }
}

impl<'a> DerefMut for GPURenderPass<'a> {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.pass
  }
}

impl<'a> GPURenderPass<'a> {
  pub fn new(pass: gpu::RenderPass<'a>) -> Self {
    Self { pass }
  }

  pub fn set_pipeline_shared(&mut self, pipeline: &GPURenderPipeline) {
    self.pass.set_pipeline(&pipeline.inner)
  }

  pub fn set_vertex_buffer_binding(
    &mut self,
    slot: u32,
    binding: &VertexBufferBinding<Arc<gpu::Buffer>>,
  ) {
    self
      .pass
      .set_vertex_buffer(slot, binding.buffer.slice(binding.offset..))
  }

  pub fn set_index_buffer_binding(&mut self, binding: &IndexBufferBinding<Arc<gpu::Buffer>>) {
    self
      .pass
      .set_index_buffer(binding.buffer.slice(binding.offset..), binding.format)
  }

  pub fn draw_by_command(&mut self, com: &DrawCommand) {
    match com {
      DrawCommand::Indexed {
        base_vertex,
        indices,
        instances,
      } => self
        .pass
        .draw_indexed(indices.clone(), *base_vertex, instances.clone()),
      DrawCommand::Array {
        vertices,
        instances,
      } => self.pass.draw(vertices.clone(), instances.clone()),
    }
  }
}
