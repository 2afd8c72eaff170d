use crate::*;

/// Camera state for the view being rendered this frame.
#[derive(Clone, Debug)]
pub struct RenderView {
  pub view_projection: Mat4,
  pub viewport_size: Vec2,
}

/// One entry of the per view sorted render list. Read only snapshot supplied
/// by the hosting render graph each frame; nodes of non drawable kinds carry
/// no mesh data and are skipped.
#[derive(Clone, Debug)]
pub struct RenderNode<B> {
  pub world: Mat4,
  pub drawable: Option<MeshDrawData<B>>,
}

#[derive(Clone, Debug)]
pub struct MeshDrawData<B> {
  pub vertex_buffers: Vec<VertexBufferBinding<B>>,
  pub index_buffer: Option<IndexBufferBinding<B>>,
  pub draw_count: u32,
  pub start_location: u32,
  pub topology: gpu::PrimitiveTopology,
}

impl<B> MeshDrawData<B> {
  pub fn draw_command(&self) -> DrawCommand {
    let range = self.start_location..self.start_location + self.draw_count;
    match &self.index_buffer {
      Some(_) => DrawCommand::Indexed {
        base_vertex: 0,
        indices: range,
        instances: 0..1,
      },
      None => DrawCommand::Array {
        vertices: range,
        instances: 0..1,
      },
    }
  }
}

/// Position, normal, uv interleaved. The overlay shader only reads position
/// but the layout has to match the buffers the scene meshes already carry.
pub fn standard_vertex_layout() -> VertexBufferLayoutOwned {
  VertexBufferLayoutOwned {
    array_stride: 8 * 4,
    step_mode: gpu::VertexStepMode::Vertex,
    attributes: vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2].to_vec(),
  }
}
