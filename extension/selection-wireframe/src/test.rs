use std::sync::Mutex;

use crate::*;

#[derive(Clone, Debug, PartialEq)]
struct MockPipeline {
  id: usize,
  depth: DepthStencilMode,
  topology: gpu::PrimitiveTopology,
}

#[derive(Debug, PartialEq)]
enum Event {
  VertexBuffer { slot: u32 },
  IndexBuffer { format: gpu::IndexFormat },
  Pipeline(MockPipeline),
  Apply(WireframeParams),
  Draw(DrawCommand),
}

/// Records the full pass command stream instead of talking to a device, with
/// the same pipeline cache discipline as the real context.
#[derive(Default)]
struct MockCtx {
  cache: PipelineStateCache<MockPipeline>,
  compiled: usize,
  events: Vec<Event>,
}

impl OverlayPassCtx for MockCtx {
  type Buffer = ();
  type Pipeline = MockPipeline;

  fn resolve_pipeline(&mut self, description: &RenderPipelineDescription) -> MockPipeline {
    let MockCtx {
      cache, compiled, ..
    } = self;
    cache.resolve(description, |d| {
      *compiled += 1;
      MockPipeline {
        id: *compiled,
        depth: d.depth_stencil,
        topology: d.topology,
      }
    })
  }

  fn set_pipeline(&mut self, pipeline: &MockPipeline) {
    self.events.push(Event::Pipeline(pipeline.clone()))
  }

  fn set_vertex_buffer(&mut self, slot: u32, _binding: &VertexBufferBinding<()>) {
    self.events.push(Event::VertexBuffer { slot })
  }

  fn set_index_buffer(&mut self, binding: &IndexBufferBinding<()>) {
    self.events.push(Event::IndexBuffer {
      format: binding.format,
    })
  }

  fn apply_params(&mut self, params: &WireframeParams) {
    self.events.push(Event::Apply(*params))
  }

  fn draw(&mut self, command: &DrawCommand) {
    self.events.push(Event::Draw(command.clone()))
  }
}

impl MockCtx {
  fn depth_modes_of_set_pipelines(&self) -> Vec<DepthStencilMode> {
    self
      .events
      .iter()
      .filter_map(|e| match e {
        Event::Pipeline(p) => Some(p.depth),
        _ => None,
      })
      .collect()
  }

  fn draws(&self) -> Vec<&DrawCommand> {
    self
      .events
      .iter()
      .filter_map(|e| match e {
        Event::Draw(c) => Some(c),
        _ => None,
      })
      .collect()
  }

  fn applied_colors(&self) -> Vec<Vec4> {
    self
      .events
      .iter()
      .filter_map(|e| match e {
        Event::Apply(p) => Some(p.line_color),
        _ => None,
      })
      .collect()
  }
}

fn test_view() -> RenderView {
  RenderView {
    view_projection: Mat4::IDENTITY,
    viewport_size: Vec2::new(1280.0, 720.0),
  }
}

fn base_description() -> RenderPipelineDescription {
  RenderPipelineDescription {
    label: "selection-wireframe".into(),
    polygon_mode: gpu::PolygonMode::Line,
    cull_mode: None,
    blend: BlendMode::NonPremultiplied,
    ..Default::default()
  }
}

fn indexed_node(is_32bit: bool) -> RenderNode<()> {
  RenderNode {
    world: Mat4::IDENTITY,
    drawable: Some(MeshDrawData {
      vertex_buffers: vec![VertexBufferBinding {
        buffer: (),
        offset: 0,
        stride: 32,
      }],
      index_buffer: Some(IndexBufferBinding::new((), 0, is_32bit)),
      draw_count: 36,
      start_location: 0,
      topology: gpu::PrimitiveTopology::TriangleList,
    }),
  }
}

fn array_node() -> RenderNode<()> {
  RenderNode {
    world: Mat4::IDENTITY,
    drawable: Some(MeshDrawData {
      vertex_buffers: vec![VertexBufferBinding {
        buffer: (),
        offset: 0,
        stride: 32,
      }],
      index_buffer: None,
      draw_count: 24,
      start_location: 8,
      topology: gpu::PrimitiveTopology::TriangleList,
    }),
  }
}

fn non_drawable_node() -> RenderNode<()> {
  RenderNode {
    world: Mat4::IDENTITY,
    drawable: None,
  }
}

fn run(ctx: &mut MockCtx, alpha: f32, nodes: &[RenderNode<()>]) {
  let mut description = base_description();
  let config = WireframeOverlayConfig::default();
  draw_overlay(ctx, &mut description, &config, alpha, &test_view(), nodes);
}

#[test]
fn each_object_gets_an_occluded_pass_then_a_depth_tested_pass() {
  let mut ctx = MockCtx::default();
  run(&mut ctx, 1.0, &[indexed_node(true), indexed_node(true)]);

  assert_eq!(
    ctx.depth_modes_of_set_pipelines(),
    vec![
      DepthStencilMode::Disabled,
      DepthStencilMode::ReadOnly,
      DepthStencilMode::Disabled,
      DepthStencilMode::ReadOnly,
    ]
  );
  assert_eq!(ctx.draws().len(), 4);

  // within one object the occluded draw comes before the depth tested one
  let stream: Vec<Option<DepthStencilMode>> = ctx
    .events
    .iter()
    .filter_map(|e| match e {
      Event::Pipeline(p) => Some(Some(p.depth)),
      Event::Draw(_) => Some(None),
      _ => None,
    })
    .collect();
  let per_object = [
    Some(DepthStencilMode::Disabled),
    None,
    Some(DepthStencilMode::ReadOnly),
    None,
  ];
  assert_eq!(stream.len(), 8);
  for chunk in stream.chunks(4) {
    assert_eq!(chunk, per_object.as_slice());
  }
}

#[test]
fn dispatch_is_indexed_exactly_when_an_index_buffer_is_present() {
  let mut ctx = MockCtx::default();
  run(&mut ctx, 1.0, &[array_node()]);
  let expected = DrawCommand::Array {
    vertices: 8..32,
    instances: 0..1,
  };
  assert_eq!(ctx.draws(), vec![&expected, &expected]);
  assert!(!ctx.events.iter().any(|e| matches!(e, Event::IndexBuffer { .. })));

  let mut ctx = MockCtx::default();
  run(&mut ctx, 1.0, &[indexed_node(false)]);
  let expected = DrawCommand::Indexed {
    base_vertex: 0,
    indices: 0..36,
    instances: 0..1,
  };
  assert_eq!(ctx.draws(), vec![&expected, &expected]);
  assert!(ctx.events.contains(&Event::IndexBuffer {
    format: gpu::IndexFormat::Uint16
  }));

  let mut ctx = MockCtx::default();
  run(&mut ctx, 1.0, &[indexed_node(true)]);
  assert!(ctx.events.contains(&Event::IndexBuffer {
    format: gpu::IndexFormat::Uint32
  }));
}

#[test]
fn pipelines_are_compiled_once_per_configuration() {
  let mut ctx = MockCtx::default();
  let nodes = [indexed_node(true), indexed_node(true), array_node()];

  // two frames over the same scene
  run(&mut ctx, 1.0, &nodes);
  run(&mut ctx, 0.3, &nodes);

  // one pipeline per depth mode, every object shares the topology
  assert_eq!(ctx.compiled, 2);
}

#[test]
fn zero_alpha_still_issues_both_passes() {
  let mut ctx = MockCtx::default();
  run(&mut ctx, 0.0, &[indexed_node(true)]);

  assert_eq!(ctx.draws().len(), 2);
  for color in ctx.applied_colors() {
    assert_eq!(color.w, 0.0);
  }
}

#[test]
fn fade_alpha_scales_the_configured_base_opacities() {
  let mut ctx = MockCtx::default();
  run(&mut ctx, 0.5, &[array_node()]);

  let config = WireframeOverlayConfig::default();
  let colors = ctx.applied_colors();
  assert_eq!(colors[0].w, config.occluded_color[3] * 0.5);
  assert_eq!(colors[1].w, config.non_occluded_color[3] * 0.5);
  assert!(colors[1].w > colors[0].w);
}

#[test]
fn nodes_without_drawable_data_are_skipped_silently() {
  let mut ctx = MockCtx::default();
  run(
    &mut ctx,
    1.0,
    &[non_drawable_node(), array_node(), non_drawable_node()],
  );
  assert_eq!(ctx.draws().len(), 2);
}

#[test]
fn per_object_parameters_compose_world_and_view_projection() {
  let mut ctx = MockCtx::default();
  let view = RenderView {
    view_projection: Mat4::from_scale(glam::Vec3::splat(2.0)),
    viewport_size: Vec2::new(640.0, 480.0),
  };
  let node = RenderNode {
    world: Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0)),
    ..array_node()
  };
  let mut description = base_description();
  let config = WireframeOverlayConfig::default();
  draw_overlay(&mut ctx, &mut description, &config, 1.0, &view, &[node]);

  let expected = view.view_projection * Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
  let Some(Event::Apply(params)) = ctx
    .events
    .iter()
    .find(|e| matches!(e, Event::Apply(_)))
  else {
    panic!("no parameters applied");
  };
  assert_eq!(params.world_view_projection, expected);
  assert_eq!(params.world_scale.w, config.line_width);
  assert!(params.world_scale.x > 1.0);
  assert_eq!(params.viewport.x, 640.0);
  assert_eq!(params.viewport.y, 480.0);
}

#[derive(Default)]
struct StubSelectionService {
  forced: bool,
  listeners: Mutex<Vec<SelectionChangedListener>>,
}

impl StubSelectionService {
  fn fire_changed(&self) {
    for listener in self.listeners.lock().unwrap().iter() {
      listener()
    }
  }
}

impl SelectionService for StubSelectionService {
  fn display_mask_forced(&self) -> bool {
    self.forced
  }

  fn subscribe_changes(&self, listener: SelectionChangedListener) {
    self.listeners.lock().unwrap().push(listener)
  }
}

#[test]
fn service_notifications_drive_the_fade_timer() {
  let timer = Arc::new(FadeTimer::new(std::time::Duration::from_millis(50)));
  let service = StubSelectionService::default();
  service.subscribe_changes(timer.listener());

  std::thread::sleep(std::time::Duration::from_millis(60));
  assert_eq!(timer.compute_alpha(false), 0.0);

  service.fire_changed();
  assert!(timer.compute_alpha(false) > 0.5);
}

#[test]
fn forced_display_mask_overrides_an_expired_fade() {
  let timer = FadeTimer::new(std::time::Duration::from_millis(10));
  std::thread::sleep(std::time::Duration::from_millis(20));
  assert_eq!(timer.compute_alpha(false), 0.0);
  assert_eq!(timer.compute_alpha(true), 1.0);
}
