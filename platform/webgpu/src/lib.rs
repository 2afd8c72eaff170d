mod device;
mod pass;
mod pipeline;
mod uniform;

use std::{
  hash::{Hash, Hasher},
  ops::{Deref, DerefMut, Range},
  sync::atomic::{AtomicU64, Ordering},
  sync::Arc,
};

pub use device::*;
pub use pass::*;
pub use pipeline::*;
pub use uniform::*;
pub use wgpu;
use wgpu as gpu;
// note: we can not just use * because it cause name conflict
pub use gpu::{
  util, util::DeviceExt, vertex_attr_array, BindGroupDescriptor, BindGroupEntry,
  BindGroupLayoutEntry, BindingResource, BindingType, Buffer, BufferBinding, BufferBindingType,
  BufferUsages, Color, CompareFunction, Device, ErrorFilter, Face, IndexFormat, LoadOp, Operations,
  PipelineLayout, PipelineLayoutDescriptor, PolygonMode, PrimitiveTopology, Queue,
  RenderPassColorAttachment, RenderPassDescriptor, ShaderModule, ShaderModuleDescriptor,
  ShaderSource, ShaderStages, StoreOp, TextureFormat, TextureView, VertexAttribute, VertexFormat,
  VertexStepMode,
};

// https://nnethercote.github.io/perf-book/hashing.html
pub type FastHasher = rustc_hash::FxHasher;
pub type FastHasherBuilder = std::hash::BuildHasherDefault<FastHasher>;
pub type FastHashMap<K, V> = std::collections::HashMap<K, V, FastHasherBuilder>;

/// Stable identity for device objects referenced from hashable descriptions,
/// for example shader modules and pipeline layouts.
pub type ResourceId = u64;

static RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

pub fn alloc_resource_id() -> ResourceId {
  RESOURCE_ID.fetch_add(1, Ordering::Relaxed)
}
