use core::marker::PhantomData;
use std::num::NonZeroU64;

use bytemuck::Pod;

use crate::*;

/// Cpu side cache with a changed flag, so upload logic can skip untouched
/// data and a batch of sets costs exactly one write.
pub struct DiffState<T> {
  data: T,
  changed: bool,
}

impl<T: Copy + PartialEq> DiffState<T> {
  /// The initial value still needs an upload.
  pub fn new(data: T) -> Self {
    Self {
      data,
      changed: true,
    }
  }

  /// The initial value is already on the gpu.
  pub fn new_synced(data: T) -> Self {
    Self {
      data,
      changed: false,
    }
  }

  pub fn get(&self) -> T {
    self.data
  }

  pub fn set(&mut self, data: T) {
    if self.data != data {
      self.data = data;
      self.changed = true;
    }
  }

  pub fn mutate(&mut self, f: impl FnOnce(&mut T)) {
    f(&mut self.data);
    self.changed = true;
  }

  pub fn invalidate(&mut self) {
    self.changed = true;
  }

  pub fn take_changed(&mut self) -> Option<T> {
    self.changed.then(|| {
      self.changed = false;
      self.data
    })
  }
}

/// Typed uniform buffer with the [`DiffState`] upload discipline.
pub struct UniformBufferData<T: Pod> {
  gpu: gpu::Buffer,
  state: DiffState<T>,
}

impl<T: Pod + PartialEq> UniformBufferData<T> {
  pub fn create(device: &GPUDevice, data: T) -> Self {
    let gpu = device.create_buffer_init(&util::BufferInitDescriptor {
      label: None,
      contents: bytemuck::cast_slice(&[data]),
      usage: gpu::BufferUsages::UNIFORM | gpu::BufferUsages::COPY_DST,
    });

    Self {
      gpu,
      state: DiffState::new_synced(data),
    }
  }

  pub fn get(&self) -> T {
    self.state.get()
  }

  pub fn set(&mut self, data: T) {
    self.state.set(data)
  }

  pub fn mutate(&mut self, f: impl FnOnce(&mut T)) {
    self.state.mutate(f)
  }

  pub fn upload(&mut self, queue: &gpu::Queue) {
    if let Some(data) = self.state.take_changed() {
      queue.write_buffer(&self.gpu, 0, bytemuck::cast_slice(&[data]));
    }
  }

  pub fn binding(&self) -> gpu::BindingResource {
    self.gpu.as_entire_binding()
  }
}

/// Uniform offsets must land on this boundary on every backend we target.
pub const UNIFORM_OFFSET_ALIGNMENT: u32 = 256;

/// Slot bookkeeping of [`UniformSlab`], split out so the reuse rule is
/// testable without a device: within one submission a slot is handed out at
/// most once, the cursor rewinds only at an explicit frame reset. Rewinding
/// earlier would let a later `write_buffer` clobber bytes an already
/// recorded draw still reads, since all queued writes land before any draw
/// of the submission executes.
#[derive(Clone, Copy, Debug)]
pub struct SlotAllocator {
  capacity: u32,
  cursor: u32,
}

impl SlotAllocator {
  pub fn new(capacity: u32) -> Self {
    Self {
      capacity,
      cursor: 0,
    }
  }

  pub fn reset(&mut self) {
    self.cursor = 0;
  }

  pub fn is_full(&self) -> bool {
    self.cursor == self.capacity
  }

  pub fn capacity(&self) -> u32 {
    self.capacity
  }

  pub fn alloc(&mut self) -> u32 {
    assert!(self.cursor < self.capacity);
    let slot = self.cursor;
    self.cursor += 1;
    slot
  }
}

/// Bump allocator handing out one uniform slot per draw, bound through a
/// dynamic offset. Reset once per frame, never between the views of a frame;
/// grows (with a fresh buffer) when a frame needs more slots than the last
/// one.
pub struct UniformSlab<T> {
  buffer: gpu::Buffer,
  slots: SlotAllocator,
  _phantom: PhantomData<T>,
}

impl<T: Pod> UniformSlab<T> {
  pub fn slot_stride() -> u32 {
    let size = std::mem::size_of::<T>() as u32;
    size.div_ceil(UNIFORM_OFFSET_ALIGNMENT) * UNIFORM_OFFSET_ALIGNMENT
  }

  pub fn create(device: &GPUDevice, capacity: u32) -> Self {
    let buffer = device.create_buffer(&gpu::BufferDescriptor {
      label: None,
      size: Self::slot_stride() as u64 * capacity as u64,
      usage: gpu::BufferUsages::UNIFORM | gpu::BufferUsages::COPY_DST,
      mapped_at_creation: false,
    });

    Self {
      buffer,
      slots: SlotAllocator::new(capacity),
      _phantom: PhantomData,
    }
  }

  /// Recycles every slot. Only valid once the previous frame's draws are
  /// submitted, never between views recorded into the same submission.
  pub fn reset(&mut self) {
    self.slots.reset();
  }

  pub fn is_full(&self) -> bool {
    self.slots.is_full()
  }

  /// Replaces the backing buffer with a larger one. Slots handed out before
  /// the call stay valid, they reference the old buffer which lives until its
  /// draws are submitted.
  pub fn grow(&mut self, device: &GPUDevice) {
    *self = Self::create(device, self.slots.capacity() * 2);
  }

  pub fn push(&mut self, value: T, queue: &gpu::Queue) -> u32 {
    let offset = self.slots.alloc() * Self::slot_stride();
    queue.write_buffer(&self.buffer, offset as u64, bytemuck::bytes_of(&value));
    offset
  }

  /// Binding over a single slot, offset applied dynamically at bind time.
  pub fn binding(&self) -> gpu::BindingResource {
    gpu::BindingResource::Buffer(gpu::BufferBinding {
      buffer: &self.buffer,
      offset: 0,
      size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
    })
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn diff_state_uploads_a_set_batch_exactly_once() {
    let mut state = DiffState::new_synced(0u32);
    assert_eq!(state.take_changed(), None);

    state.set(1);
    state.set(2);
    assert_eq!(state.take_changed(), Some(2));
    assert_eq!(state.take_changed(), None);
  }

  #[test]
  fn diff_state_skips_writes_of_the_current_value() {
    let mut state = DiffState::new_synced(7u32);
    state.set(7);
    assert_eq!(state.take_changed(), None);

    state.invalidate();
    assert_eq!(state.take_changed(), Some(7));
  }

  #[test]
  fn fresh_diff_state_needs_an_initial_upload() {
    let mut state = DiffState::new(3u32);
    assert_eq!(state.take_changed(), Some(3));
  }

  #[test]
  fn slots_are_never_reused_within_a_frame() {
    let mut slots = SlotAllocator::new(4);

    // two views recorded into the same submission keep allocating forward
    let first_view: Vec<u32> = (0..2).map(|_| slots.alloc()).collect();
    let second_view: Vec<u32> = (0..2).map(|_| slots.alloc()).collect();
    assert_eq!(first_view, vec![0, 1]);
    assert_eq!(second_view, vec![2, 3]);
    assert!(slots.is_full());

    slots.reset();
    assert_eq!(slots.alloc(), 0);
  }
}
