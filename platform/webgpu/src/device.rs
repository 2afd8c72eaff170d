use parking_lot::RwLock;

use crate::*;

#[derive(Clone)]
pub struct GPUDevice {
  inner: Arc<GPUDeviceInner>,
}

struct GPUDeviceInner {
  device: gpu::Device,
  bindgroup_layout_cache: RwLock<FastHashMap<u64, GPUBindGroupLayout>>,
}

impl GPUDevice {
  pub fn new(device: gpu::Device) -> Self {
    let inner = GPUDeviceInner {
      device,
      bindgroup_layout_cache: Default::default(),
    };

    Self {
      inner: Arc::new(inner),
    }
  }

  pub fn create_and_cache_bindgroup_layout(
    &self,
    layouts: &[gpu::BindGroupLayoutEntry],
  ) -> GPUBindGroupLayout {
    let mut hasher = FastHasher::default();
    layouts.hash(&mut hasher);
    let key = hasher.finish();

    if let Some(layout) = self.inner.bindgroup_layout_cache.read().get(&key) {
      return layout.clone();
    }

    self
      .inner
      .bindgroup_layout_cache
      .write()
      .entry(key)
      .or_insert_with(|| {
        let inner = self
          .inner
          .device
          .create_bind_group_layout(&gpu::BindGroupLayoutDescriptor {
            label: None,
            entries: layouts,
          });
        GPUBindGroupLayout {
          inner: Arc::new(inner),
          cache_id: key,
        }
      })
      .clone()
  }
}

impl Deref for GPUDevice {
  type Target = gpu::Device;

  fn deref(&self) -> &Self::Target {
    &self.inner.device
  }
}

impl AsRef<GPUDevice> for GPUDevice {
  fn as_ref(&self) -> &GPUDevice {
    self
  }
}

#[derive(Clone)]
pub struct GPUBindGroupLayout {
  pub inner: Arc<gpu::BindGroupLayout>,
  pub cache_id: u64,
}

impl Deref for GPUBindGroupLayout {
  type Target = gpu::BindGroupLayout;

  fn deref(&self) -> &Self::Target {
    &self.inner
  }
}
