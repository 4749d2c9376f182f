use crate::error::LbvhError;

/// Headless GPU device handle: no surface, no window. This crate only ever
/// dispatches compute work and reads results back via staging buffers.
pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter: wgpu::Adapter,
}

impl GpuContext {
    pub fn new() -> Result<Self, LbvhError> {
        // Prefer Vulkan/Metal/DX12 — these support compute shaders and
        // push constants. OpenGL fallback lacks both.
        let backends = wgpu::Backends::VULKAN | wgpu::Backends::METAL | wgpu::Backends::DX12;
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| {
            LbvhError::DeviceAllocationFailed(
                "no suitable GPU adapter found; LBVH builder requires Vulkan, Metal, or DX12"
                    .to_string(),
            )
        })?;

        let info = adapter.get_info();
        log::info!("Using GPU: {} (backend: {:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("LBVH Device"),
                required_features: wgpu::Features::PUSH_CONSTANTS,
                required_limits: wgpu::Limits {
                    max_push_constant_size: 64,
                    ..adapter.limits()
                },
                ..Default::default()
            },
            None,
        ))
        .map_err(|e| LbvhError::DeviceAllocationFailed(e.to_string()))?;

        Ok(Self {
            device,
            queue,
            adapter,
        })
    }

    /// Upload host data into a fresh storage buffer.
    pub fn upload_via_staging<T: bytemuck::Pod>(&self, data: &[T], label: &str) -> wgpu::Buffer {
        crate::gpu::buffers::create_storage_buffer(&self.device, data, label, false)
    }

    /// Copy `buffer` to a `MAP_READ` staging buffer, submit, block until the
    /// queue is idle, then map and return the contents as owned `T`s.
    pub fn download_via_staging<T: bytemuck::Pod>(
        &self,
        buffer: &wgpu::Buffer,
        count: usize,
    ) -> Result<Vec<T>, LbvhError> {
        let size = (count * std::mem::size_of::<T>()) as u64;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("download staging buffer"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("download encoder"),
            });
        encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, size);
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        slice.map_async(wgpu::MapMode::Read, |_| {});
        self.device.poll(wgpu::Maintain::Wait);

        let mapped = slice.get_mapped_range();
        let result: Vec<T> = bytemuck::cast_slice(&mapped).to_vec();
        drop(mapped);
        staging.unmap();

        Ok(result)
    }

    /// Submit a finished command buffer and block until the queue is idle.
    pub fn submit_and_wait(&self, encoder: wgpu::CommandEncoder) -> Result<(), LbvhError> {
        self.queue.submit(std::iter::once(encoder.finish()));
        self.device.poll(wgpu::Maintain::Wait);
        Ok(())
    }
}
