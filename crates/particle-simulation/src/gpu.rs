//! wgpu-backed parallel executor
//!
//! Each dispatch uploads the interchange buffer, runs one compute pass with
//! one invocation per particle, copies the output into a staging buffer and
//! blocks until it is mapped and read back. Input and output live in separate
//! device buffers so no invocation can observe another's write.

use crate::buffer::{InterchangeBuffer, PARTICLE_STRIDE};
use crate::error::BackendError;
use crate::executor::ParallelExecutor;
use crate::kernel::{KernelSource, KERNEL_ENTRY_POINT, WORKGROUP_SIZE};
use crate::params::KernelParams;
use std::sync::mpsc;
use std::time::Duration;
use wgpu::util::DeviceExt;

/// Parallel executor running the particle update kernel on a compute device
pub struct GpuExecutor {
    device: wgpu::Device,
    queue: wgpu::Queue,

    // Buffers
    input_buffer: wgpu::Buffer,
    output_buffer: wgpu::Buffer,
    staging_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,

    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,

    particle_count: u32,
    timeout: Duration,
    adapter_name: String,
}

impl GpuExecutor {
    /// Acquire a compute device and build the kernel for `particle_count`
    /// particles. Blocks on adapter and device creation.
    pub fn new(
        particle_count: usize,
        kernel: &KernelSource,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        pollster::block_on(Self::new_async(particle_count, kernel, timeout))
    }

    pub async fn new_async(
        particle_count: usize,
        kernel: &KernelSource,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        // Read the kernel first so a missing file is reported before any device work
        let source = kernel.load()?;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await?;

        let adapter_name = adapter.get_info().name;
        log::info!("Using compute adapter: {}", adapter_name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Particle Compute Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let mut executor = Self::with_device(device, queue, particle_count, &source, timeout)?;
        executor.adapter_name = adapter_name;
        Ok(executor)
    }

    /// Build the kernel on an existing device and queue.
    pub fn with_device(
        device: wgpu::Device,
        queue: wgpu::Queue,
        particle_count: usize,
        kernel_source: &str,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        // wgpu rejects zero-sized bindings
        let buffer_size = ((particle_count * PARTICLE_STRIDE) as u64).max(PARTICLE_STRIDE as u64);

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Update Kernel"),
            source: wgpu::ShaderSource::Wgsl(kernel_source.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Update Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Update Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Particle Update Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some(KERNEL_ENTRY_POINT),
            compilation_options: Default::default(),
            cache: None,
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(BackendError::KernelCompile(error.to_string()));
        }

        let input_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Input Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Output Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Particle Staging Buffer"),
            size: buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Kernel Params Buffer"),
            contents: bytemuck::bytes_of(&KernelParams::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Particle Update Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: input_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        log::info!("Particle update kernel ready for {} particles", particle_count);

        Ok(Self {
            device,
            queue,
            input_buffer,
            output_buffer,
            staging_buffer,
            params_buffer,
            pipeline,
            bind_group,
            particle_count: particle_count as u32,
            timeout,
            adapter_name: String::from("external device"),
        })
    }

    pub fn adapter_name(&self) -> &str {
        &self.adapter_name
    }

    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    fn wait(&self) -> Result<(), BackendError> {
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(self.timeout),
            })
            .map_err(|error| match error {
                wgpu::PollError::Timeout => BackendError::Timeout(self.timeout),
                other => BackendError::Poll(other),
            })?;
        Ok(())
    }

    fn read_back(&self, buffer: &mut InterchangeBuffer, size: u64) -> Result<(), BackendError> {
        let slice = self.staging_buffer.slice(..size);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            // Receiver only disappears if read_back already gave up
            let _ = tx.send(result);
        });

        self.wait()?;
        rx.recv_timeout(self.timeout)
            .map_err(|_| BackendError::Timeout(self.timeout))??;

        {
            let data = slice.get_mapped_range();
            buffer.copy_from_bytes(&data);
        }
        self.staging_buffer.unmap();
        Ok(())
    }
}

impl ParallelExecutor for GpuExecutor {
    fn name(&self) -> &str {
        "gpu"
    }

    fn dispatch(
        &mut self,
        buffer: &mut InterchangeBuffer,
        params: &KernelParams,
    ) -> Result<(), BackendError> {
        let count = self.particle_count as usize;
        if buffer.len() != count || params.particle_count != self.particle_count {
            return Err(BackendError::BufferShape {
                expected: count,
                actual: buffer.len(),
            });
        }
        if count == 0 {
            return Ok(());
        }

        let size = buffer.as_bytes().len() as u64;
        self.queue.write_buffer(&self.input_buffer, 0, buffer.as_bytes());
        self.queue
            .write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(params));

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Particle Update Encoder"),
            });

        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Particle Update Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, &self.bind_group, &[]);
            compute_pass.dispatch_workgroups(self.particle_count.div_ceil(WORKGROUP_SIZE), 1, 1);
        }

        encoder.copy_buffer_to_buffer(&self.output_buffer, 0, &self.staging_buffer, 0, size);
        self.queue.submit(std::iter::once(encoder.finish()));

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(BackendError::Dispatch(error.to_string()));
        }

        self.read_back(buffer, size)?;
        log::trace!("Dispatched {} work items on {}", count, self.adapter_name);
        Ok(())
    }
}
