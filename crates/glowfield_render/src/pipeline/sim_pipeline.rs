//! Compute pipeline for the particle field simulation
//!
//! Runs the velocity and position kernels on the GPU over two ping-pong pairs
//! of storage buffers. Bind group `i` reads pair `i` and writes pair `1 - i`;
//! after each step the roles swap.

use glowfield_sim::{Field, Texel};

use crate::context::ContextError;

use super::types::{workgroup_count, SimUniforms};

/// Compute pipeline for stepping the particle field
#[allow(dead_code)] // Buffers must outlive the bind groups that reference them
pub struct SimPipeline {
    /// Velocity kernel
    velocity_pipeline: wgpu::ComputePipeline,
    /// Position kernel
    position_pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    /// Simulation uniforms (params + attractors)
    uniform_buffer: wgpu::Buffer,
    /// Velocity buffers, indexed by ping-pong slot
    velocity_buffers: [wgpu::Buffer; 2],
    /// Position buffers, indexed by ping-pong slot
    position_buffers: [wgpu::Buffer; 2],
    /// `bind_groups[i]` reads slot i and writes slot 1 - i
    bind_groups: [wgpu::BindGroup; 2],
    /// Slot holding the current state
    current: usize,
    grid_size: u32,
}

impl SimPipeline {
    /// Create a new simulation pipeline for an N×N grid
    ///
    /// `grid_size` should come from [`check_grid_size`].
    pub fn new(device: &wgpu::Device, grid_size: u32) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Simulation Bind Group Layout"),
            entries: &[
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Velocity in
                storage_entry(1, true),
                // Position in
                storage_entry(2, true),
                // Velocity out
                storage_entry(3, false),
                // Position out
                storage_entry(4, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Simulation Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // Load shader
        let shader_source = include_str!("../shaders/simulate.wgsl");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Simulation Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let velocity_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Velocity Compute Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("velocity_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        let position_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Position Compute Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("position_main"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Simulation Uniform Buffer"),
            size: std::mem::size_of::<SimUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let field_size = field_buffer_size(grid_size);
        let velocity_buffers = [
            create_field_buffer(device, "Velocity Buffer A", field_size),
            create_field_buffer(device, "Velocity Buffer B", field_size),
        ];
        let position_buffers = [
            create_field_buffer(device, "Position Buffer A", field_size),
            create_field_buffer(device, "Position Buffer B", field_size),
        ];

        let bind_groups = [
            Self::create_bind_group(
                device,
                &bind_group_layout,
                &uniform_buffer,
                &velocity_buffers,
                &position_buffers,
                0,
            ),
            Self::create_bind_group(
                device,
                &bind_group_layout,
                &uniform_buffer,
                &velocity_buffers,
                &position_buffers,
                1,
            ),
        ];

        Self {
            velocity_pipeline,
            position_pipeline,
            bind_group_layout,
            uniform_buffer,
            velocity_buffers,
            position_buffers,
            bind_groups,
            current: 0,
            grid_size,
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform_buffer: &wgpu::Buffer,
        velocity_buffers: &[wgpu::Buffer; 2],
        position_buffers: &[wgpu::Buffer; 2],
        read_slot: usize,
    ) -> wgpu::BindGroup {
        let write_slot = 1 - read_slot;
        let label = if read_slot == 0 {
            "Simulation Bind Group A->B"
        } else {
            "Simulation Bind Group B->A"
        };
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: velocity_buffers[read_slot].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: position_buffers[read_slot].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: velocity_buffers[write_slot].as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: position_buffers[write_slot].as_entire_binding(),
                },
            ],
        })
    }

    /// Upload kernel parameters and attractors
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &SimUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Replace the current state with the given fields
    pub fn upload_fields(&self, queue: &wgpu::Queue, positions: &Field, velocities: &Field) {
        self.upload_positions(queue, positions);
        queue.write_buffer(
            &self.velocity_buffers[self.current],
            0,
            velocities.as_bytes(),
        );
    }

    /// Overwrite the current position buffer
    ///
    /// This is how a CPU-stepped field reaches the sprite pass.
    pub fn upload_positions(&self, queue: &wgpu::Queue, positions: &Field) {
        if positions.size() as u32 != self.grid_size {
            log::warn!(
                "Ignoring {}x{0} field upload into {}x{1} buffers",
                positions.size(),
                self.grid_size
            );
            return;
        }
        queue.write_buffer(self.current_positions(), 0, positions.as_bytes());
    }

    /// Record one simulation frame: velocity pass, then position pass
    ///
    /// Call update_uniforms() first. The new state becomes current once the
    /// encoder is submitted.
    pub fn step(&mut self, encoder: &mut wgpu::CommandEncoder) {
        let workgroups = workgroup_count(self.grid_size * self.grid_size);
        if workgroups == 0 {
            return;
        }
        let bind_group = &self.bind_groups[self.current];

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Velocity Compute Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.velocity_pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }

        {
            // Separate pass so every velocity write lands before positions read it
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Position Compute Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.position_pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(workgroups, 1, 1);
        }

        self.current = 1 - self.current;
    }

    /// Position buffers by slot, for building sprite bind groups
    pub fn position_buffers(&self) -> [&wgpu::Buffer; 2] {
        [&self.position_buffers[0], &self.position_buffers[1]]
    }

    /// Slot holding the current positions
    pub fn current_slot(&self) -> usize {
        self.current
    }

    /// Buffer the sprite pass should read this frame
    pub fn current_positions(&self) -> &wgpu::Buffer {
        &self.position_buffers[self.current]
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_field_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Check that an N×N grid fits the device's storage and dispatch limits
///
/// Returns N as the `u32` the shaders index with.
pub fn check_grid_size(grid_size: usize, limits: &wgpu::Limits) -> Result<u32, ContextError> {
    let too_large = |reason: String| ContextError::GridTooLarge { grid_size, reason };

    let n = u32::try_from(grid_size)
        .map_err(|_| too_large("dimension does not fit in u32".to_string()))?;
    let texels = n as u64 * n as u64;
    let texel_count = u32::try_from(texels)
        .map_err(|_| too_large(format!("{} particles overflow u32 indexing", texels)))?;

    let buffer_limit =
        (limits.max_storage_buffer_binding_size as u64).min(limits.max_buffer_size);
    let bytes = field_buffer_size(n);
    if bytes > buffer_limit {
        return Err(too_large(format!(
            "{} byte field buffers exceed the {} byte storage limit",
            bytes, buffer_limit
        )));
    }

    let workgroups = workgroup_count(texel_count);
    if workgroups > limits.max_compute_workgroups_per_dimension {
        return Err(too_large(format!(
            "{} workgroups exceed the {} per-dispatch limit",
            workgroups, limits.max_compute_workgroups_per_dimension
        )));
    }

    Ok(n)
}

/// Bytes needed for one N×N field buffer
pub fn field_buffer_size(grid_size: u32) -> u64 {
    let texels = (grid_size as u64 * grid_size as u64).max(1);
    texels * std::mem::size_of::<Texel>() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: GPU tests require a wgpu device which isn't available in unit tests

    #[test]
    fn test_field_buffer_size() {
        // 160 * 160 texels * 16 bytes
        assert_eq!(field_buffer_size(160), 409_600);
    }

    #[test]
    fn test_field_buffer_size_never_zero() {
        assert_eq!(field_buffer_size(0), 16);
    }

    #[test]
    fn test_default_grid_fits_default_limits() {
        assert_eq!(check_grid_size(160, &wgpu::Limits::default()).unwrap(), 160);
        assert_eq!(check_grid_size(2047, &wgpu::Limits::default()).unwrap(), 2047);
    }

    #[test]
    fn test_grid_exceeding_dispatch_limit_rejected() {
        // 2048² / 64 = 65536 workgroups, one over the default limit
        let err = check_grid_size(2048, &wgpu::Limits::default()).unwrap_err();
        assert!(matches!(err, ContextError::GridTooLarge { grid_size: 2048, .. }));
    }

    #[test]
    fn test_grid_exceeding_storage_limit_rejected() {
        let limits = wgpu::Limits {
            max_compute_workgroups_per_dimension: u32::MAX,
            ..wgpu::Limits::default()
        };
        // 16 * 2896² fits in 128 MiB, 16 * 2897² does not
        assert_eq!(check_grid_size(2896, &limits).unwrap(), 2896);
        let err = check_grid_size(2897, &limits).unwrap_err();
        assert!(err.to_string().contains("storage limit"));
        assert!(check_grid_size(3000, &limits).is_err());
    }

    #[test]
    fn test_grid_overflowing_u32_rejected() {
        let limits = wgpu::Limits {
            max_storage_buffer_binding_size: u32::MAX,
            max_buffer_size: u64::MAX,
            max_compute_workgroups_per_dimension: u32::MAX,
            ..wgpu::Limits::default()
        };
        let err = check_grid_size(70_000, &limits).unwrap_err();
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn test_field_bytes_match_buffer_size() {
        let field = Field::new(160);
        assert_eq!(field.as_bytes().len() as u64, field_buffer_size(160));
    }
}
