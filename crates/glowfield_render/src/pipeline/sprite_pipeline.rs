//! Render pipeline for additive glow sprites
//!
//! Draws one instanced quad per particle. Each instance carries its reference
//! coordinate; the vertex shader looks the particle's position up in whichever
//! position buffer is current.

use glowfield_sim::ReferenceCoord;
use wgpu::util::DeviceExt;

use super::types::{SpriteUniforms, SPRITE_VERTEX_COUNT};

/// `src * src_alpha + dst`: overlapping sprites brighten instead of occluding
pub const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Render pipeline for particle sprites
#[allow(dead_code)] // bind_group_layout kept for bind group recreation
pub struct SpritePipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    /// Per-instance reference coordinates
    reference_buffer: wgpu::Buffer,
    /// One bind group per position buffer slot
    bind_groups: [wgpu::BindGroup; 2],
    instance_count: u32,
}

impl SpritePipeline {
    /// Create a sprite pipeline reading from the given position buffer slots
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        grid_size: u32,
        position_buffers: [&wgpu::Buffer; 2],
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Bind Group Layout"),
            entries: &[
                // Uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Positions
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // Load shader
        let shader_source = include_str!("../shaders/sprite.wgsl");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sprite Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Self::instance_buffer_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(ADDITIVE_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            // Sprites never occlude each other
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Uniform Buffer"),
            contents: bytemuck::bytes_of(&SpriteUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let references = reference_coords(grid_size as usize);
        let reference_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Reference Buffer"),
            contents: bytemuck::cast_slice(&references),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let bind_groups = [0, 1].map(|slot| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Sprite Bind Group"),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: position_buffers[slot].as_entire_binding(),
                    },
                ],
            })
        });

        Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
            reference_buffer,
            bind_groups,
            instance_count: references.len() as u32,
        }
    }

    /// Vertex buffer layout for per-instance reference coordinates
    fn instance_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // reference: vec2<f32>
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                },
            ],
        }
    }

    /// Update uniforms
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &SpriteUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Clear the target and draw every particle from the given position slot
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        position_slot: usize,
        clear_color: wgpu::Color,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Sprite Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_groups[position_slot & 1], &[]);
        render_pass.set_vertex_buffer(0, self.reference_buffer.slice(..));
        render_pass.draw(0..SPRITE_VERTEX_COUNT, 0..self.instance_count);
    }

    /// Number of sprites drawn per frame
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }
}

/// Flattened reference coordinates for every particle, row-major
pub fn reference_coords(grid_size: usize) -> Vec<[f32; 2]> {
    ReferenceCoord::grid(grid_size)
        .map(|r| r.uv().to_array())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_buffer_layout_stride() {
        let layout = SpritePipeline::instance_buffer_layout();
        assert_eq!(layout.array_stride, 8);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);
    }

    #[test]
    fn test_reference_coords() {
        let refs = reference_coords(3);
        assert_eq!(refs.len(), 9);
        assert_eq!(refs[0], [0.0, 0.0]);
        assert_eq!(refs[1], [0.5, 0.0]);
        assert_eq!(refs[8], [1.0, 1.0]);
    }

    #[test]
    fn test_additive_blending_keeps_destination() {
        assert_eq!(ADDITIVE_BLENDING.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(ADDITIVE_BLENDING.color.operation, wgpu::BlendOperation::Add);
    }
}
