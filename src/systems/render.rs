//! GPU rendering system
//!
//! Manages GPU rendering including:
//! - Render context and surface
//! - Simulation compute and sprite pipelines
//! - Frame rendering

use std::sync::Arc;
use winit::window::Window;
use glowfield_render::{
    context::{ContextError, RenderContext},
    pipeline::{check_grid_size, SimPipeline, SimUniforms, SpritePipeline, SpriteUniforms},
};
use glowfield_sim::{SpriteStyle, SyncFlags};

use crate::config::{Backend, RenderingConfig};
use crate::systems::simulation::{SimulationResult, SimulationSystem};

/// Render error types
#[derive(Debug)]
pub enum RenderError {
    /// Surface was lost (window resized, minimized, etc.)
    SurfaceLost,
    /// GPU out of memory
    OutOfMemory,
    /// Other surface error
    Other(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::SurfaceLost => write!(f, "Surface lost"),
            RenderError::OutOfMemory => write!(f, "Out of memory"),
            RenderError::Other(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// Manages GPU rendering
pub struct RenderSystem {
    context: RenderContext,
    sim_pipeline: SimPipeline,
    sprite_pipeline: SpritePipeline,
    render_config: RenderingConfig,
    sprite_style: SpriteStyle,
    base_color: [f32; 3],
}

impl RenderSystem {
    /// Create render system from window and config
    ///
    /// Fails if no adapter, device or surface can be acquired, or if the
    /// grid does not fit the device limits.
    pub fn new(
        window: Arc<Window>,
        render_config: RenderingConfig,
        sprite_style: SpriteStyle,
        base_color: [f32; 3],
        grid_size: usize,
        vsync: bool,
    ) -> Result<Self, ContextError> {
        let context = pollster::block_on(RenderContext::new(window, vsync))?;
        let grid_size = check_grid_size(grid_size, &context.device.limits())?;

        let sim_pipeline = SimPipeline::new(&context.device, grid_size);
        let sprite_pipeline = SpritePipeline::new(
            &context.device,
            context.config.format,
            grid_size,
            sim_pipeline.position_buffers(),
        );

        log::info!(
            "Created pipelines for {} sprites ({:?})",
            sprite_pipeline.instance_count(),
            context.config.format
        );

        let system = Self {
            context,
            sim_pipeline,
            sprite_pipeline,
            render_config,
            sprite_style,
            base_color,
        };
        system.write_sprite_uniforms();
        Ok(system)
    }

    /// Handle window resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context
            .resize(winit::dpi::PhysicalSize::new(width, height));
        self.write_sprite_uniforms();
    }

    /// Reconfigure the surface at its current size
    pub fn reconfigure(&mut self) {
        let size = self.context.size;
        self.resize(size.width, size.height);
    }

    fn write_sprite_uniforms(&self) {
        let uniforms = SpriteUniforms::new(
            &self.sprite_style,
            self.base_color,
            (self.context.size.width, self.context.size.height),
            self.sim_pipeline.grid_size(),
        );
        self.sprite_pipeline
            .update_uniforms(&self.context.queue, &uniforms);
    }

    /// Push pending simulation changes to the GPU
    fn sync_simulation(&self, sim: &mut SimulationSystem, result: &SimulationResult) {
        let flags = sim.field_mut().take_sync_flags();
        let field = sim.field();

        if flags.intersects(SyncFlags::ATTRACTORS | SyncFlags::PARAMS) {
            let uniforms = SimUniforms::new(
                field.params(),
                self.sim_pipeline.grid_size(),
                field.attractors().values(),
            );
            self.sim_pipeline
                .update_uniforms(&self.context.queue, &uniforms);
        }

        match sim.backend() {
            Backend::Gpu => {
                if flags.contains(SyncFlags::FIELD) {
                    self.sim_pipeline.upload_fields(
                        &self.context.queue,
                        field.positions(),
                        field.velocities(),
                    );
                }
            }
            Backend::Cpu => {
                if result.advanced || flags.contains(SyncFlags::FIELD) {
                    self.sim_pipeline
                        .upload_positions(&self.context.queue, field.positions());
                }
            }
        }
    }

    /// Render a single frame
    ///
    /// On the GPU backend an advanced frame also records the simulation step
    /// ahead of the sprite pass.
    pub fn render_frame(
        &mut self,
        sim: &mut SimulationSystem,
        result: &SimulationResult,
    ) -> Result<(), RenderError> {
        // Queued writes land before the next submit, even if this frame bails out
        self.sync_simulation(sim, result);

        // Get surface texture
        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) => return Err(RenderError::SurfaceLost),
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Other(format!("{:?}", e))),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Create command encoder
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // Simulation compute passes
        if sim.backend() == Backend::Gpu && result.advanced {
            self.sim_pipeline.step(&mut encoder);
        }

        // Sprite pass
        let bg = &self.render_config.background_color;
        self.sprite_pipeline.render(
            &mut encoder,
            &view,
            self.sim_pipeline.current_slot(),
            wgpu::Color {
                r: bg[0] as f64,
                g: bg[1] as f64,
                b: bg[2] as f64,
                a: bg[3] as f64,
            },
        );

        // Submit
        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
