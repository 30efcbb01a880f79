//! GPU-compatible data types for the simulation and sprite pipelines
//!
//! These types are designed to match the shader layouts exactly.
//! All types derive Pod and Zeroable for safe GPU buffer operations.

use bytemuck::{Pod, Zeroable};
use glowfield_sim::{Attractor, SimParams, SpriteStyle};

/// Maximum number of attractors the simulation shader reads
pub const MAX_ATTRACTORS: usize = 8;

/// Threads per workgroup in the simulation shader (must match simulate.wgsl)
pub const WORKGROUP_SIZE: u32 = 64;

/// Vertices per sprite quad (triangle strip)
pub const SPRITE_VERTEX_COUNT: u32 = 4;

/// Uniforms for both simulation kernels
/// Layout: 160 bytes total (must match simulate.wgsl SimUniforms)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SimUniforms {
    pub softening: f32,
    pub swirl: f32,
    pub velocity_damping: f32,
    pub position_decay: f32,
    /// Grid dimension N
    pub grid_size: u32,
    /// Number of valid entries in `attractors`
    pub attractor_count: u32,
    pub _padding: [u32; 2],
    /// Attractors as (x, y, weight, 0)
    pub attractors: [[f32; 4]; MAX_ATTRACTORS],
}

impl SimUniforms {
    /// Pack kernel parameters and attractors for upload
    ///
    /// Attractors beyond [`MAX_ATTRACTORS`] are dropped with a warning.
    pub fn new<'a, I>(params: &SimParams, grid_size: u32, attractors: I) -> Self
    where
        I: IntoIterator<Item = &'a Attractor>,
    {
        let mut packed = [[0.0; 4]; MAX_ATTRACTORS];
        let mut count = 0;
        let mut dropped = 0;
        for attractor in attractors {
            if count < MAX_ATTRACTORS {
                packed[count] = [attractor.position.x, attractor.position.y, attractor.weight, 0.0];
                count += 1;
            } else {
                dropped += 1;
            }
        }
        if dropped > 0 {
            log::warn!(
                "GPU simulation supports {} attractors, ignoring {}",
                MAX_ATTRACTORS,
                dropped
            );
        }

        Self {
            softening: params.softening,
            swirl: params.swirl,
            velocity_damping: params.velocity_damping,
            position_decay: params.position_decay,
            grid_size,
            attractor_count: count as u32,
            _padding: [0; 2],
            attractors: packed,
        }
    }
}

impl Default for SimUniforms {
    fn default() -> Self {
        Self::new(&SimParams::default(), 0, std::iter::empty::<&Attractor>())
    }
}

/// Uniforms for the sprite render pass
/// Layout: 64 bytes total (must match sprite.wgsl SpriteUniforms)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteUniforms {
    /// Base color (rgb) + padding
    pub color: [f32; 4],
    /// Surface size in physical pixels
    pub viewport: [f32; 2],
    /// Sprite edge length in physical pixels
    pub point_size: f32,
    /// Grid dimension N (for reference coordinate lookup)
    pub grid_size: u32,
    pub core_falloff: f32,
    pub glow_falloff: f32,
    pub core_weight: f32,
    pub glow_weight: f32,
    pub brightness: f32,
    pub fade_slope: f32,
    pub _padding: [f32; 2],
}

impl SpriteUniforms {
    pub fn new(style: &SpriteStyle, color: [f32; 3], viewport: (u32, u32), grid_size: u32) -> Self {
        Self {
            color: [color[0], color[1], color[2], 1.0],
            viewport: [viewport.0.max(1) as f32, viewport.1.max(1) as f32],
            point_size: style.point_size,
            grid_size,
            core_falloff: style.core_falloff,
            glow_falloff: style.glow_falloff,
            core_weight: style.core_weight,
            glow_weight: style.glow_weight,
            brightness: style.brightness,
            fade_slope: style.fade_slope,
            _padding: [0.0; 2],
        }
    }
}

impl Default for SpriteUniforms {
    fn default() -> Self {
        Self::new(&SpriteStyle::default(), [1.0, 1.0, 1.0], (1, 1), 0)
    }
}

/// Number of workgroups needed to cover `texel_count` texels
pub fn workgroup_count(texel_count: u32) -> u32 {
    texel_count.div_ceil(WORKGROUP_SIZE)
}
