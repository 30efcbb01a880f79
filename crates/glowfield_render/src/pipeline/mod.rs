//! Compute and render pipelines for the particle field

pub mod types;
pub mod sim_pipeline;
pub mod sprite_pipeline;

// Re-export types
pub use types::{
    workgroup_count, SimUniforms, SpriteUniforms, MAX_ATTRACTORS, SPRITE_VERTEX_COUNT,
    WORKGROUP_SIZE,
};

// Re-export pipelines
pub use sim_pipeline::{check_grid_size, field_buffer_size, SimPipeline};
pub use sprite_pipeline::{reference_coords, SpritePipeline, ADDITIVE_BLENDING};
