//! Particle field rendering
//!
//! This crate provides the wgpu side of glowfield.
//!
//! ## Key Components
//!
//! - [`context::RenderContext`] - WGPU device, queue, and surface management
//! - [`pipeline::SimPipeline`] - Compute shaders running the field kernels over ping-pong buffers
//! - [`pipeline::SpritePipeline`] - Additive point-sprite rendering of the current positions

pub mod context;
pub mod pipeline;

pub use context::{ContextError, RenderContext};
