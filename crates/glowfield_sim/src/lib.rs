//! Particle field simulation for glowfield
//!
//! This crate provides the CPU side of the particle effect:
//! - Texel grids holding per-particle position and velocity
//! - An open registry of attractors pulling on every particle
//! - The velocity and position kernels evaluated once per texel per frame
//! - Ping-pong stepping of the two fields
//! - Sprite shaping math shared with the GPU draw shader

pub mod attractor;
pub mod field;
pub mod kernels;
pub mod simulator;
pub mod sprite;
mod texel;

// Re-export commonly used types
pub use attractor::{Attractor, AttractorKey, Attractors, DefaultAttractors};
pub use field::{Field, ReferenceCoord, INITIAL_RADIUS};
pub use kernels::{attraction, position_kernel, velocity_kernel, SimParams};
pub use simulator::{FieldStats, ParticleField, SimError, SyncFlags, DEFAULT_GRID_SIZE};
pub use sprite::{Sprite, SpriteStyle};
pub use texel::Texel;

pub use glam::Vec2;
