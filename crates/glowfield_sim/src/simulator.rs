//! The particle field simulator
//!
//! Owns double-buffered velocity and position fields and advances them one
//! frame at a time. Every frame:
//! 1. Velocity pass: previous V and previous P -> next V
//! 2. Position pass: next V and previous P -> next P
//! 3. Swap front and back buffers of both fields
//!
//! No pass reads the buffer it writes, so the per-texel work runs in parallel.

use bitflags::bitflags;
use glam::Vec2;
use rand::Rng;
use rayon::prelude::*;

use crate::attractor::Attractors;
use crate::field::{Field, ReferenceCoord, INITIAL_RADIUS};
use crate::kernels::{position_kernel, velocity_kernel, SimParams};
use crate::sprite::{Sprite, SpriteStyle};
use crate::Texel;

/// Grid dimension used when nothing else is configured (160² particles)
pub const DEFAULT_GRID_SIZE: usize = 160;

bitflags! {
    /// Parts of the simulator state that changed since the last sync
    ///
    /// A GPU mirror of the simulation uses these to re-upload only what moved.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct SyncFlags: u8 {
        const NONE = 0;
        /// Fields were replaced (initial state or reseed)
        const FIELD = 1 << 0;
        /// An attractor was added, removed or moved
        const ATTRACTORS = 1 << 1;
        /// Kernel parameters changed
        const PARAMS = 1 << 2;
        const ALL = Self::FIELD.bits() | Self::ATTRACTORS.bits() | Self::PARAMS.bits();
    }
}

/// Simulator construction errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// Grid must be at least 2×2 so reference coordinates are well defined
    InvalidGridSize(usize),
    /// Position and velocity fields must have the same dimension
    SizeMismatch { position: usize, velocity: usize },
}

impl std::fmt::Display for SimError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimError::InvalidGridSize(size) => {
                write!(f, "Invalid grid size {}: must be at least 2", size)
            }
            SimError::SizeMismatch { position, velocity } => write!(
                f,
                "Field size mismatch: position is {}x{0}, velocity is {}x{1}",
                position, velocity
            ),
        }
    }
}

impl std::error::Error for SimError {}

/// Front/back pair of a field
#[derive(Clone, Debug)]
struct PingPong {
    front: Field,
    back: Field,
}

impl PingPong {
    fn new(front: Field) -> Self {
        let back = Field::new(front.size());
        Self { front, back }
    }

    fn swap(&mut self) {
        std::mem::swap(&mut self.front, &mut self.back);
    }
}

/// Summary statistics of the current position field
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldStats {
    /// Mean particle position
    pub mean: Vec2,
    /// Largest distance of any particle from the origin
    pub max_radius: f32,
    /// Mean particle speed (units per frame)
    pub mean_speed: f32,
    /// Whether every position and velocity is finite
    pub finite: bool,
}

/// GPU-free particle field simulation
pub struct ParticleField {
    size: usize,
    velocity: PingPong,
    position: PingPong,
    attractors: Attractors,
    params: SimParams,
    frame: u64,
    sync: SyncFlags,
}

impl ParticleField {
    /// Create a field with random positions in the initial disc and zero velocity
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        params: SimParams,
        attractors: Attractors,
        rng: &mut R,
    ) -> Result<Self, SimError> {
        if size < 2 {
            return Err(SimError::InvalidGridSize(size));
        }
        let position = Field::random_disc(size, INITIAL_RADIUS, rng);
        Self::from_fields(position, Field::new(size), params, attractors)
    }

    /// Create a field from explicit initial position and velocity fields
    pub fn from_fields(
        position: Field,
        velocity: Field,
        params: SimParams,
        attractors: Attractors,
    ) -> Result<Self, SimError> {
        if position.size() < 2 {
            return Err(SimError::InvalidGridSize(position.size()));
        }
        if position.size() != velocity.size() {
            return Err(SimError::SizeMismatch {
                position: position.size(),
                velocity: velocity.size(),
            });
        }
        Ok(Self {
            size: position.size(),
            velocity: PingPong::new(velocity),
            position: PingPong::new(position),
            attractors,
            params,
            frame: 0,
            sync: SyncFlags::ALL,
        })
    }

    /// Grid dimension N
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of particles (N²)
    #[inline]
    pub fn particle_count(&self) -> usize {
        self.size * self.size
    }

    /// Frames stepped since creation or the last reseed
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn set_params(&mut self, params: SimParams) {
        if self.params != params {
            self.params = params;
            self.sync |= SyncFlags::PARAMS;
        }
    }

    pub fn attractors(&self) -> &Attractors {
        &self.attractors
    }

    pub fn attractors_mut(&mut self) -> &mut Attractors {
        &mut self.attractors
    }

    /// Current position field
    pub fn positions(&self) -> &Field {
        &self.position.front
    }

    /// Current velocity field
    pub fn velocities(&self) -> &Field {
        &self.velocity.front
    }

    /// Advance the simulation by one frame
    pub fn step(&mut self) {
        let params = self.params;
        let attractors: Vec<_> = self.attractors.values().collect();

        // 1. Velocity pass
        let prev_position = self.position.front.as_slice();
        let prev_velocity = self.velocity.front.as_slice();
        self.velocity
            .back
            .as_mut_slice()
            .par_iter_mut()
            .zip(prev_position.par_iter().zip(prev_velocity.par_iter()))
            .for_each(|(out, (p, v))| {
                let v = velocity_kernel(p.xy(), v.xy(), attractors.iter().copied(), &params);
                *out = Texel::from_xy(v);
            });

        // 2. Position pass, reading the velocity written above
        let next_velocity = self.velocity.back.as_slice();
        self.position
            .back
            .as_mut_slice()
            .par_iter_mut()
            .zip(prev_position.par_iter().zip(next_velocity.par_iter()))
            .for_each(|(out, (p, v))| {
                *out = Texel::from_xy(position_kernel(p.xy(), v.xy(), &params));
            });

        // 3. Publish both fields at once
        self.velocity.swap();
        self.position.swap();
        self.frame += 1;
    }

    /// Advance the simulation by several frames
    pub fn run(&mut self, frames: u64) {
        for _ in 0..frames {
            self.step();
        }
    }

    /// Replace the fields with a fresh random initialization
    pub fn reseed<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.position = PingPong::new(Field::random_disc(self.size, INITIAL_RADIUS, rng));
        self.velocity = PingPong::new(Field::new(self.size));
        self.frame = 0;
        self.sync |= SyncFlags::FIELD;
        log::info!("Reseeded {} particles", self.particle_count());
    }

    /// Draw-step view: each particle's position, looked up through its reference coordinate
    pub fn sprites<'a>(&'a self, style: &'a SpriteStyle) -> impl Iterator<Item = Sprite> + 'a {
        ReferenceCoord::grid(self.size).map(move |reference| {
            let position = self.position.front.sample(reference.uv()).xy();
            Sprite {
                reference,
                position,
                fade: style.fade(position),
            }
        })
    }

    /// Compute summary statistics of the current state
    pub fn stats(&self) -> FieldStats {
        let count = self.particle_count().max(1) as f32;
        let positions = self.position.front.as_slice();
        let velocities = self.velocity.front.as_slice();

        let (sum, max_radius) = positions
            .par_iter()
            .map(|t| (t.xy(), t.xy().length()))
            .reduce(|| (Vec2::ZERO, 0.0f32), |a, b| (a.0 + b.0, a.1.max(b.1)));
        let speed_sum: f32 = velocities.par_iter().map(|t| t.xy().length()).sum();
        let finite = positions
            .par_iter()
            .chain(velocities.par_iter())
            .all(|t| t.xy().is_finite());

        FieldStats {
            mean: sum / count,
            max_radius,
            mean_speed: speed_sum / count,
            finite,
        }
    }

    /// Report and clear everything that changed since the last call
    pub fn take_sync_flags(&mut self) -> SyncFlags {
        let mut flags = std::mem::take(&mut self.sync);
        if self.attractors.take_dirty() {
            flags |= SyncFlags::ATTRACTORS;
        }
        flags
    }
}
