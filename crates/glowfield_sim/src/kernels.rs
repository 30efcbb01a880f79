//! Per-texel update rules
//!
//! Each frame runs the velocity kernel over every texel, then the position
//! kernel over every texel. Neither kernel reads a neighbouring texel.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Attractor;

/// Tuning constants for the two kernels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Distance softening; bounds the pull factor `1/(|d|+ε)` by `1/ε`
    pub softening: f32,
    /// Strength of the rotational bias around the origin
    pub swirl: f32,
    /// Per-frame velocity multiplier
    pub velocity_damping: f32,
    /// Per-frame position multiplier, pulling everything toward the origin
    pub position_decay: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            softening: 0.08,
            swirl: 0.00035,
            velocity_damping: 0.982,
            position_decay: 0.999,
        }
    }
}

/// Velocity contribution of one attractor on a particle at `p`
///
/// A particle sitting exactly on the attractor has no defined direction and
/// receives no pull.
#[inline]
pub fn attraction(p: Vec2, attractor: &Attractor, softening: f32) -> Vec2 {
    let d = attractor.position - p;
    d.normalize_or_zero() * (1.0 / (d.length() + softening)) * attractor.weight
}

/// Next velocity of a particle at `p` moving with `v`
pub fn velocity_kernel<'a, I>(p: Vec2, v: Vec2, attractors: I, params: &SimParams) -> Vec2
where
    I: IntoIterator<Item = &'a Attractor>,
{
    let mut v = v;
    for attractor in attractors {
        v += attraction(p, attractor, params.softening);
    }
    // (-p.y, p.x)
    v += p.perp() * params.swirl;
    v * params.velocity_damping
}

/// Next position of a particle at `p` moving with the already-updated `v`
#[inline]
pub fn position_kernel(p: Vec2, v: Vec2, params: &SimParams) -> Vec2 {
    (p + v) * params.position_decay
}
