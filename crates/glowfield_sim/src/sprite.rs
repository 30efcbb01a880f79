//! Point sprite shaping
//!
//! The draw shader evaluates these same formulas per fragment. They live here
//! so the look of a sprite can be reasoned about and tested without a GPU.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ReferenceCoord;

/// Shape and brightness of a particle sprite
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteStyle {
    /// Sprite edge length in physical pixels
    pub point_size: f32,
    /// Exponent scale of the tight core term
    pub core_falloff: f32,
    /// Exponent scale of the wide glow term
    pub glow_falloff: f32,
    pub core_weight: f32,
    pub glow_weight: f32,
    /// Base multiplier on the sprite color before the glow boost
    pub brightness: f32,
    /// How quickly particles fade with distance from the origin
    pub fade_slope: f32,
}

impl Default for SpriteStyle {
    fn default() -> Self {
        Self {
            point_size: 10.0,
            core_falloff: 18.0,
            glow_falloff: 3.0,
            core_weight: 0.9,
            glow_weight: 0.35,
            brightness: 1.25,
            fade_slope: 0.4,
        }
    }
}

impl SpriteStyle {
    /// Opacity multiplier for a particle at position `p`
    ///
    /// Not clamped: far particles go to zero or below and vanish under
    /// additive blending.
    #[inline]
    pub fn fade(&self, p: Vec2) -> f32 {
        1.0 - p.length() * self.fade_slope
    }

    /// Core and glow terms at distance `d` from the sprite center
    ///
    /// `d` is measured in sprite-local units where the sprite spans [-0.5, 0.5].
    #[inline]
    pub fn falloff(&self, d: f32) -> (f32, f32) {
        let d2 = d * d;
        ((-d2 * self.core_falloff).exp(), (-d2 * self.glow_falloff).exp())
    }

    /// Fragment alpha before the per-particle fade
    pub fn alpha(&self, d: f32) -> f32 {
        let (core, glow) = self.falloff(d);
        core * self.core_weight + glow * self.glow_weight
    }

    /// Final fragment color `[r, g, b, a]` for a base color, distance and fade
    pub fn shade(&self, base: [f32; 3], d: f32, fade: f32) -> [f32; 4] {
        let (_, glow) = self.falloff(d);
        let gain = self.brightness + glow;
        [
            base[0] * gain,
            base[1] * gain,
            base[2] * gain,
            self.alpha(d) * fade,
        ]
    }
}

/// One particle as seen by the draw step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    /// Where the particle looks up its state
    pub reference: ReferenceCoord,
    /// Current simulated position
    pub position: Vec2,
    /// Opacity multiplier from [`SpriteStyle::fade`]
    pub fade: f32,
}
