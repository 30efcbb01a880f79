//! A single grid cell of a simulation field

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Four-component float cell, laid out like an RGBA32F texel
///
/// Only `x` and `y` carry data. `z` is always 0 and `w` is always 1; the
/// fields are private so no caller can break that.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Texel {
    x: f32,
    y: f32,
    z: f32,
    w: f32,
}

impl Texel {
    /// A texel at rest: (0, 0, 0, 1)
    pub const REST: Texel = Texel { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Create a texel carrying a 2D value
    #[inline]
    pub fn from_xy(v: Vec2) -> Self {
        Self { x: v.x, y: v.y, z: 0.0, w: 1.0 }
    }

    /// The 2D value stored in this texel
    #[inline]
    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.z
    }

    #[inline]
    pub fn w(&self) -> f32 {
        self.w
    }
}

impl Default for Texel {
    fn default() -> Self {
        Self::REST
    }
}

impl From<Vec2> for Texel {
    fn from(v: Vec2) -> Self {
        Self::from_xy(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texel_size_matches_rgba32f() {
        assert_eq!(std::mem::size_of::<Texel>(), 16);
        assert_eq!(std::mem::align_of::<Texel>(), 4);
    }

    #[test]
    fn test_from_xy_sets_validity_channel() {
        let t = Texel::from_xy(Vec2::new(0.25, -0.5));
        assert_eq!(t.xy(), Vec2::new(0.25, -0.5));
        assert_eq!(t.z(), 0.0);
        assert_eq!(t.w(), 1.0);
    }

    #[test]
    fn test_default_is_rest() {
        assert_eq!(Texel::default(), Texel::REST);
        assert_eq!(Texel::REST.w(), 1.0);
    }

    #[test]
    fn test_bytes_layout() {
        let t = Texel::from_xy(Vec2::new(1.0, 2.0));
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&t));
        assert_eq!(floats, &[1.0, 2.0, 0.0, 1.0]);
    }
}
