//! Square texel grids and particle reference coordinates
//!
//! A [`Field`] stores one [`Texel`] per particle in row-major order. Particles
//! find their own texel through a [`ReferenceCoord`], the normalized grid index
//! they are given at startup and keep for their whole lifetime.

use glam::Vec2;
use rand::Rng;

use crate::Texel;

/// Radius of the disc that initial particle positions are drawn from
pub const INITIAL_RADIUS: f32 = 0.8;

/// An N×N grid of texels
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    size: usize,
    texels: Vec<Texel>,
}

impl Field {
    /// Create a field with every texel at rest
    pub fn new(size: usize) -> Self {
        Self {
            size,
            texels: vec![Texel::REST; size * size],
        }
    }

    /// Create a field from an existing row-major texel buffer
    ///
    /// Returns `None` if the buffer length is not `size * size`.
    pub fn from_texels(size: usize, texels: Vec<Texel>) -> Option<Self> {
        if texels.len() != size * size {
            return None;
        }
        Some(Self { size, texels })
    }

    /// Create a field of positions drawn uniformly from a disc around the origin
    pub fn random_disc<R: Rng + ?Sized>(size: usize, radius: f32, rng: &mut R) -> Self {
        let texels = (0..size * size)
            .map(|_| Texel::from_xy(random_in_unit_disc(rng) * radius))
            .collect();
        Self { size, texels }
    }

    /// Grid dimension N
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of texels (N²)
    #[inline]
    pub fn len(&self) -> usize {
        self.texels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.texels.is_empty()
    }

    /// Row-major index of grid cell (x, y)
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.size + x
    }

    /// Get the texel at grid cell (x, y)
    pub fn get(&self, x: usize, y: usize) -> Option<Texel> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.texels.get(self.index(x, y)).copied()
    }

    /// Nearest-texel lookup at a normalized coordinate
    ///
    /// Texel `i` covers `[i/N, (i+1)/N)` on each axis; coordinates outside
    /// [0, 1] clamp to the edge.
    pub fn sample(&self, uv: Vec2) -> Texel {
        if self.size == 0 {
            return Texel::REST;
        }
        let x = texel_index(uv.x, self.size);
        let y = texel_index(uv.y, self.size);
        self.texels[self.index(x, y)]
    }

    /// All texels in row-major order
    #[inline]
    pub fn as_slice(&self) -> &[Texel] {
        &self.texels
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [Texel] {
        &mut self.texels
    }

    /// Raw bytes for GPU upload (16 bytes per texel)
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Iterate over the 2D values of all texels
    pub fn values(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.texels.iter().map(Texel::xy)
    }
}

fn texel_index(coord: f32, size: usize) -> usize {
    let scaled = (coord * size as f32).floor();
    if scaled.is_nan() || scaled <= 0.0 {
        0
    } else {
        (scaled as usize).min(size - 1)
    }
}

fn random_in_unit_disc<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    loop {
        let candidate = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
        if candidate.length_squared() <= 1.0 {
            return candidate;
        }
    }
}

/// A particle's fixed lookup coordinate into the simulation fields
///
/// Particle (x, y) on an N×N grid has reference `(x/(N-1), y/(N-1))`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceCoord(Vec2);

impl ReferenceCoord {
    /// Reference coordinate of grid cell (x, y) on an N×N grid
    pub fn new(x: usize, y: usize, size: usize) -> Self {
        let denom = size.saturating_sub(1).max(1) as f32;
        Self(Vec2::new(x as f32 / denom, y as f32 / denom))
    }

    /// All N² reference coordinates, row-major
    pub fn grid(size: usize) -> impl Iterator<Item = ReferenceCoord> {
        (0..size).flat_map(move |y| (0..size).map(move |x| ReferenceCoord::new(x, y, size)))
    }

    #[inline]
    pub fn uv(&self) -> Vec2 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_new_field_is_at_rest() {
        let field = Field::new(4);
        assert_eq!(field.len(), 16);
        assert!(field.as_slice().iter().all(|t| *t == Texel::REST));
    }

    #[test]
    fn test_from_texels_rejects_wrong_length() {
        assert!(Field::from_texels(3, vec![Texel::REST; 8]).is_none());
        assert!(Field::from_texels(3, vec![Texel::REST; 9]).is_some());
    }

    #[test]
    fn test_random_disc_within_radius() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = Field::random_disc(32, INITIAL_RADIUS, &mut rng);
        for t in field.as_slice() {
            assert!(t.xy().length() <= INITIAL_RADIUS + 1e-6);
            assert_eq!(t.w(), 1.0);
        }
    }

    #[test]
    fn test_random_disc_is_seeded() {
        let a = Field::random_disc(8, 0.8, &mut StdRng::seed_from_u64(3));
        let b = Field::random_disc(8, 0.8, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let field = Field::new(2);
        assert!(field.get(1, 1).is_some());
        assert!(field.get(2, 0).is_none());
    }

    #[test]
    fn test_sample_clamps_to_edges() {
        let mut field = Field::new(2);
        field.as_mut_slice()[0] = Texel::from_xy(Vec2::new(1.0, 0.0));
        field.as_mut_slice()[3] = Texel::from_xy(Vec2::new(0.0, 1.0));

        assert_eq!(field.sample(Vec2::new(-3.0, -3.0)).xy(), Vec2::new(1.0, 0.0));
        assert_eq!(field.sample(Vec2::new(5.0, 5.0)).xy(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_reference_coord_samples_own_texel() {
        // Every reference coord must land on exactly its own cell.
        let size = 160;
        let mut field = Field::new(size);
        for (i, t) in field.as_mut_slice().iter_mut().enumerate() {
            *t = Texel::from_xy(Vec2::new(i as f32, 0.0));
        }

        for (i, reference) in ReferenceCoord::grid(size).enumerate() {
            assert_eq!(field.sample(reference.uv()).xy().x, i as f32);
        }
    }

    #[test]
    fn test_reference_coord_corners() {
        assert_eq!(ReferenceCoord::new(0, 0, 160).uv(), Vec2::ZERO);
        assert_eq!(ReferenceCoord::new(159, 159, 160).uv(), Vec2::ONE);
        assert_eq!(ReferenceCoord::grid(5).count(), 25);
    }
}
