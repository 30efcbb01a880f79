//! Cursor tracking in normalized device coordinates
//!
//! Window pixels have the origin at the top-left with Y down. The simulation
//! works in [-1, 1]² with the origin at the center and Y up.

use glam::Vec2;
use winit::dpi::{PhysicalPosition, PhysicalSize};

/// Map a window-pixel position to normalized device coordinates
///
/// A zero-sized surface maps everything to the origin.
pub fn to_ndc(position: PhysicalPosition<f64>, size: PhysicalSize<u32>) -> Vec2 {
    if size.width == 0 || size.height == 0 {
        return Vec2::ZERO;
    }
    let x = (position.x / size.width as f64) * 2.0 - 1.0;
    let y = -((position.y / size.height as f64) * 2.0 - 1.0);
    Vec2::new(x as f32, y as f32)
}

/// Tracks the latest pointer position
///
/// Holds the last raw cursor position so the NDC value can be recomputed when
/// the window is resized without the cursor moving.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    last_position: Option<PhysicalPosition<f64>>,
    size: PhysicalSize<u32>,
    ndc: Vec2,
    changed: bool,
}

impl PointerTracker {
    /// Create a tracker for a surface of the given size
    pub fn new(size: PhysicalSize<u32>) -> Self {
        Self {
            last_position: None,
            size,
            ndc: Vec2::ZERO,
            changed: false,
        }
    }

    /// Process a cursor move event
    pub fn process_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.last_position = Some(position);
        self.update();
    }

    /// Process a window resize
    pub fn process_resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        if self.last_position.is_some() {
            self.update();
        }
    }

    fn update(&mut self) {
        if let Some(position) = self.last_position {
            let ndc = to_ndc(position, self.size);
            if ndc != self.ndc {
                self.ndc = ndc;
                self.changed = true;
            }
        }
    }

    /// Current pointer position in NDC (origin until the cursor first moves)
    pub fn ndc(&self) -> Vec2 {
        self.ndc
    }

    /// Return the position if it changed since the last call
    pub fn take_changed(&mut self) -> Option<Vec2> {
        if std::mem::replace(&mut self.changed, false) {
            Some(self.ndc)
        } else {
            None
        }
    }
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new(PhysicalSize::new(0, 0))
    }
}
