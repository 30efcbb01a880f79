//! Application systems
//!
//! Window, simulation and rendering concerns, kept out of main.rs so they can
//! be tested on their own.

pub mod render;
pub mod simulation;
pub mod window;

pub use render::{RenderError, RenderSystem};
pub use simulation::{SimulationResult, SimulationSystem};
pub use window::{WindowError, WindowSystem};
