//! Glowfield - a GPU particle field that follows the pointer
//!
//! A grid of particles is pulled toward a set of attractors, one of which
//! tracks the cursor, and drawn as additive glowing sprites.
//!
//! ## Modules
//!
//! - [`config`] - Layered TOML/environment configuration
//! - [`store`] / [`palette`] - Persisted color toggle
//! - [`input`] - Keyboard action mapping
//! - [`systems`] - Window, simulation and render systems driven by `main`

pub mod config;
pub mod input;
pub mod palette;
pub mod store;
pub mod systems;
