//! Input handling module
//!
//! Maps raw keyboard events to semantic actions. Pointer tracking lives in
//! `glowfield_input`.

mod input_mapper;

pub use input_mapper::{InputMapper, InputAction};
