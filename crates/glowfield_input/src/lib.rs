//! Pointer input for glowfield
//!
//! This crate maps raw cursor events onto the attractor coordinate space.

mod pointer;

pub use pointer::{to_ndc, PointerTracker};
