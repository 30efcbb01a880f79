//! Attractor registry
//!
//! Attractors are 2D points that pull every particle's velocity toward them.
//! The registry is an open mapping from generational keys to attractors, so
//! peers can be added and removed at runtime; the three default entries
//! (`pointer`, `remote_a`, `remote_b`) are just the initial contents.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Key to an attractor in the registry
    ///
    /// Uses generational indexing so a key to a removed attractor never
    /// resolves to a newer one that reused its slot.
    pub struct AttractorKey;
}

/// Label of the live pointer attractor
pub const POINTER_LABEL: &str = "pointer";
/// Label of the first remote attractor
pub const REMOTE_A_LABEL: &str = "remote_a";
/// Label of the second remote attractor
pub const REMOTE_B_LABEL: &str = "remote_b";

/// Pull strength of the pointer attractor
pub const POINTER_WEIGHT: f32 = 0.0045;
/// Pull strength of the first remote attractor
pub const REMOTE_A_WEIGHT: f32 = 0.0040;
/// Pull strength of the second remote attractor
pub const REMOTE_B_WEIGHT: f32 = 0.0065;

/// A point exerting a distance-weighted pull on every particle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attractor {
    /// Human-readable identifier
    pub label: String,
    /// Position in normalized device coordinates
    pub position: Vec2,
    /// Pull strength
    pub weight: f32,
}

impl Attractor {
    pub fn new(label: impl Into<String>, position: Vec2, weight: f32) -> Self {
        Self {
            label: label.into(),
            position,
            weight,
        }
    }
}

/// Keys of the attractors registered by [`Attractors::with_defaults`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefaultAttractors {
    pub pointer: AttractorKey,
    pub remote_a: AttractorKey,
    pub remote_b: AttractorKey,
}

/// Registry of all attractors acting on the field
#[derive(Clone, Debug, Default)]
pub struct Attractors {
    entries: SlotMap<AttractorKey, Attractor>,
    dirty: bool,
}

impl Attractors {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            dirty: true,
        }
    }

    /// Create a registry with the pointer and the two remote attractors
    ///
    /// The remote attractors sit at (0, 0) and (5, 5) until something moves them.
    pub fn with_defaults() -> (Self, DefaultAttractors) {
        let mut attractors = Self::new();
        let pointer = attractors.insert(Attractor::new(POINTER_LABEL, Vec2::ZERO, POINTER_WEIGHT));
        let remote_a =
            attractors.insert(Attractor::new(REMOTE_A_LABEL, Vec2::ZERO, REMOTE_A_WEIGHT));
        let remote_b = attractors.insert(Attractor::new(
            REMOTE_B_LABEL,
            Vec2::new(5.0, 5.0),
            REMOTE_B_WEIGHT,
        ));
        (
            attractors,
            DefaultAttractors {
                pointer,
                remote_a,
                remote_b,
            },
        )
    }

    /// Add an attractor and return its key
    pub fn insert(&mut self, attractor: Attractor) -> AttractorKey {
        self.dirty = true;
        self.entries.insert(attractor)
    }

    /// Remove an attractor and return it
    pub fn remove(&mut self, key: AttractorKey) -> Option<Attractor> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn get(&self, key: AttractorKey) -> Option<&Attractor> {
        self.entries.get(key)
    }

    /// Move an attractor. Returns false if the key is stale.
    pub fn set_position(&mut self, key: AttractorKey, position: Vec2) -> bool {
        match self.entries.get_mut(key) {
            Some(attractor) => {
                if attractor.position != position {
                    attractor.position = position;
                    self.dirty = true;
                }
                true
            }
            None => false,
        }
    }

    /// Change an attractor's pull strength. Returns false if the key is stale.
    pub fn set_weight(&mut self, key: AttractorKey, weight: f32) -> bool {
        match self.entries.get_mut(key) {
            Some(attractor) => {
                attractor.weight = weight;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Find the first attractor with the given label
    pub fn find(&self, label: &str) -> Option<AttractorKey> {
        self.entries
            .iter()
            .find(|(_, a)| a.label == label)
            .map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all attractors with their keys
    pub fn iter(&self) -> impl Iterator<Item = (AttractorKey, &Attractor)> {
        self.entries.iter()
    }

    /// Iterate over all attractors
    pub fn values(&self) -> impl Iterator<Item = &Attractor> {
        self.entries.values()
    }

    /// Report and clear whether the registry changed since the last call
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}
