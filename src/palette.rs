//! Persisted color toggle
//!
//! Every launch flips a stored `"0"`/`"1"` flag and picks the sprite base
//! color from the new value, so consecutive runs alternate between green and
//! red.

use crate::store::{KeyValueStore, StoreError};

/// Store key holding the toggle flag
pub const TOGGLE_KEY: &str = "ghvst-toggle";

/// Base color for flag `"0"`
pub const GREEN: [f32; 3] = [0.15, 1.0, 0.5];
/// Base color for flag `"1"`
pub const RED: [f32; 3] = [1.0, 0.08, 0.08];

/// Sprite base color choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Palette {
    Green,
    Red,
}

impl Palette {
    /// Linear RGB base color
    pub fn base_color(self) -> [f32; 3] {
        match self {
            Palette::Green => GREEN,
            Palette::Red => RED,
        }
    }
}

/// Two-state flag alternated on every launch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorToggle {
    key: String,
    set: bool,
}

impl ColorToggle {
    /// Read the stored flag and flip it
    ///
    /// An absent key reads as `"0"`, so the first launch yields `"1"`.
    /// Anything other than `"0"` or `"1"` is treated as `"0"`.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Result<Self, StoreError> {
        let stored = match store.get(key)?.as_deref() {
            None | Some("0") => false,
            Some("1") => true,
            Some(other) => {
                log::warn!("Ignoring malformed {} value {:?}, treating as \"0\"", key, other);
                false
            }
        };
        Ok(Self {
            key: key.to_string(),
            set: !stored,
        })
    }

    /// Toggle state for when the store is unreachable: as if nothing was stored
    pub fn fallback(key: &str) -> Self {
        Self {
            key: key.to_string(),
            set: true,
        }
    }

    /// Write the current flag back
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        store.set(&self.key, self.flag())
    }

    /// Stored representation of the current state
    pub fn flag(&self) -> &'static str {
        if self.set {
            "1"
        } else {
            "0"
        }
    }

    pub fn palette(&self) -> Palette {
        if self.set {
            Palette::Red
        } else {
            Palette::Green
        }
    }
}

/// Load, flip and persist the toggle in one go
///
/// Store failures are logged and the launch continues with the flipped state
/// (or the fallback when nothing could be read).
pub fn advance_toggle<S: KeyValueStore + ?Sized>(store: &mut S, key: &str) -> ColorToggle {
    let toggle = ColorToggle::load(store, key).unwrap_or_else(|e| {
        log::warn!("Failed to read {}: {}. Using default palette.", key, e);
        ColorToggle::fallback(key)
    });
    if let Err(e) = toggle.save(store) {
        log::warn!("Failed to persist {}: {}", key, e);
    }
    toggle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_absent_key_flips_to_one() {
        let store = MemoryStore::new();
        let toggle = ColorToggle::load(&store, TOGGLE_KEY).unwrap();
        assert_eq!(toggle.flag(), "1");
        assert_eq!(toggle.palette(), Palette::Red);
    }

    #[test]
    fn test_stored_one_flips_to_zero() {
        let mut store = MemoryStore::new();
        store.set(TOGGLE_KEY, "1").unwrap();
        let toggle = ColorToggle::load(&store, TOGGLE_KEY).unwrap();
        assert_eq!(toggle.flag(), "0");
        assert_eq!(toggle.palette(), Palette::Green);
    }

    #[test]
    fn test_malformed_value_treated_as_zero() {
        let mut store = MemoryStore::new();
        store.set(TOGGLE_KEY, "banana").unwrap();
        let toggle = ColorToggle::load(&store, TOGGLE_KEY).unwrap();
        assert_eq!(toggle.flag(), "1");
    }

    #[test]
    fn test_consecutive_launches_alternate() {
        let mut store = MemoryStore::new();
        let palettes: Vec<Palette> = (0..4)
            .map(|_| advance_toggle(&mut store, TOGGLE_KEY).palette())
            .collect();
        assert_eq!(
            palettes,
            [Palette::Red, Palette::Green, Palette::Red, Palette::Green]
        );
        assert_eq!(store.get(TOGGLE_KEY).unwrap(), Some("0".to_string()));
    }

    #[test]
    fn test_save_writes_flag() {
        let mut store = MemoryStore::new();
        let toggle = ColorToggle::load(&store, "custom").unwrap();
        toggle.save(&mut store).unwrap();
        assert_eq!(store.get("custom").unwrap(), Some("1".to_string()));
    }

    #[test]
    fn test_palette_colors() {
        assert_eq!(Palette::Green.base_color(), [0.15, 1.0, 0.5]);
        assert_eq!(Palette::Red.base_color(), [1.0, 0.08, 0.08]);
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Parse("broken".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Serialize("broken".to_string()))
        }
    }

    #[test]
    fn test_broken_store_falls_back() {
        let toggle = advance_toggle(&mut BrokenStore, TOGGLE_KEY);
        assert_eq!(toggle, ColorToggle::fallback(TOGGLE_KEY));
        assert_eq!(toggle.palette(), Palette::Red);
    }
}
