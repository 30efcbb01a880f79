//! Particle simulation system
//!
//! Owns the CPU-side particle field and the attractor registry, and decides
//! per frame whether the field advances on the CPU or is left to the GPU
//! compute pipeline.

use glam::Vec2;
use glowfield_sim::{
    attractor::{POINTER_LABEL, POINTER_WEIGHT},
    Attractor, AttractorKey, Attractors, ParticleField, SimError,
};
use rand::{rngs::StdRng, SeedableRng};

use crate::config::{AttractorConfig, Backend, SimulationConfig};

/// Result of a simulation update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationResult {
    /// Whether this frame advances the field (false while paused)
    pub advanced: bool,
}

/// Manages the particle field and its attractors
pub struct SimulationSystem {
    field: ParticleField,
    backend: Backend,
    pointer: AttractorKey,
    rng: StdRng,
    paused: bool,
    /// Frames advanced on either backend
    frames: u64,
    stats_interval: u64,
}

impl SimulationSystem {
    /// Create the simulation from config
    ///
    /// # Arguments
    /// * `config` - Grid size, seed, backend, kernel params and attractors
    /// * `stats_interval` - Frames between statistics log lines (0 disables)
    pub fn new(config: &SimulationConfig, stats_interval: u64) -> Result<Self, SimError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (attractors, pointer) = build_attractors(&config.attractors);
        let field = ParticleField::new(config.grid_size, config.params, attractors, &mut rng)?;

        log::info!(
            "Simulating {} particles ({}x{}) on the {:?} backend with {} attractors",
            field.particle_count(),
            field.size(),
            field.size(),
            config.backend,
            field.attractors().len()
        );

        Ok(Self {
            field,
            backend: config.backend,
            pointer,
            rng,
            paused: false,
            frames: 0,
            stats_interval,
        })
    }

    /// Move the pointer attractor (NDC)
    pub fn set_pointer(&mut self, position: Vec2) {
        self.field.attractors_mut().set_position(self.pointer, position);
    }

    /// Current pointer attractor position
    pub fn pointer(&self) -> Option<Vec2> {
        self.field.attractors().get(self.pointer).map(|a| a.position)
    }

    /// Freeze or resume
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::info!("Simulation {}", if self.paused { "paused" } else { "resumed" });
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Scatter the particles back into the starting disc
    pub fn reseed(&mut self) {
        self.field.reseed(&mut self.rng);
    }

    /// Run one simulation frame
    ///
    /// On the CPU backend this steps the field. On the GPU backend the render
    /// system dispatches the kernels when `advanced` is set.
    pub fn update(&mut self) -> SimulationResult {
        if self.paused {
            return SimulationResult { advanced: false };
        }

        if self.backend == Backend::Cpu {
            self.field.step();
        }
        self.frames += 1;

        if self.stats_interval > 0 && self.frames % self.stats_interval == 0 {
            self.log_stats();
        }

        SimulationResult { advanced: true }
    }

    fn log_stats(&self) {
        match self.backend {
            Backend::Cpu => {
                let stats = self.field.stats();
                log::debug!(
                    "frame {}: mean ({:.3}, {:.3}), max radius {:.3}, mean speed {:.5}, finite {}",
                    self.frames,
                    stats.mean.x,
                    stats.mean.y,
                    stats.max_radius,
                    stats.mean_speed,
                    stats.finite
                );
                if !stats.finite {
                    log::warn!("Non-finite values in the particle field at frame {}", self.frames);
                }
            }
            Backend::Gpu => log::debug!("frame {} dispatched on the GPU", self.frames),
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Frames advanced since startup
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut ParticleField {
        &mut self.field
    }
}

/// Build the attractor registry from config, returning the pointer's key
///
/// A pointer attractor is added at the origin when the config has none.
pub fn build_attractors(entries: &[AttractorConfig]) -> (Attractors, AttractorKey) {
    let mut attractors = Attractors::new();
    for entry in entries {
        attractors.insert(Attractor::new(
            entry.label.clone(),
            Vec2::from_array(entry.position),
            entry.weight,
        ));
    }
    let pointer = match attractors.find(POINTER_LABEL) {
        Some(key) => key,
        None => {
            log::warn!("No '{}' attractor configured, adding one", POINTER_LABEL);
            attractors.insert(Attractor::new(POINTER_LABEL, Vec2::ZERO, POINTER_WEIGHT))
        }
    };
    (attractors, pointer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glowfield_sim::SyncFlags;

    fn cpu_config() -> SimulationConfig {
        SimulationConfig {
            grid_size: 8,
            seed: Some(7),
            backend: Backend::Cpu,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_build_default_attractors() {
        let (attractors, pointer) = build_attractors(&SimulationConfig::default().attractors);
        assert_eq!(attractors.len(), 3);
        assert_eq!(attractors.get(pointer).unwrap().label, "pointer");
    }

    #[test]
    fn test_missing_pointer_is_added() {
        let entries = vec![AttractorConfig {
            label: "remote_a".to_string(),
            position: [0.0, 0.0],
            weight: 0.004,
        }];
        let (attractors, pointer) = build_attractors(&entries);
        assert_eq!(attractors.len(), 2);
        assert_eq!(attractors.get(pointer).unwrap().weight, POINTER_WEIGHT);
    }

    #[test]
    fn test_invalid_grid_size_rejected() {
        let config = SimulationConfig {
            grid_size: 1,
            ..cpu_config()
        };
        assert!(matches!(
            SimulationSystem::new(&config, 0),
            Err(SimError::InvalidGridSize(1))
        ));
    }

    #[test]
    fn test_cpu_update_steps_field() {
        let mut sim = SimulationSystem::new(&cpu_config(), 0).unwrap();
        assert!(sim.update().advanced);
        assert_eq!(sim.field().frame(), 1);
        assert_eq!(sim.frames(), 1);
    }

    #[test]
    fn test_gpu_update_leaves_cpu_field() {
        let config = SimulationConfig {
            backend: Backend::Gpu,
            ..cpu_config()
        };
        let mut sim = SimulationSystem::new(&config, 0).unwrap();
        assert!(sim.update().advanced);
        assert_eq!(sim.field().frame(), 0);
        assert_eq!(sim.frames(), 1);
    }

    #[test]
    fn test_paused_update_does_nothing() {
        let mut sim = SimulationSystem::new(&cpu_config(), 0).unwrap();
        assert!(!sim.is_paused());
        sim.toggle_pause();
        assert!(sim.is_paused());
        let before = sim.field().positions().clone();
        assert!(!sim.update().advanced);
        assert_eq!(sim.field().positions(), &before);
        sim.toggle_pause();
        assert!(!sim.is_paused());
    }

    #[test]
    fn test_set_pointer_marks_attractors() {
        let mut sim = SimulationSystem::new(&cpu_config(), 0).unwrap();
        sim.field_mut().take_sync_flags();

        sim.set_pointer(Vec2::new(0.25, -0.5));
        assert_eq!(sim.pointer(), Some(Vec2::new(0.25, -0.5)));
        assert!(sim.field_mut().take_sync_flags().contains(SyncFlags::ATTRACTORS));
    }

    #[test]
    fn test_reseed_marks_field() {
        let mut sim = SimulationSystem::new(&cpu_config(), 0).unwrap();
        sim.update();
        sim.field_mut().take_sync_flags();

        sim.reseed();
        assert_eq!(sim.field().frame(), 0);
        assert!(sim.field_mut().take_sync_flags().contains(SyncFlags::FIELD));
    }

    #[test]
    fn test_seed_is_deterministic() {
        let a = SimulationSystem::new(&cpu_config(), 0).unwrap();
        let b = SimulationSystem::new(&cpu_config(), 0).unwrap();
        assert_eq!(a.field().positions(), b.field().positions());
    }
}
