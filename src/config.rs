//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`GLOW_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use glowfield_sim::{
    attractor::{
        POINTER_LABEL, POINTER_WEIGHT, REMOTE_A_LABEL, REMOTE_A_WEIGHT, REMOTE_B_LABEL,
        REMOTE_B_WEIGHT,
    },
    SimParams, SpriteStyle, DEFAULT_GRID_SIZE,
};
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Simulation configuration
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Sprite appearance
    #[serde(default)]
    pub sprite: SpriteStyle,
    /// Rendering configuration
    #[serde(default)]
    pub rendering: RenderingConfig,
    /// Persisted state configuration
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`GLOW_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // GLOW_WINDOW__TITLE=Test -> window.title = "Test"
        figment = figment.merge(Env::prefixed("GLOW_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Start in fullscreen mode
    pub fullscreen: bool,
    /// Enable VSync
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Glowfield".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
        }
    }
}

/// Where the per-frame kernels run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Compute shaders over GPU ping-pong buffers
    #[default]
    Gpu,
    /// Rayon over CPU ping-pong buffers, positions uploaded each frame
    Cpu,
}

/// One attractor entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttractorConfig {
    /// Identifier; the entry labelled `pointer` follows the cursor
    pub label: String,
    /// Starting position in normalized device coordinates
    pub position: [f32; 2],
    /// Pull strength
    pub weight: f32,
}

/// Simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid dimension N (N² particles)
    pub grid_size: usize,
    /// RNG seed for the initial positions (random if unset)
    pub seed: Option<u64>,
    /// Where the kernels run
    pub backend: Backend,
    /// Kernel constants
    pub params: SimParams,
    /// Initial attractors
    pub attractors: Vec<AttractorConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            seed: None,
            backend: Backend::Gpu,
            params: SimParams::default(),
            attractors: vec![
                AttractorConfig {
                    label: POINTER_LABEL.to_string(),
                    position: [0.0, 0.0],
                    weight: POINTER_WEIGHT,
                },
                AttractorConfig {
                    label: REMOTE_A_LABEL.to_string(),
                    position: [0.0, 0.0],
                    weight: REMOTE_A_WEIGHT,
                },
                AttractorConfig {
                    label: REMOTE_B_LABEL.to_string(),
                    position: [5.0, 5.0],
                    weight: REMOTE_B_WEIGHT,
                },
            ],
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Background color [r, g, b, a]
    pub background_color: [f32; 4],
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            background_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Persisted state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// File holding persisted key-value state
    pub path: PathBuf,
    /// Key of the color toggle
    pub key: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("state/glowfield.toml"),
            key: crate::palette::TOGGLE_KEY.to_string(),
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace), overridden by RUST_LOG
    pub log_level: String,
    /// Frames between field statistics log lines (0 disables)
    pub stats_interval: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            stats_interval: 600,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
