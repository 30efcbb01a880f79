//! Glowfield - GPU particle field
//!
//! Particles drift toward attractors (one follows the cursor) and are drawn
//! as additive glowing sprites. The base color alternates between launches.

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::WindowId,
};

use glowfield::{
    config::AppConfig,
    input::{InputAction, InputMapper},
    palette::{advance_toggle, Palette},
    store::FileStore,
    systems::{RenderError, RenderSystem, SimulationSystem, WindowSystem},
};
use glowfield_input::PointerTracker;

/// Main application state
struct App {
    /// Application configuration
    config: AppConfig,
    palette: Palette,
    window: Option<WindowSystem>,
    render: Option<RenderSystem>,
    simulation: SimulationSystem,
    pointer: PointerTracker,
    /// Set when the window or GPU could not be brought up
    startup_error: Option<String>,
}

impl App {
    fn new(config: AppConfig) -> Result<Self, glowfield_sim::SimError> {
        let mut store = FileStore::new(&config.persistence.path);
        let toggle = advance_toggle(&mut store, &config.persistence.key);
        let palette = toggle.palette();
        log::info!("Palette {:?} (toggle {})", palette, toggle.flag());

        let simulation = SimulationSystem::new(&config.simulation, config.debug.stats_interval)?;

        Ok(Self {
            config,
            palette,
            window: None,
            render: None,
            simulation,
            pointer: PointerTracker::default(),
            startup_error: None,
        })
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn std::error::Error>> {
        let window = WindowSystem::create(event_loop, &self.config.window)?;
        let render = RenderSystem::new(
            window.window().clone(),
            self.config.rendering.clone(),
            self.config.sprite,
            self.palette.base_color(),
            self.simulation.field().size(),
            self.config.window.vsync,
        )?;

        self.pointer.process_resize(window.inner_size());
        window.request_redraw();

        self.window = Some(window);
        self.render = Some(render);
        Ok(())
    }

    fn handle_action(&mut self, event_loop: &ActiveEventLoop, action: InputAction) {
        match action {
            InputAction::Exit => event_loop.exit(),
            InputAction::ToggleFullscreen => {
                if let Some(window) = &self.window {
                    window.toggle_fullscreen();
                }
            }
            InputAction::Reseed => self.simulation.reseed(),
            InputAction::TogglePause => {
                self.simulation.toggle_pause();
                if let Some(window) = &self.window {
                    window.update_title(self.simulation.is_paused());
                }
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(position) = self.pointer.take_changed() {
            self.simulation.set_pointer(position);
        }

        let result = self.simulation.update();

        if let Some(render) = &mut self.render {
            match render.render_frame(&mut self.simulation, &result) {
                Ok(()) => {}
                Err(RenderError::SurfaceLost) => render.reconfigure(),
                Err(RenderError::OutOfMemory) => {
                    log::error!("GPU out of memory, exiting");
                    event_loop.exit();
                    return;
                }
                Err(e) => log::warn!("{}", e),
            }
        }

        // Request next frame
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.startup_error.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.startup_error = Some(e.to_string());
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(render) = &mut self.render {
                    render.resize(physical_size.width, physical_size.height);
                }
                self.pointer.process_resize(physical_size);
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.pointer.process_cursor_moved(position);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if let Some(action) = InputMapper::map_keyboard(key, event.state) {
                        self.handle_action(event_loop, action);
                    }
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config)?;
    event_loop.run_app(&mut app)?;

    match app.startup_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn main() {
    // Load configuration before logging so its level can seed the filter
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();

    if let Some(e) = config_error {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }
    log::info!("Starting Glowfield");

    if let Err(e) = run(config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
