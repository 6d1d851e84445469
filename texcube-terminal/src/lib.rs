/// Terminal host for the cube component
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{self},
};
use std::fs;
use std::io::{stdout, Stdout};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};
use texcube_core::{
    CanvasSurface, CubeComponent, CubeConfig, FrameQueue, FrameScheduler, Host, Lifecycle, Texture,
};

pub mod error;
pub mod loader;
pub mod renderer;

pub use error::AppError;
pub use loader::TextureLoader;
pub use renderer::HalfBlockRenderer;

/// The terminal viewed as a canvas. Each cell holds two square-ish pixels
/// stacked vertically, so the client height is twice the row count.
#[derive(Debug, Clone, Copy)]
pub struct TerminalSurface {
    columns: u16,
    rows: u16,
}

impl TerminalSurface {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self { columns, rows }
    }

    pub fn current() -> std::io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        Ok(Self::new(columns, rows))
    }
}

impl CanvasSurface for TerminalSurface {
    fn client_size(&self) -> (u32, u32) {
        (self.columns as u32, self.rows as u32 * 2)
    }

    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }
}

pub struct TerminalHost {
    surface: TerminalSurface,
    queue: Rc<FrameQueue>,
    loader: TextureLoader,
}

impl TerminalHost {
    pub fn new(surface: TerminalSurface, asset_root: impl Into<PathBuf>) -> Self {
        Self {
            surface,
            queue: Rc::new(FrameQueue::new()),
            loader: TextureLoader::new(asset_root),
        }
    }

    pub fn frame_queue(&self) -> &Rc<FrameQueue> {
        &self.queue
    }
}

impl Host for TerminalHost {
    type Surface = TerminalSurface;
    type Renderer = HalfBlockRenderer<Stdout>;

    fn surface(&self) -> &TerminalSurface {
        &self.surface
    }

    fn create_renderer(&self) -> texcube_core::Result<Self::Renderer> {
        Ok(HalfBlockRenderer::new(stdout()))
    }

    fn scheduler(&self) -> Rc<dyn FrameScheduler> {
        self.queue.clone()
    }

    fn load_texture(&self, texture: &Texture) {
        tracing::debug!(path = %self.loader.resolve(texture.path()).display(), "loading texture");
        self.loader.spawn(texture);
    }
}

/// Read component inputs from a TOML file, or use the defaults
pub fn load_config(path: Option<&Path>) -> Result<CubeConfig, AppError> {
    let Some(path) = path else {
        return Ok(CubeConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|source| AppError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(CubeConfig::from_toml_str(&text)?)
}

/// Frame pacing and stop conditions for [`TerminalApp`]
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub fps: u32,
    pub max_frames: Option<u64>,
    pub asset_root: PathBuf,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            fps: 60,
            max_frames: None,
            asset_root: PathBuf::from("."),
        }
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    component: CubeComponent<TerminalHost>,
    options: AppOptions,
    running: bool,
}

impl TerminalApp {
    pub fn new(config: CubeConfig, options: AppOptions) -> Result<Self, AppError> {
        let surface = TerminalSurface::current()?;
        let host = TerminalHost::new(surface, options.asset_root.clone());

        Ok(Self {
            component: CubeComponent::new(config, host),
            options,
            running: true,
        })
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        self.component.destroy();
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> Result<(), AppError> {
        let target_frame_time = Duration::from_secs_f64(1.0 / self.options.fps.max(1) as f64);
        let queue = Rc::clone(self.component.host().frame_queue());
        let started = Instant::now();

        self.component.on_init();
        self.component.on_view_ready()?;

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_input(event::read()?);
            }

            queue.run_frame(started.elapsed().as_secs_f64() * 1000.0);

            if let (Some(max), Some(handle)) = (self.options.max_frames, self.component.render_loop()) {
                if handle.frames_rendered() >= max {
                    self.running = false;
                }
            }

            // Frame timing
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }
        }

        Ok(())
    }

    fn handle_input(&mut self, event: Event) {
        if let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        {
            match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    self.running = false
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_surface_doubles_rows() {
        let surface = TerminalSurface::new(80, 24);
        assert_eq!(surface.client_size(), (80, 48));
        assert_eq!(surface.device_pixel_ratio(), 1.0);
    }

    #[test]
    fn test_load_config_defaults_without_file() {
        assert_eq!(load_config(None).unwrap(), CubeConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rotationSpeedY = 0.01").unwrap();
        writeln!(file, "texture = \"assets/crate.png\"").unwrap();
        writeln!(file, "farClipping = 20.0").unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.rotation_speed_y, 0.01);
        assert_eq!(config.texture, "assets/crate.png");
        assert_eq!(config.far_clipping_plane, 20.0);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Some(Path::new("/no/such/texcube.toml"))).unwrap_err();
        assert!(matches!(err, AppError::ConfigRead { .. }));
    }

    #[test]
    fn test_host_queue_drives_component() {
        let dir = tempfile::tempdir().unwrap();
        let host = TerminalHost::new(TerminalSurface::new(20, 10), dir.path());
        let queue = Rc::clone(host.frame_queue());
        let mut component = CubeComponent::new(CubeConfig::default(), host);

        component.on_view_ready().unwrap();
        assert_eq!(component.camera().unwrap().aspect, 1.0);
        assert_eq!(queue.pending(), 1);

        component.destroy();
        assert_eq!(queue.pending(), 0);
    }
}
