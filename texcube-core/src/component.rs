/// The cube component: inputs, lifecycle hooks, and host wiring
use std::cell::RefCell;
use std::rc::Rc;

use crate::camera::PerspectiveCamera;
use crate::config::CubeConfig;
use crate::error::Result;
use crate::render_loop::{self, LoopHandle, Stage};
use crate::renderer::{CanvasSurface, Renderer};
use crate::scene::{assemble_scene, Scene};
use crate::scheduler::FrameScheduler;
use crate::texture::Texture;
use crate::transform::Euler;

/// Lifecycle hooks a UI host calls on its components
pub trait Lifecycle {
    /// Inputs are bound; the view does not exist yet
    fn on_init(&mut self) {}

    /// The view, and with it the canvas, is attached and sized
    fn on_view_ready(&mut self) -> Result<()>;
}

/// Platform services the component needs from whoever embeds it
pub trait Host {
    type Surface: CanvasSurface;
    type Renderer: Renderer + 'static;

    fn surface(&self) -> &Self::Surface;

    /// Create a renderer bound to the surface
    fn create_renderer(&self) -> Result<Self::Renderer>;

    fn scheduler(&self) -> Rc<dyn FrameScheduler>;

    /// Begin loading `texture` from its path. Completion is reported through
    /// the texture slot; failures are not returned.
    fn load_texture(&self, texture: &Texture);
}

pub struct CubeComponent<H: Host> {
    config: CubeConfig,
    host: H,
    stage: Option<Rc<RefCell<Stage<H::Renderer>>>>,
    render_loop: Option<LoopHandle>,
}

impl<H: Host> CubeComponent<H> {
    pub fn new(config: CubeConfig, host: H) -> Self {
        Self {
            config,
            host,
            stage: None,
            render_loop: None,
        }
    }

    pub fn config(&self) -> &CubeConfig {
        &self.config
    }

    /// Change inputs. After the view is ready the new values are stored but
    /// the running scene is not re-assembled.
    pub fn update_config(&mut self, update: impl FnOnce(&mut CubeConfig)) {
        update(&mut self.config);
        if self.is_assembled() {
            tracing::debug!("inputs changed after the view was ready; running scene keeps its values");
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_assembled(&self) -> bool {
        self.stage.is_some()
    }

    pub fn camera(&self) -> Option<PerspectiveCamera> {
        self.stage.as_ref().map(|stage| stage.borrow().camera.clone())
    }

    pub fn rotation(&self) -> Option<Euler> {
        self.with_scene(|scene| scene.mesh().map(|mesh| mesh.rotation))
            .flatten()
    }

    /// Inspect the live scene
    pub fn with_scene<T>(&self, f: impl FnOnce(&Scene) -> T) -> Option<T> {
        self.stage.as_ref().map(|stage| f(&stage.borrow().scene))
    }

    pub fn render_loop(&self) -> Option<&LoopHandle> {
        self.render_loop.as_ref()
    }

    /// Stop the render loop. The scene stays inspectable.
    pub fn destroy(&mut self) {
        if let Some(handle) = self.render_loop.take() {
            handle.cancel();
        }
    }

    fn start_rendering_loop(&mut self, scene: Scene, camera: PerspectiveCamera) -> Result<()> {
        let (width, height) = self.host.surface().client_size();
        let mut renderer = self.host.create_renderer()?;
        renderer.set_pixel_ratio(self.host.surface().device_pixel_ratio());
        renderer.set_size(width, height);

        let stage = Rc::new(RefCell::new(Stage::new(
            scene,
            camera,
            renderer,
            self.config.rotation_speed_x,
            self.config.rotation_speed_y,
        )));
        self.stage = Some(Rc::clone(&stage));
        self.render_loop = Some(render_loop::start(stage, self.host.scheduler())?);
        Ok(())
    }
}

impl<H: Host> Lifecycle for CubeComponent<H> {
    fn on_view_ready(&mut self) -> Result<()> {
        if self.is_assembled() {
            tracing::warn!("view ready fired again; scene is only assembled once");
            return Ok(());
        }

        let (width, height) = self.host.surface().client_size();
        let (scene, camera, texture) = assemble_scene(&self.config, width, height);
        self.host.load_texture(&texture);

        self.start_rendering_loop(scene, camera)?;
        tracing::info!(width, height, "cube component started");
        Ok(())
    }
}

impl<H: Host> Drop for CubeComponent<H> {
    fn drop(&mut self) {
        self.destroy();
    }
}
