/// Self-rescheduling render loop with an explicit cancel handle
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::camera::PerspectiveCamera;
use crate::error::Result;
use crate::renderer::Renderer;
use crate::scene::Scene;
use crate::scheduler::{FrameRequestId, FrameScheduler};

/// Everything one frame touches: the scene, its camera, and the renderer
pub struct Stage<R> {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub renderer: R,
    speed_x: f64,
    speed_y: f64,
}

impl<R: Renderer> Stage<R> {
    pub fn new(scene: Scene, camera: PerspectiveCamera, renderer: R, speed_x: f64, speed_y: f64) -> Self {
        Self {
            scene,
            camera,
            renderer,
            speed_x,
            speed_y,
        }
    }

    /// Advance the cube's rotation by one frame's worth
    pub fn animate(&mut self) {
        if let Some(mesh) = self.scene.mesh_mut() {
            mesh.rotation.rotate(self.speed_x, self.speed_y, 0.0);
        }
    }

    pub fn draw(&mut self) -> Result<()> {
        self.renderer.render(&self.scene, &self.camera)
    }
}

#[derive(Default)]
struct LoopState {
    cancelled: Cell<bool>,
    pending: Cell<Option<FrameRequestId>>,
    frames: Cell<u64>,
    last_error: RefCell<Option<String>>,
}

/// Handle to a running render loop.
///
/// Clones share the same loop. Dropping the handle does not stop the loop;
/// call [`LoopHandle::cancel`].
#[derive(Clone)]
pub struct LoopHandle {
    state: Rc<LoopState>,
    scheduler: Rc<dyn FrameScheduler>,
}

impl LoopHandle {
    fn new(scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self {
            state: Rc::new(LoopState::default()),
            scheduler,
        }
    }

    /// Stop the loop: the pending frame request is withdrawn and no further
    /// frame is drawn. Idempotent.
    pub fn cancel(&self) {
        if self.state.cancelled.replace(true) {
            return;
        }
        if let Some(id) = self.state.pending.take() {
            self.scheduler.cancel_frame(id);
        }
        tracing::debug!(frames = self.frames_rendered(), "render loop cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.get()
    }

    /// Frames whose update and draw have run (including draws that failed)
    pub fn frames_rendered(&self) -> u64 {
        self.state.frames.get()
    }

    /// Message of the most recent draw failure, if any
    pub fn last_error(&self) -> Option<String> {
        self.state.last_error.borrow().clone()
    }
}

/// Start the loop: every frame first requests the next one, then advances
/// the rotation, then draws.
///
/// A failed draw is logged and recorded on the handle; since the next frame is
/// already requested, the loop keeps going.
pub fn start<R: Renderer + 'static>(
    stage: Rc<RefCell<Stage<R>>>,
    scheduler: Rc<dyn FrameScheduler>,
) -> Result<LoopHandle> {
    let handle = LoopHandle::new(scheduler);
    schedule_next(stage, handle.clone())?;
    Ok(handle)
}

fn schedule_next<R: Renderer + 'static>(stage: Rc<RefCell<Stage<R>>>, handle: LoopHandle) -> Result<()> {
    let frame_handle = handle.clone();
    let id = handle.scheduler.request_frame(Box::new(move |_timestamp| {
        if frame_handle.is_cancelled() {
            return;
        }
        frame_handle.state.pending.set(None);

        if let Err(err) = schedule_next(Rc::clone(&stage), frame_handle.clone()) {
            tracing::error!(%err, "could not request the next frame; render loop stops after this one");
        }

        let mut stage = stage.borrow_mut();
        stage.animate();
        if let Err(err) = stage.draw() {
            tracing::error!(%err, "frame draw failed");
            *frame_handle.state.last_error.borrow_mut() = Some(err.to_string());
        }
        frame_handle.state.frames.set(frame_handle.state.frames.get() + 1);
    }))?;
    handle.state.pending.set(Some(id));
    Ok(())
}
