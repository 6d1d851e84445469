use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use texcube_core::{Error, FrameCallback, FrameRequestId, FrameScheduler, Result};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

type FrameClosure = Closure<dyn FnMut(f64)>;

/// A request handed to the browser; owns the closure JS will call
struct Request {
    handle: i32,
    closure: FrameClosure,
}

#[derive(Default)]
struct Requests {
    next_id: Cell<u64>,
    pending: RefCell<HashMap<u64, Request>>,
}

/// `requestAnimationFrame` on the page's window.
///
/// Closures stay owned on the Rust side until they fire or are cancelled, so
/// a cancelled request releases whatever its callback captured.
pub struct AnimationFrameScheduler {
    window: web_sys::Window,
    requests: Rc<Requests>,
}

impl AnimationFrameScheduler {
    pub fn new(window: web_sys::Window) -> Self {
        Self {
            window,
            requests: Rc::new(Requests::default()),
        }
    }

    /// Requests that have neither fired nor been cancelled
    pub fn pending(&self) -> usize {
        self.requests.pending.borrow().len()
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameRequestId> {
        let id = self.requests.next_id.get();
        self.requests.next_id.set(id + 1);

        let requests: Weak<Requests> = Rc::downgrade(&self.requests);
        let mut callback = Some(callback);
        let closure = FrameClosure::new(move |timestamp: f64| {
            // Held until the callback returns; wasm-bindgen defers freeing a
            // closure dropped during its own call
            let fired = requests
                .upgrade()
                .and_then(|requests| requests.pending.borrow_mut().remove(&id));
            if let Some(callback) = callback.take() {
                callback(timestamp);
            }
            drop(fired);
        });

        let handle = self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|err| Error::Schedule(format!("{err:?}")))?;
        self.requests
            .pending
            .borrow_mut()
            .insert(id, Request { handle, closure });
        Ok(FrameRequestId(id))
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        let Some(request) = self.requests.pending.borrow_mut().remove(&id.0) else {
            return;
        };
        if let Err(err) = self.window.cancel_animation_frame(request.handle) {
            tracing::warn!(?err, "cancelAnimationFrame failed");
        }
    }
}
