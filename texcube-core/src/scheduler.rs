/// Frame scheduling in the style of `requestAnimationFrame`
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::error::Result;

/// Identifier of a pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequestId(pub u64);

/// Invoked once with the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

pub trait FrameScheduler {
    /// Run `callback` once, at the next frame
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameRequestId>;

    /// Drop a pending request. Unknown or already-run ids are ignored.
    fn cancel_frame(&self, id: FrameRequestId);
}

/// In-process frame scheduler driven by the host's own loop.
///
/// Callbacks requested while [`FrameQueue::run_frame`] is dispatching are
/// held for the following call, so a self-rescheduling callback runs exactly
/// once per frame.
#[derive(Default)]
pub struct FrameQueue {
    pending: RefCell<VecDeque<(FrameRequestId, FrameCallback)>>,
    next_id: Cell<u64>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Dispatch every callback that was pending when the frame began.
    /// Returns how many ran.
    pub fn run_frame(&self, timestamp: f64) -> usize {
        let due = std::mem::take(&mut *self.pending.borrow_mut());
        let count = due.len();
        for (_, callback) in due {
            callback(timestamp);
        }
        count
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) -> Result<FrameRequestId> {
        let id = FrameRequestId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.pending.borrow_mut().push_back((id, callback));
        Ok(id)
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        self.pending.borrow_mut().retain(|(pending, _)| *pending != id);
    }
}
