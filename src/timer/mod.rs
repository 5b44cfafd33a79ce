//! Timer primitives shared by both widgets.
//!
//! Widgets never call `setTimeout` directly. They go through [`Scheduler`], which
//! hands back a [`TaskHandle`] for every registration so the owning widget can
//! cancel everything it started from a single teardown path.

mod browser;
mod manual;

pub use browser::BrowserScheduler;
pub use manual::ManualScheduler;

/// Identifies one scheduled task. Handles are never reused by a scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }
}

/// "Run once after N ms", "run every N ms until cancelled" and "cancel".
///
/// Implementations are single-threaded and use interior mutability; tasks may
/// schedule or cancel other tasks while they run.
pub trait Scheduler {
    /// Runs `task` once, `delay_ms` from now.
    fn schedule_once(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle;

    /// Runs `task` every `period_ms` until the handle is cancelled.
    fn schedule_repeating(&self, period_ms: u32, task: Box<dyn FnMut()>) -> TaskHandle;

    /// Stops a task. Unknown, finished or already cancelled handles are ignored.
    fn cancel(&self, handle: TaskHandle);
}
