use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use super::{Scheduler, TaskHandle};

enum Registered {
    Timeout(i32),
    Interval(i32, Closure<dyn FnMut()>),
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    live: HashMap<TaskHandle, Registered>,
    // Cancelled interval closures; `cancel` may run inside the closure being cancelled,
    // so these are dropped on the next registration instead.
    retired: Vec<Closure<dyn FnMut()>>,
}

/// [`Scheduler`] backed by `window.setTimeout` / `window.setInterval`.
///
/// Dropping the scheduler clears every timer it still owns.
pub struct BrowserScheduler {
    window: Window,
    registry: Rc<RefCell<Registry>>,
}

impl std::fmt::Debug for BrowserScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserScheduler")
            .field("live", &self.registry.borrow().live.len())
            .finish_non_exhaustive()
    }
}

impl BrowserScheduler {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        Ok(Self {
            window,
            registry: Rc::new(RefCell::new(Registry::default())),
        })
    }

    fn allocate(&self) -> TaskHandle {
        let mut registry = self.registry.borrow_mut();
        registry.retired.clear();
        let handle = TaskHandle::new(registry.next_id);
        registry.next_id += 1;
        handle
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule_once(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskHandle {
        let handle = self.allocate();
        let registry = Rc::downgrade(&self.registry);
        // `once_into_js` frees the closure after its single call.
        let callback = Closure::once_into_js(move || {
            if let Some(registry) = registry.upgrade() {
                registry.borrow_mut().live.remove(&handle);
            }
            task();
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                delay_ms.min(i32::MAX as u32) as i32,
            ) {
            Ok(id) => {
                self.registry
                    .borrow_mut()
                    .live
                    .insert(handle, Registered::Timeout(id));
            }
            Err(err) => log::error!("setTimeout failed: {err:?}"),
        }
        handle
    }

    fn schedule_repeating(&self, period_ms: u32, task: Box<dyn FnMut()>) -> TaskHandle {
        let handle = self.allocate();
        let closure = Closure::wrap(task);
        match self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                period_ms.min(i32::MAX as u32) as i32,
            ) {
            Ok(id) => {
                self.registry
                    .borrow_mut()
                    .live
                    .insert(handle, Registered::Interval(id, closure));
            }
            Err(err) => log::error!("setInterval failed: {err:?}"),
        }
        handle
    }

    fn cancel(&self, handle: TaskHandle) {
        let mut registry = self.registry.borrow_mut();
        match registry.live.remove(&handle) {
            Some(Registered::Timeout(id)) => self.window.clear_timeout_with_handle(id),
            Some(Registered::Interval(id, closure)) => {
                self.window.clear_interval_with_handle(id);
                registry.retired.push(closure);
            }
            None => {}
        }
    }
}

impl Drop for BrowserScheduler {
    fn drop(&mut self) {
        let mut registry = self.registry.borrow_mut();
        for (_, registered) in registry.live.drain() {
            match registered {
                Registered::Timeout(id) => self.window.clear_timeout_with_handle(id),
                Registered::Interval(id, _) => self.window.clear_interval_with_handle(id),
            }
        }
    }
}
