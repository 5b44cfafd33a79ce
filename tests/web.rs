// Browser-only checks for the setTimeout / setInterval scheduler.
// Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]

use std::cell::Cell;
use std::rc::Rc;

use sky_widgets::timer::{BrowserScheduler, Scheduler};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn handles_are_distinct_and_cancel_is_idempotent() {
    let sched = BrowserScheduler::new().expect("window available");
    let fired = Rc::new(Cell::new(false));
    let f = fired.clone();
    let once = sched.schedule_once(10_000, Box::new(move || f.set(true)));
    let every = sched.schedule_repeating(10_000, Box::new(|| {}));
    assert_ne!(once, every);
    sched.cancel(once);
    sched.cancel(once);
    sched.cancel(every);
    sched.cancel(every);
    assert!(!fired.get());
}

#[wasm_bindgen_test]
fn dropping_scheduler_clears_its_timers() {
    let sched = BrowserScheduler::new().expect("window available");
    sched.schedule_repeating(20, Box::new(|| panic!("interval outlived its scheduler")));
    drop(sched);
}
