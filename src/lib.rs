//! Sky widgets core crate.
//!
//! Two independent browser toys share this crate: the pixel elevator
//! ([`elevator`]) and the altitude game ([`altitude`]). Both keep their state in
//! plain Rust types and reach the page only through a surface trait and a
//! [`timer::Scheduler`], so the state machines run natively under `cargo test`.

use wasm_bindgen::prelude::*;

pub mod altitude;
pub mod config;
mod dom;
pub mod elevator;
pub mod timer;
pub mod tones;

pub use config::{AltitudeConfig, ConfigError, ElevatorConfig};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    // A second module instance on the page finds the logger already set.
    if console_log::init_with_level(log::Level::Debug).is_err() {
        log::debug!("console logger already installed");
    }
}
