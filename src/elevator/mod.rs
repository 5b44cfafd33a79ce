//! Pixel elevator: floor selection with a timed ride and a scrolling backdrop.
//!
//! The controller is the only source of truth for motion. The surface gets an
//! [`ElevatorView`] after every change and derives button states, the arrow
//! and the bounce animation from it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::config::ElevatorConfig;
use crate::timer::{Scheduler, TaskHandle};

mod dom;

pub use dom::{ElevatorApp, start_elevator};
#[cfg(feature = "serde_json")]
pub use dom::start_elevator_with_config;

/// Direction of travel. `Stop` exactly when the elevator is idle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Stop,
    Up,
    Down,
}

impl Direction {
    /// Indicator glyph shown while moving.
    pub fn arrow(self) -> Option<&'static str> {
        match self {
            Direction::Up => Some("▲"),
            Direction::Down => Some("▼"),
            Direction::Stop => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ElevatorState {
    current_floor: i32,
    is_moving: bool,
    direction: Direction,
    scroll_offset: i64,
}

/// Snapshot handed to the presentation surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElevatorView {
    pub floor: i32,
    pub moving: bool,
    pub direction: Direction,
    pub scroll_offset: i64,
    /// Backdrop `top` in px, wrapped to one background section.
    pub background_top_px: i64,
    pub can_go_up: bool,
    pub can_go_down: bool,
}

/// Receives state projections from an [`ElevatorController`].
pub trait ElevatorSurface {
    fn render(&self, view: &ElevatorView);
}

impl<F: Fn(&ElevatorView)> ElevatorSurface for F {
    fn render(&self, view: &ElevatorView) {
        self(view)
    }
}

struct Shared {
    config: ElevatorConfig,
    state: RefCell<ElevatorState>,
    tick: Cell<Option<TaskHandle>>,
    arrival: Cell<Option<TaskHandle>>,
    torn_down: Cell<bool>,
    surface: Rc<dyn ElevatorSurface>,
}

impl Shared {
    fn view(&self) -> ElevatorView {
        let state = *self.state.borrow();
        let cfg = &self.config;
        ElevatorView {
            floor: state.current_floor,
            moving: state.is_moving,
            direction: state.direction,
            scroll_offset: state.scroll_offset,
            background_top_px: -(state.scroll_offset % cfg.scroll_period_px),
            can_go_up: !state.is_moving && state.current_floor < cfg.max_floor,
            can_go_down: !state.is_moving && state.current_floor > cfg.min_floor,
        }
    }

    fn render(&self) {
        let view = self.view();
        self.surface.render(&view);
    }
}

/// Idle → Moving → Idle state machine for a single car.
pub struct ElevatorController<S: Scheduler + 'static> {
    scheduler: Rc<S>,
    shared: Rc<Shared>,
}

impl<S: Scheduler + 'static> std::fmt::Debug for ElevatorController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevatorController")
            .field("view", &self.shared.view())
            .finish_non_exhaustive()
    }
}

impl<S: Scheduler + 'static> ElevatorController<S> {
    /// Builds an idle controller and renders its initial state.
    ///
    /// `config` is assumed valid; see [`ElevatorConfig::validate`].
    pub fn new(config: ElevatorConfig, scheduler: Rc<S>, surface: Rc<dyn ElevatorSurface>) -> Self {
        let state = ElevatorState {
            current_floor: config.start_floor,
            is_moving: false,
            direction: Direction::Stop,
            scroll_offset: 0,
        };
        let shared = Rc::new(Shared {
            config,
            state: RefCell::new(state),
            tick: Cell::new(None),
            arrival: Cell::new(None),
            torn_down: Cell::new(false),
            surface,
        });
        shared.render();
        Self { scheduler, shared }
    }

    pub fn view(&self) -> ElevatorView {
        self.shared.view()
    }

    /// Starts a ride to `target`. Returns `false`, changing nothing, when the car
    /// is already moving, is at `target`, `target` is out of range, or the
    /// controller was torn down.
    pub fn request_floor(&self, target: i32) -> bool {
        let shared = &self.shared;
        let cfg = &shared.config;
        let from = {
            let state = shared.state.borrow();
            if shared.torn_down.get() || state.is_moving {
                log::debug!("floor {target} ignored: elevator busy");
                return false;
            }
            if target == state.current_floor || target < cfg.min_floor || target > cfg.max_floor {
                log::debug!("floor {target} ignored from floor {}", state.current_floor);
                return false;
            }
            state.current_floor
        };

        let travel_ms = target.abs_diff(from).saturating_mul(cfg.ms_per_floor);
        let direction = if target > from {
            Direction::Up
        } else {
            Direction::Down
        };
        {
            let mut state = shared.state.borrow_mut();
            state.is_moving = true;
            state.direction = direction;
        }
        log::debug!("elevator {from} -> {target} ({direction:?}, {travel_ms} ms)");

        let delta = match direction {
            Direction::Up => -cfg.scroll_step,
            _ => cfg.scroll_step,
        };
        if let Some(stale) = shared.tick.take() {
            self.scheduler.cancel(stale);
        }
        let weak = Rc::downgrade(shared);
        let tick = self.scheduler.schedule_repeating(
            cfg.tick_ms,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.state.borrow_mut().scroll_offset += delta;
                    shared.render();
                }
            }),
        );
        shared.tick.set(Some(tick));

        let weak = Rc::downgrade(shared);
        let scheduler = Rc::downgrade(&self.scheduler);
        let arrival = self.scheduler.schedule_once(
            travel_ms,
            Box::new(move || {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                shared.arrival.set(None);
                // Stop the scroll before the floor changes.
                if let (Some(tick), Some(scheduler)) = (shared.tick.take(), scheduler.upgrade()) {
                    scheduler.cancel(tick);
                }
                {
                    let mut state = shared.state.borrow_mut();
                    state.is_moving = false;
                    state.direction = Direction::Stop;
                    state.current_floor = target;
                }
                log::debug!("elevator arrived at floor {target}");
                shared.render();
            }),
        );
        shared.arrival.set(Some(arrival));

        shared.render();
        true
    }

    /// Cancels every timer this controller owns and rejects further requests.
    /// A ride in flight is frozen where it is.
    pub fn teardown(&self) {
        self.shared.torn_down.set(true);
        if let Some(tick) = self.shared.tick.take() {
            self.scheduler.cancel(tick);
        }
        if let Some(arrival) = self.shared.arrival.take() {
            self.scheduler.cancel(arrival);
        }
    }
}

impl<S: Scheduler + 'static> Drop for ElevatorController<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
