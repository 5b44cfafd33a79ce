//! Altitude game: each launch climbs a randomized amount, progress is measured
//! against a fixed milestone table, and crossing a milestone pops an achievement.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use rand::RngCore;

use crate::config::AltitudeConfig;
use crate::timer::{Scheduler, TaskHandle};
use crate::tones::{self, TonePlayer};

mod dom;
mod milestones;
mod tracker;

pub use dom::{AltitudeApp, start_altitude_game};
#[cfg(feature = "serde_json")]
pub use dom::start_altitude_game_with_config;
pub use milestones::{MILESTONES, Milestone, crossed_between, current_goal, previous_threshold};
pub use tracker::{Advance, AltitudeTracker, Progress};

/// Background band for the current altitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkyBand {
    Ground,
    CloudLayer,
    UpperTroposphere,
    Stratosphere,
    Mesosphere,
    Space,
}

impl SkyBand {
    pub const ALL: [SkyBand; 6] = [
        SkyBand::Ground,
        SkyBand::CloudLayer,
        SkyBand::UpperTroposphere,
        SkyBand::Stratosphere,
        SkyBand::Mesosphere,
        SkyBand::Space,
    ];

    pub fn for_altitude(altitude: u64) -> Self {
        match altitude {
            100_000.. => SkyBand::Space,
            50_000.. => SkyBand::Mesosphere,
            20_000.. => SkyBand::Stratosphere,
            10_000.. => SkyBand::UpperTroposphere,
            5_000.. => SkyBand::CloudLayer,
            _ => SkyBand::Ground,
        }
    }

    /// Class the host stylesheet keys the background on.
    pub fn css_class(self) -> &'static str {
        match self {
            SkyBand::Ground => "sky-ground",
            SkyBand::CloudLayer => "sky-cloud-layer",
            SkyBand::UpperTroposphere => "sky-upper-troposphere",
            SkyBand::Stratosphere => "sky-stratosphere",
            SkyBand::Mesosphere => "sky-mesosphere",
            SkyBand::Space => "sky-space",
        }
    }
}

/// `1234567` -> `"1,234,567"`.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn launch_label(gain: Option<u64>) -> String {
    match gain {
        Some(gain) => format!("+{gain}m 상승 중... 🚀"),
        None => "목표를 향해 발사! 🚀".to_string(),
    }
}

pub fn goal_label(goal: &Milestone) -> String {
    format!("다음 목표: {} ({}m)", goal.name, group_thousands(goal.threshold))
}

pub fn achievement_title(milestone: &Milestone) -> String {
    format!("🎉 {} 달성!", milestone.name)
}

/// Receives state projections from an [`AltitudeGame`].
pub trait AltitudeSurface {
    fn show_status(&self, progress: &Progress);
    /// `Some(gain)` while the character is flying, `None` once it lands.
    fn set_launching(&self, gain: Option<u64>);
    fn show_achievement(&self, milestone: &Milestone);
    fn hide_achievement(&self);
    fn set_sky(&self, band: SkyBand);
}

struct Shared {
    config: AltitudeConfig,
    tracker: RefCell<AltitudeTracker>,
    rng: RefCell<Box<dyn RngCore>>,
    launching: Cell<bool>,
    flight: Cell<Option<TaskHandle>>,
    popup: Cell<Option<TaskHandle>>,
    torn_down: Cell<bool>,
    surface: Rc<dyn AltitudeSurface>,
    audio: Rc<dyn TonePlayer>,
}

impl Shared {
    fn land<S: Scheduler + 'static>(self: &Rc<Self>, scheduler: &Rc<S>, achieved: &[&'static Milestone]) {
        self.launching.set(false);
        let progress = self.tracker.borrow().progress();
        self.surface.show_status(&progress);
        self.surface.set_sky(SkyBand::for_altitude(progress.altitude));

        for milestone in achieved {
            log::info!("milestone reached: {} ({}m)", milestone.name, milestone.threshold);
            self.surface.show_achievement(milestone);
            self.audio.play(&tones::CELEBRATION);
        }
        if !achieved.is_empty() {
            // One popup element: the latest achievement gets the full window.
            if let Some(pending) = self.popup.take() {
                scheduler.cancel(pending);
            }
            let weak: Weak<Self> = Rc::downgrade(self);
            let hide = scheduler.schedule_once(
                self.config.popup_ms,
                Box::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.popup.set(None);
                        shared.surface.hide_achievement();
                    }
                }),
            );
            self.popup.set(Some(hide));
        }
        self.surface.set_launching(None);
    }
}

/// Button-driven climb with a fixed flight window per launch.
pub struct AltitudeGame<S: Scheduler + 'static> {
    scheduler: Rc<S>,
    shared: Rc<Shared>,
}

impl<S: Scheduler + 'static> std::fmt::Debug for AltitudeGame<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AltitudeGame")
            .field("tracker", &self.shared.tracker.borrow())
            .field("launching", &self.shared.launching.get())
            .finish_non_exhaustive()
    }
}

impl<S: Scheduler + 'static> AltitudeGame<S> {
    /// Builds a game from `tracker` and renders its starting progress.
    pub fn new(
        config: AltitudeConfig,
        tracker: AltitudeTracker,
        scheduler: Rc<S>,
        surface: Rc<dyn AltitudeSurface>,
        audio: Rc<dyn TonePlayer>,
        rng: Box<dyn RngCore>,
    ) -> Self {
        let progress = tracker.progress();
        surface.show_status(&progress);
        surface.set_sky(SkyBand::for_altitude(progress.altitude));
        surface.set_launching(None);
        let shared = Rc::new(Shared {
            config,
            tracker: RefCell::new(tracker),
            rng: RefCell::new(rng),
            launching: Cell::new(false),
            flight: Cell::new(None),
            popup: Cell::new(None),
            torn_down: Cell::new(false),
            surface,
            audio,
        });
        Self { scheduler, shared }
    }

    pub fn altitude(&self) -> u64 {
        self.shared.tracker.borrow().altitude()
    }

    pub fn level(&self) -> u32 {
        self.shared.tracker.borrow().level()
    }

    pub fn progress(&self) -> Progress {
        self.shared.tracker.borrow().progress()
    }

    pub fn is_launching(&self) -> bool {
        self.shared.launching.get()
    }

    /// Climbs once. Ignored (returns `None`) while a flight is in progress.
    ///
    /// Counters update immediately; the surface sees the new progress and any
    /// achievements when the flight window ends.
    pub fn launch(&self) -> Option<Advance> {
        let shared = &self.shared;
        if shared.torn_down.get() || shared.launching.get() {
            log::debug!("launch ignored: flight in progress");
            return None;
        }
        shared.audio.play(&tones::LEVEL_UP);
        let advance = {
            let mut rng = shared.rng.borrow_mut();
            shared.tracker.borrow_mut().advance(&mut **rng)
        };
        log::debug!(
            "launch +{}m -> {}m (level {})",
            advance.gain,
            advance.altitude,
            advance.level
        );
        shared.launching.set(true);
        shared.surface.set_launching(Some(advance.gain));

        let weak = Rc::downgrade(shared);
        let scheduler = Rc::downgrade(&self.scheduler);
        let achieved = advance.achieved.clone();
        let flight = self.scheduler.schedule_once(
            shared.config.flight_ms,
            Box::new(move || {
                let (Some(shared), Some(scheduler)) = (weak.upgrade(), scheduler.upgrade()) else {
                    return;
                };
                shared.flight.set(None);
                shared.land(&scheduler, &achieved);
            }),
        );
        shared.flight.set(Some(flight));
        Some(advance)
    }

    /// Cancels the flight and popup timers and rejects further launches.
    pub fn teardown(&self) {
        self.shared.torn_down.set(true);
        for slot in [&self.shared.flight, &self.shared.popup] {
            if let Some(handle) = slot.take() {
                self.scheduler.cancel(handle);
            }
        }
    }
}

impl<S: Scheduler + 'static> Drop for AltitudeGame<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(65_432), "65,432");
        assert_eq!(group_thousands(1_000_000), "1,000,000");
    }

    #[test]
    fn sky_bands_switch_at_thresholds() {
        assert_eq!(SkyBand::for_altitude(0), SkyBand::Ground);
        assert_eq!(SkyBand::for_altitude(4_999), SkyBand::Ground);
        assert_eq!(SkyBand::for_altitude(5_000), SkyBand::CloudLayer);
        assert_eq!(SkyBand::for_altitude(10_000), SkyBand::UpperTroposphere);
        assert_eq!(SkyBand::for_altitude(49_999), SkyBand::Stratosphere);
        assert_eq!(SkyBand::for_altitude(50_000), SkyBand::Mesosphere);
        assert_eq!(SkyBand::for_altitude(u64::MAX), SkyBand::Space);
    }

    #[test]
    fn labels() {
        assert_eq!(launch_label(Some(180)), "+180m 상승 중... 🚀");
        assert_eq!(launch_label(None), "목표를 향해 발사! 🚀");
        assert_eq!(goal_label(&MILESTONES[8]), "다음 목표: 달 궤도 (1,000,000m)");
        assert_eq!(achievement_title(&MILESTONES[0]), "🎉 구름층 돌파 달성!");
    }
}
