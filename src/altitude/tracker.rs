use rand::Rng;

use super::milestones::{self, Milestone};
use crate::config::AltitudeConfig;

/// Where the climber stands relative to the milestone table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Progress {
    pub altitude: u64,
    pub current_goal: &'static Milestone,
    pub previous_threshold: u64,
    /// Share of the current leg covered, in `[0, 100]`.
    pub percent: f64,
}

impl Progress {
    pub fn at(altitude: u64) -> Self {
        let current_goal = milestones::current_goal(altitude);
        let previous_threshold = milestones::previous_threshold(altitude);
        let percent = if current_goal.threshold == previous_threshold {
            100.0
        } else {
            let covered = altitude.saturating_sub(previous_threshold) as f64;
            let leg = current_goal.threshold.saturating_sub(previous_threshold) as f64;
            (covered / leg * 100.0).clamp(0.0, 100.0)
        };
        Self {
            altitude,
            current_goal,
            previous_threshold,
            percent,
        }
    }

    /// Whole-percent text for the progress label.
    pub fn percent_label(&self) -> String {
        format!("{}%", self.percent.round() as u32)
    }
}

/// Result of one [`AltitudeTracker::advance`].
#[derive(Clone, Debug, PartialEq)]
pub struct Advance {
    pub gain: u64,
    pub altitude_before: u64,
    pub altitude: u64,
    /// Level after the advance.
    pub level: u32,
    /// Milestones crossed by this gain, ascending.
    pub achieved: Vec<&'static Milestone>,
}

/// Cumulative altitude and level counters.
#[derive(Clone, Debug, PartialEq)]
pub struct AltitudeTracker {
    altitude: u64,
    level: u32,
    base_gain: u64,
    gain_per_level: u64,
    gain_jitter: u64,
}

impl AltitudeTracker {
    pub fn new(config: &AltitudeConfig) -> Self {
        Self::with_state(config, 0, 1)
    }

    /// Tracker resumed at a given altitude and level.
    pub fn with_state(config: &AltitudeConfig, altitude: u64, level: u32) -> Self {
        Self {
            altitude,
            level: level.max(1),
            base_gain: config.base_gain,
            gain_per_level: config.gain_per_level,
            gain_jitter: config.gain_jitter,
        }
    }

    pub fn altitude(&self) -> u64 {
        self.altitude
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn progress(&self) -> Progress {
        Progress::at(self.altitude)
    }

    /// Gain for the current level given a roll in `[0, 1)`.
    ///
    /// Rolls outside that range are clamped so the gain always stays below
    /// `base + level * per_level + jitter`.
    pub fn gain_for_roll(&self, roll: f64) -> u64 {
        let jitter = if roll.is_nan() {
            0
        } else {
            ((roll.clamp(0.0, 1.0) * self.gain_jitter as f64) as u64)
                .min(self.gain_jitter.saturating_sub(1))
        };
        self.base_gain + u64::from(self.level) * self.gain_per_level + jitter
    }

    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Advance {
        let roll = rng.gen_range(0.0..1.0);
        self.advance_with_roll(roll)
    }

    pub fn advance_with_roll(&mut self, roll: f64) -> Advance {
        let gain = self.gain_for_roll(roll);
        let altitude_before = self.altitude;
        self.altitude = self.altitude.saturating_add(gain);
        self.level = self.level.saturating_add(1);
        let achieved = milestones::crossed_between(altitude_before, self.altitude).collect();
        Advance {
            gain,
            altitude_before,
            altitude: self.altitude,
            level: self.level,
            achieved,
        }
    }
}
