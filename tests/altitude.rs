// Altitude tracker and game widget behavior.
// Native-only: audio and DOM are replaced by recording doubles.

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use sky_widgets::AltitudeConfig;
use sky_widgets::altitude::{
    AltitudeGame, AltitudeSurface, AltitudeTracker, MILESTONES, Milestone, Progress, SkyBand,
};
use sky_widgets::timer::ManualScheduler;
use sky_widgets::tones::{self, Tone, TonePlayer};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Status(u64, u64),
    Launching(Option<u64>),
    Shown(&'static str),
    Hidden,
    Sky(SkyBand),
}

#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<Event>>,
    sounds: RefCell<Vec<usize>>,
}

impl AltitudeSurface for Recorder {
    fn show_status(&self, progress: &Progress) {
        self.events
            .borrow_mut()
            .push(Event::Status(progress.altitude, progress.current_goal.threshold));
    }
    fn set_launching(&self, gain: Option<u64>) {
        self.events.borrow_mut().push(Event::Launching(gain));
    }
    fn show_achievement(&self, milestone: &Milestone) {
        self.events.borrow_mut().push(Event::Shown(milestone.name));
    }
    fn hide_achievement(&self) {
        self.events.borrow_mut().push(Event::Hidden);
    }
    fn set_sky(&self, band: SkyBand) {
        self.events.borrow_mut().push(Event::Sky(band));
    }
}

impl TonePlayer for Recorder {
    fn play(&self, tones: &[Tone]) {
        self.sounds.borrow_mut().push(tones.len());
    }
}

fn game(altitude: u64, seed: u64) -> (Rc<ManualScheduler>, Rc<Recorder>, AltitudeGame<ManualScheduler>) {
    let config = AltitudeConfig::default();
    let tracker = AltitudeTracker::with_state(&config, altitude, 1);
    let sched = Rc::new(ManualScheduler::new());
    let rec = Rc::new(Recorder::default());
    let game = AltitudeGame::new(
        config,
        tracker,
        sched.clone(),
        rec.clone(),
        rec.clone(),
        Box::new(StdRng::seed_from_u64(seed)),
    );
    rec.events.borrow_mut().clear();
    (sched, rec, game)
}

#[test]
fn gain_stays_within_level_bounds() {
    let config = AltitudeConfig::default();
    let mut rng = StdRng::seed_from_u64(7);
    let mut tracker = AltitudeTracker::new(&config);
    for _ in 0..500 {
        let level_before = u64::from(tracker.level());
        let altitude_before = tracker.altitude();
        let adv = tracker.advance(&mut rng);
        assert!(adv.gain >= 100 + 50 * level_before, "{adv:?}");
        assert!(adv.gain < 300 + 50 * level_before, "{adv:?}");
        assert_eq!(adv.altitude, altitude_before + adv.gain);
        assert_eq!(u64::from(adv.level), level_before + 1);
    }
}

#[test]
fn progress_always_within_bounds() {
    let config = AltitudeConfig::default();
    let mut rng = StdRng::seed_from_u64(11);
    let mut tracker = AltitudeTracker::new(&config);
    while tracker.altitude() < 1_200_000 {
        tracker.advance(&mut rng);
        let p = tracker.progress();
        assert!((0.0..=100.0).contains(&p.percent), "{p:?}");
        if p.altitude >= MILESTONES[8].threshold {
            assert_eq!(p.percent, 100.0);
        }
    }
}

#[test]
fn notification_per_crossed_threshold() {
    let config = AltitudeConfig::default();
    let mut rng = StdRng::seed_from_u64(3);
    let mut tracker = AltitudeTracker::new(&config);
    let mut seen = Vec::new();
    while tracker.altitude() < 1_100_000 {
        let adv = tracker.advance(&mut rng);
        let expected = MILESTONES
            .iter()
            .filter(|m| m.threshold > adv.altitude_before && m.threshold <= adv.altitude)
            .count();
        assert_eq!(adv.achieved.len(), expected);
        seen.extend(adv.achieved.iter().map(|m| m.threshold));
    }
    let all: Vec<u64> = MILESTONES.iter().map(|m| m.threshold).collect();
    assert_eq!(seen, all, "each milestone is reported exactly once");
}

#[test]
fn crossing_the_cloud_layer() {
    let config = AltitudeConfig::default();
    let mut tracker = AltitudeTracker::with_state(&config, 900, 1);
    let adv = tracker.advance(&mut StdRng::seed_from_u64(99));
    assert!((150..350).contains(&adv.gain));
    assert_eq!(adv.achieved.len(), 1);
    assert_eq!(adv.achieved[0].name, "구름층 돌파");
}

#[test]
fn beyond_the_last_milestone() {
    let config = AltitudeConfig::default();
    let tracker = AltitudeTracker::with_state(&config, 2_000_000, 40);
    let p = tracker.progress();
    assert_eq!(p.current_goal.threshold, 1_000_000);
    assert_eq!(p.current_goal.name, "달 궤도");
    assert_eq!(p.percent, 100.0);
    assert_eq!(p.percent_label(), "100%");
}

#[test]
fn launch_defers_display_until_landing() {
    let (sched, rec, game) = game(0, 1);
    let adv = game.launch().expect("first launch accepted");
    assert!(game.is_launching());
    assert_eq!(game.altitude(), adv.gain);
    assert_eq!(*rec.events.borrow(), vec![Event::Launching(Some(adv.gain))]);
    assert_eq!(*rec.sounds.borrow(), vec![tones::LEVEL_UP.len()]);

    assert!(game.launch().is_none(), "second launch during flight");
    sched.advance_by(2_999);
    assert_eq!(rec.events.borrow().len(), 1);

    sched.advance_by(1);
    assert!(!game.is_launching());
    assert_eq!(
        *rec.events.borrow(),
        vec![
            Event::Launching(Some(adv.gain)),
            Event::Status(adv.gain, 1_000),
            Event::Sky(SkyBand::Ground),
            Event::Launching(None),
        ]
    );
    assert!(game.launch().is_some());
}

#[test]
fn achievement_popup_hides_after_its_window() {
    let (sched, rec, game) = game(900, 5);
    game.launch();
    sched.advance_by(3_000);
    assert!(rec.events.borrow().contains(&Event::Shown("구름층 돌파")));
    assert_eq!(
        *rec.sounds.borrow(),
        vec![tones::LEVEL_UP.len(), tones::CELEBRATION.len()]
    );
    assert!(!rec.events.borrow().contains(&Event::Hidden));

    sched.advance_by(2_999);
    assert!(!rec.events.borrow().contains(&Event::Hidden));
    sched.advance_by(1);
    assert_eq!(rec.events.borrow().last(), Some(&Event::Hidden));
    assert_eq!(sched.pending(), 0);
}

#[test]
fn teardown_cancels_pending_landing() {
    let (sched, rec, game) = game(0, 2);
    game.launch();
    game.teardown();
    assert_eq!(sched.pending(), 0);
    sched.advance_by(10_000);
    assert_eq!(rec.events.borrow().len(), 1);
    assert!(game.launch().is_none());
}

#[test]
fn drop_releases_timers() {
    let (sched, _rec, game) = game(900, 4);
    game.launch();
    sched.advance_by(3_000);
    assert_eq!(sched.pending(), 1);
    drop(game);
    assert_eq!(sched.pending(), 0);
}
