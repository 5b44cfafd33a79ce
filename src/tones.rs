//! Procedural sound effects for the altitude game.
//!
//! Sounds are plain tone lists; [`WebAudioPlayer`] turns them into oscillator
//! nodes. Audio is best-effort: failures are logged and never reach the game.

use std::cell::RefCell;

use wasm_bindgen::JsValue;
use web_sys::{AudioContext, OscillatorType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
}

impl From<Waveform> for OscillatorType {
    fn from(w: Waveform) -> Self {
        match w {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Triangle => OscillatorType::Triangle,
        }
    }
}

/// One note, relative to the start of its sound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub start_offset_ms: u32,
    pub duration_ms: u32,
    pub waveform: Waveform,
    /// Initial gain; every tone fades out exponentially over its duration.
    pub gain: f32,
}

impl Tone {
    pub fn end_ms(&self) -> u32 {
        self.start_offset_ms + self.duration_ms
    }
}

const fn tone(frequency_hz: f32, start_offset_ms: u32, duration_ms: u32, waveform: Waveform, gain: f32) -> Tone {
    Tone {
        frequency_hz,
        start_offset_ms,
        duration_ms,
        waveform,
        gain,
    }
}

/// Rising C-E-G arpeggio played on launch.
pub static LEVEL_UP: [Tone; 3] = [
    tone(523.0, 0, 100, Waveform::Sine, 0.3),
    tone(659.0, 100, 100, Waveform::Sine, 0.3),
    tone(784.0, 200, 300, Waveform::Sine, 0.3),
];

/// C-E-G-C fanfare played per achievement.
pub static CELEBRATION: [Tone; 4] = [
    tone(523.0, 0, 300, Waveform::Triangle, 0.2),
    tone(659.0, 150, 300, Waveform::Triangle, 0.2),
    tone(784.0, 300, 300, Waveform::Triangle, 0.2),
    tone(1047.0, 450, 300, Waveform::Triangle, 0.2),
];

/// Level every tone decays to by its end.
const FADE_FLOOR: f32 = 0.01;

pub trait TonePlayer {
    fn play(&self, tones: &[Tone]);
}

/// Plays nothing. Used where no audio is wanted (and in tests).
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl TonePlayer for Silent {
    fn play(&self, _tones: &[Tone]) {}
}

/// Web Audio backend. The `AudioContext` is created on first use, since
/// browsers only allow it after a user gesture.
#[derive(Default)]
pub struct WebAudioPlayer {
    context: RefCell<Option<AudioContext>>,
}

impl std::fmt::Debug for WebAudioPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebAudioPlayer")
            .field("started", &self.context.borrow().is_some())
            .finish()
    }
}

impl WebAudioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn try_play(&self, tones: &[Tone]) -> Result<(), JsValue> {
        let mut slot = self.context.borrow_mut();
        let context = match slot.as_ref() {
            Some(context) => context.clone(),
            None => {
                let context = AudioContext::new()?;
                *slot = Some(context.clone());
                context
            }
        };
        drop(slot);

        let origin = context.current_time();
        for t in tones {
            let oscillator = context.create_oscillator()?;
            let gain = context.create_gain()?;
            oscillator.connect_with_audio_node(&gain)?;
            gain.connect_with_audio_node(&context.destination())?;

            let start = origin + f64::from(t.start_offset_ms) / 1000.0;
            let end = origin + f64::from(t.end_ms()) / 1000.0;
            oscillator.set_type(t.waveform.into());
            oscillator.frequency().set_value_at_time(t.frequency_hz, start)?;
            gain.gain().set_value_at_time(t.gain, start)?;
            gain.gain().exponential_ramp_to_value_at_time(FADE_FLOOR, end)?;
            oscillator.start_with_when(start)?;
            oscillator.stop_with_when(end)?;
        }
        Ok(())
    }
}

impl TonePlayer for WebAudioPlayer {
    fn play(&self, tones: &[Tone]) {
        if let Err(err) = self.try_play(tones) {
            log::warn!("audio playback unavailable: {err:?}");
        }
    }
}
