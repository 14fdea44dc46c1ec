//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects, no external files needed.
//! Each effect is a short sequence of oscillator notes.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Run started
    Start,
    /// Level increased
    LevelUp,
    /// Hit by a fist
    GameOver,
    /// Run beat the stored best
    NewRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
}

/// One oscillator burst
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub freq: f32,
    /// Seconds after the effect starts
    pub delay: f64,
    /// Seconds until the gain has decayed
    pub duration: f64,
    pub gain: f32,
    pub wave: Waveform,
}

const fn note(freq: f32, delay: f64, duration: f64, gain: f32, wave: Waveform) -> Note {
    Note {
        freq,
        delay,
        duration,
        gain,
        wave,
    }
}

const START: [Note; 2] = [
    note(300.0, 0.0, 0.12, 0.3, Waveform::Triangle),
    note(600.0, 0.1, 0.15, 0.3, Waveform::Triangle),
];

const LEVEL_UP: [Note; 4] = [
    note(400.0, 0.0, 0.3, 0.3, Waveform::Triangle),
    note(500.0, 0.1, 0.3, 0.3, Waveform::Triangle),
    note(600.0, 0.2, 0.3, 0.3, Waveform::Triangle),
    note(800.0, 0.3, 0.4, 0.3, Waveform::Triangle),
];

const GAME_OVER: [Note; 4] = [
    note(400.0, 0.0, 0.3, 0.3, Waveform::Sine),
    note(350.0, 0.2, 0.3, 0.3, Waveform::Sine),
    note(300.0, 0.4, 0.3, 0.3, Waveform::Sine),
    note(200.0, 0.6, 0.4, 0.3, Waveform::Square),
];

const NEW_RECORD: [Note; 5] = [
    note(500.0, 0.0, 0.25, 0.25, Waveform::Triangle),
    note(600.0, 0.08, 0.25, 0.25, Waveform::Triangle),
    note(700.0, 0.16, 0.25, 0.25, Waveform::Triangle),
    note(800.0, 0.24, 0.25, 0.25, Waveform::Triangle),
    note(1000.0, 0.32, 0.35, 0.25, Waveform::Triangle),
];

impl SoundEffect {
    pub fn notes(self) -> &'static [Note] {
        match self {
            SoundEffect::Start => &START,
            SoundEffect::LevelUp => &LEVEL_UP,
            SoundEffect::GameOver => &GAME_OVER,
            SoundEffect::NewRecord => &NEW_RECORD,
        }
    }

    /// Seconds until the last note has finished
    pub fn length(self) -> f64 {
        self.notes()
            .iter()
            .map(|n| n.delay + n.duration)
            .fold(0.0, f64::max)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{Note, SoundEffect, Waveform};

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                muted: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        pub fn play(&self, effect: SoundEffect) {
            if self.muted || self.master_volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for note in effect.notes() {
                self.play_note(ctx, note);
            }
        }

        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_note(&self, ctx: &AudioContext, note: &Note) {
            let osc_type = match note.wave {
                Waveform::Sine => OscillatorType::Sine,
                Waveform::Triangle => OscillatorType::Triangle,
                Waveform::Square => OscillatorType::Square,
            };
            let Some((osc, gain)) = self.create_osc(ctx, note.freq, osc_type) else {
                return;
            };
            let t = ctx.current_time() + note.delay;

            gain.gain()
                .set_value_at_time(self.master_volume * note.gain, t)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + note.duration)
                .ok();

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + note.duration + 0.05).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_effect_has_audible_notes() {
        for effect in [
            SoundEffect::Start,
            SoundEffect::LevelUp,
            SoundEffect::GameOver,
            SoundEffect::NewRecord,
        ] {
            let notes = effect.notes();
            assert!(!notes.is_empty());
            assert!(notes.iter().all(|n| n.freq > 0.0 && n.gain > 0.0 && n.gain <= 1.0));
            assert!(effect.length() > 0.0);
        }
    }

    #[test]
    fn test_game_over_descends() {
        let freqs: Vec<f32> = SoundEffect::GameOver.notes().iter().map(|n| n.freq).collect();
        assert!(freqs.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_effect_length() {
        assert!((SoundEffect::LevelUp.length() - 0.7).abs() < 1e-9);
    }
}
