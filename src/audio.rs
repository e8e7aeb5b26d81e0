//! Target tones using the Web Audio API
//!
//! Each target carries one of four notes (C4 E4 G4 B4). Tones are short sine
//! blips with an exponential attack and decay, generated on the fly.

use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

/// Note frequencies in Hz, indexed by `Target::tone`
pub const NOTES: [f32; 4] = [261.63, 329.63, 392.00, 493.88];

/// Default tone length in seconds
const TONE_SECS: f64 = 0.18;
const PEAK_GAIN: f32 = 0.22;
const FLOOR_GAIN: f32 = 0.0001;

/// Tone player
pub struct ToneSynth {
    ctx: Option<AudioContext>,
    enabled: bool,
}

impl ToneSynth {
    pub fn new(enabled: bool) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - tones disabled");
        }
        Self { ctx, enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Flip sound on/off, returns the new state
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }

    /// Resume the context (browsers require a user gesture first)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }
    }

    /// Play the note for a target tone index
    pub fn play_tone(&self, tone: u8) {
        if !self.enabled {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        self.resume();

        let freq = NOTES[tone as usize % NOTES.len()];
        let Some((osc, gain)) = self.create_osc(ctx, freq) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(FLOOR_GAIN, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(PEAK_GAIN, t + 0.01)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(FLOOR_GAIN, t + TONE_SECS)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + TONE_SECS + 0.02).ok();
    }

    fn create_osc(&self, ctx: &AudioContext, freq: f32) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }
}
