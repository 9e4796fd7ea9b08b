//! Sound effects
//!
//! On the web the effects are synthesized with the Web Audio API, so there
//! are no files to load. Playback is fire-and-forget: a missing or broken
//! audio device degrades to silence and never reaches gameplay.

use crate::sim::{CountdownStep, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clip {
    /// Bird flaps
    Flap,
    /// Pipe passed
    Score,
    /// Bird crashed
    Hit,
    /// Local best beaten
    NewBest,
    /// 3, 2, 1
    CountdownBeep,
    /// GO!
    Go,
}

impl Clip {
    /// Which clip, if any, accompanies an engine event
    pub fn for_event(event: &GameEvent) -> Option<Clip> {
        match event {
            GameEvent::Flap => Some(Clip::Flap),
            GameEvent::Scored(_) => Some(Clip::Score),
            GameEvent::Hit => Some(Clip::Hit),
            GameEvent::NewBest(_) => Some(Clip::NewBest),
            GameEvent::CountdownStep(CountdownStep::Go) => Some(Clip::Go),
            GameEvent::CountdownStep(_) => Some(Clip::CountdownBeep),
            _ => None,
        }
    }
}

/// Something that can play clips
pub trait AudioPlayer {
    /// Play a clip. Must not fail or block.
    fn play(&self, clip: Clip);

    /// Effective effects volume, 0.0 - 1.0 (0 when muted)
    fn set_volume(&mut self, volume: f32);
}

/// No audio device
#[derive(Debug, Default)]
pub struct Silent;

impl AudioPlayer for Silent {
    fn play(&self, clip: Clip) {
        log::trace!("(silent) {:?}", clip);
    }

    fn set_volume(&mut self, _volume: f32) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioPlayer, Clip};

    /// Web Audio synthesizer
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: 0.8,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        /// Create an oscillator with gain envelope
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

        /// Single tone with an exponential fade and optional pitch slide
        fn tone(
            &self,
            ctx: &AudioContext,
            vol: f32,
            from_hz: f32,
            to_hz: f32,
            secs: f64,
            osc_type: OscillatorType,
        ) {
            let Some((osc, gain)) = self.create_osc(ctx, from_hz, osc_type) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + secs)
                .ok();
            if to_hz != from_hz {
                osc.frequency().set_value_at_time(from_hz, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(to_hz, t + secs)
                    .ok();
            }

            osc.start().ok();
            osc.stop_with_when(t + secs + 0.02).ok();
        }
    }

    impl AudioPlayer for WebAudio {
        fn play(&self, clip: Clip) {
            let vol = self.volume;
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match clip {
                // Quick upward chirp
                Clip::Flap => self.tone(ctx, vol * 0.3, 300.0, 600.0, 0.08, OscillatorType::Triangle),
                // Bright ding
                Clip::Score => self.tone(ctx, vol * 0.25, 880.0, 880.0, 0.12, OscillatorType::Sine),
                // Low thud plus buzz
                Clip::Hit => {
                    self.tone(ctx, vol * 0.6, 160.0, 50.0, 0.25, OscillatorType::Sine);
                    self.tone(ctx, vol * 0.2, 90.0, 60.0, 0.2, OscillatorType::Sawtooth);
                }
                // Rising arpeggio
                Clip::NewBest => {
                    self.tone(ctx, vol * 0.3, 523.0, 1046.0, 0.3, OscillatorType::Square);
                }
                Clip::CountdownBeep => {
                    self.tone(ctx, vol * 0.25, 440.0, 440.0, 0.1, OscillatorType::Square)
                }
                Clip::Go => self.tone(ctx, vol * 0.3, 660.0, 990.0, 0.2, OscillatorType::Square),
            }
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }
}
