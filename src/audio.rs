//! Audio system using Web Audio API
//!
//! Plays the core's `SoundEffect` intents as procedurally generated tones,
//! so the game ships without audio files.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::SoundEffect;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    sfx_volume: f32,
    music_volume: f32,
    /// Background drone, once started
    music: Option<(OscillatorNode, GainNode)>,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            sfx_volume: settings.effective_sfx_volume(),
            music_volume: settings.effective_music_volume(),
            music: None,
        }
    }

    /// Pick up volume/mute changes
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.sfx_volume = settings.effective_sfx_volume();
        self.music_volume = settings.effective_music_volume();
        if let (Some(ctx), Some((_, gain))) = (&self.ctx, &self.music) {
            gain.gain()
                .set_value_at_time(self.music_volume * 0.05, ctx.current_time())
                .ok();
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let Some(ctx) = self.ctx.clone() else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        if effect == SoundEffect::Background {
            self.start_music(&ctx);
            return;
        }

        let vol = self.sfx_volume;
        if vol <= 0.0 {
            return;
        }

        match effect {
            SoundEffect::LetsGo => self.play_notes(&ctx, vol, &[400.0, 600.0], 0.1, OscillatorType::Triangle),
            SoundEffect::Jump => self.play_jump(&ctx, vol),
            SoundEffect::Eat => self.play_notes(&ctx, vol, &[600.0, 800.0, 1000.0], 0.08, OscillatorType::Sine),
            SoundEffect::Ouch => self.play_ouch(&ctx, vol),
            SoundEffect::GameOver => {
                self.play_notes(&ctx, vol, &[400.0, 350.0, 300.0, 200.0], 0.2, OscillatorType::Sine)
            }
            SoundEffect::Win => self.play_notes(
                &ctx,
                vol,
                &[500.0, 600.0, 700.0, 800.0, 1000.0],
                0.08,
                OscillatorType::Triangle,
            ),
            SoundEffect::Clap => self.play_clap(&ctx, vol),
            SoundEffect::Background => {}
        }
    }

    // === Sound generators ===

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

    /// Short arpeggio, one note every `step` seconds
    fn play_notes(&self, ctx: &AudioContext, vol: f32, notes: &[f32], step: f64, osc_type: OscillatorType) {
        for (i, freq) in notes.iter().enumerate() {
            let delay = i as f64 * step;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, osc_type) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + step * 2.0)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + step * 2.5).ok();
            }
        }
    }

    /// Jump - boing up
    fn play_jump(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 250.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.15, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.25)
            .ok();
        osc.frequency().set_value_at_time(250.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(750.0, t + 0.2)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.3).ok();
    }

    /// Ouch - falling thud
    fn play_ouch(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.4, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.35)
            .ok();
        osc.frequency().set_value_at_time(300.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(60.0, t + 0.3)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.4).ok();
    }

    /// Clap - burst of short noisy hits
    fn play_clap(&self, ctx: &AudioContext, vol: f32) {
        for i in 0..6 {
            let t = ctx.current_time() + i as f64 * 0.12;
            if let Some((osc, gain)) = self.create_osc(ctx, 1800.0 + i as f32 * 130.0, OscillatorType::Square) {
                gain.gain().set_value_at_time(vol * 0.12, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.05)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.06).ok();
            }
        }
    }

    /// Background music - quiet looping drone, started once
    fn start_music(&mut self, ctx: &AudioContext) {
        if self.music.is_some() {
            return;
        }
        let Some((osc, gain)) = self.create_osc(ctx, 110.0, OscillatorType::Triangle) else {
            return;
        };
        gain.gain()
            .set_value_at_time(self.music_volume * 0.05, ctx.current_time())
            .ok();
        osc.start().ok();
        self.music = Some((osc, gain));
        log::info!("Background music started");
    }
}
