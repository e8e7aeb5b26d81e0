//! Firework and confetti particles
//!
//! Purely cosmetic. Velocities are in pixels per 60 Hz frame and are scaled
//! by the real frame time in `update`. The finale choreography is a list of
//! timed spawns released as the effect clock passes them.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::PlayField;
use crate::sim::state::CelebrationKind;

/// Nominal frame length the velocities are expressed in
const FRAME_MS: f32 = 1000.0 / 60.0;

/// Sparks per firework burst
pub const SPARKS_PER_BURST: usize = 24;

/// RGB tint for pulses and sparks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tint {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Tint {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Sequence playback highlight
    pub const REVEAL: Tint = Tint::rgb(255, 200, 120);
    /// Correct tap
    pub const CONFIRM: Tint = Tint::rgb(200, 220, 255);
    /// Small win celebration
    pub const WIN: Tint = Tint::rgb(255, 220, 200);
    /// Wrong tap flash
    pub const MISS: Tint = Tint::rgb(255, 80, 80);
    pub const FINALE_CORE: Tint = Tint::rgb(255, 240, 200);
    pub const FINALE_GOLD: Tint = Tint::rgb(255, 230, 160);
    pub const FINALE_ICE: Tint = Tint::rgb(200, 220, 255);
    pub const FINALE_LILAC: Tint = Tint::rgb(235, 200, 255);

    /// CSS color with the given alpha
    pub fn css(&self, alpha: f32) -> String {
        format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, alpha)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectKind {
    /// Expanding translucent disc
    Pulse { tint: Tint },
    /// Firework spark with light drag and gravity
    Spark { vel: Vec2, tint: Tint },
    /// Tumbling confetti square, heavier than a spark
    Confetti { vel: Vec2, hue: u16 },
}

/// One live particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effect {
    pub pos: Vec2,
    pub age_ms: f32,
    pub life_ms: f32,
    pub kind: EffectKind,
}

impl Effect {
    /// 1 when spawned, 0 at end of life
    pub fn fade(&self) -> f32 {
        (1.0 - self.age_ms / self.life_ms).max(0.0)
    }

    pub fn is_expired(&self) -> bool {
        self.age_ms >= self.life_ms
    }

    fn step(&mut self, dt_ms: f32) {
        self.age_ms += dt_ms;
        let frames = dt_ms / FRAME_MS;
        match &mut self.kind {
            EffectKind::Pulse { .. } => {}
            EffectKind::Spark { vel, .. } => {
                let drag = 0.985_f32.powf(frames);
                vel.x *= drag;
                vel.y = vel.y * drag + 0.03 * frames;
                self.pos += *vel * frames;
            }
            EffectKind::Confetti { vel, .. } => {
                let drag = 0.988_f32.powf(frames);
                vel.x *= drag;
                vel.y = vel.y * drag + 0.045 * frames;
                self.pos += *vel * frames;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Spawn {
    Burst { pos: Vec2, tint: Tint },
    Confetti { pos: Vec2, count: usize },
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    at_ms: f32,
    spawn: Spawn,
}

/// Particle system plus pending choreography
#[derive(Debug, Clone)]
pub struct Effects {
    effects: Vec<Effect>,
    pending: Vec<Pending>,
    clock_ms: f32,
    rng: Pcg32,
}

impl Default for Effects {
    fn default() -> Self {
        Self::new()
    }
}

impl Effects {
    pub fn new() -> Self {
        Self::with_rng(Pcg32::from_rng(&mut rand::rng()))
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed))
    }

    fn with_rng(rng: Pcg32) -> Self {
        Self {
            effects: Vec::new(),
            pending: Vec::new(),
            clock_ms: 0.0,
            rng,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Spawns still waiting on the clock
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
        self.pending.clear();
    }

    /// A lone pulse (used for the wrong-tap flash)
    pub fn pulse(&mut self, pos: Vec2, tint: Tint, life_ms: f32) {
        self.effects.push(Effect {
            pos,
            age_ms: 0.0,
            life_ms,
            kind: EffectKind::Pulse { tint },
        });
    }

    /// One pulse plus a ring of sparks
    pub fn burst(&mut self, pos: Vec2, tint: Tint) {
        self.pulse(pos, tint, 600.0);
        for _ in 0..SPARKS_PER_BURST {
            let angle = self.rng.random_range(0.0..TAU);
            let speed = self.rng.random_range(1.4..3.2);
            let life_ms = 700.0 + self.rng.random_range(0.0..500.0);
            self.effects.push(Effect {
                pos,
                age_ms: 0.0,
                life_ms,
                kind: EffectKind::Spark {
                    vel: Vec2::from_angle(angle) * speed,
                    tint,
                },
            });
        }
    }

    /// `count` confetti pieces thrown slightly upward
    pub fn confetti(&mut self, pos: Vec2, count: usize) {
        for _ in 0..count {
            let angle = self.rng.random_range(0.0..TAU);
            let speed = self.rng.random_range(2.0..4.0);
            let lift = self.rng.random_range(0.0..0.8);
            let hue = self.rng.random_range(0..360u16);
            let life_ms = 700.0 + self.rng.random_range(0.0..600.0);
            let vel = Vec2::from_angle(angle) * speed - Vec2::new(0.0, lift);
            self.effects.push(Effect {
                pos,
                age_ms: 0.0,
                life_ms,
                kind: EffectKind::Confetti { vel, hue },
            });
        }
    }

    /// React to a celebration from the round logic
    pub fn celebrate(&mut self, kind: CelebrationKind, origin: Vec2, field: &PlayField) {
        match kind {
            CelebrationKind::Small => self.burst(origin, Tint::WIN),
            CelebrationKind::Milestone | CelebrationKind::Finale => self.schedule_finale(field),
        }
    }

    /// Queue the big finale: a central barrage, scattered pairs, confetti
    /// volleys and a sweep of bursts across the top of the sky
    pub fn schedule_finale(&mut self, field: &PlayField) {
        let w = field.width.max(1.0);
        let h = field.height.max(1.0);
        let center = Vec2::new(w * 0.5, h * 0.4);

        for i in 0..5 {
            self.schedule(i as f32 * 120.0, Spawn::Burst {
                pos: center,
                tint: Tint::FINALE_CORE,
            });
        }
        for i in 0..6 {
            let at = i as f32 * 180.0;
            for tint in [Tint::FINALE_GOLD, Tint::FINALE_ICE] {
                let pos = self.random_point(40.0, w - 40.0, 40.0, h * 0.6);
                self.schedule(at, Spawn::Burst { pos, tint });
            }
        }
        for i in 0..8 {
            let pos = self.random_point(80.0, w - 80.0, h * 0.15, h * 0.5);
            self.schedule(200.0 + i as f32 * 140.0, Spawn::Confetti { pos, count: 160 });
        }
        for i in 0..=10 {
            let x = i as f32 / 10.0 * w;
            let y = h * 0.25 + self.rng.random_range(-30.0..=30.0);
            self.schedule(1400.0 + i as f32 * 120.0, Spawn::Burst {
                pos: Vec2::new(x, y),
                tint: Tint::FINALE_LILAC,
            });
        }
    }

    fn schedule(&mut self, delay_ms: f32, spawn: Spawn) {
        self.pending.push(Pending {
            at_ms: self.clock_ms + delay_ms,
            spawn,
        });
    }

    /// Uniform point in the box; collapses to the low edge when the box is empty
    fn random_point(&mut self, x0: f32, x1: f32, y0: f32, y1: f32) -> Vec2 {
        let x = if x1 > x0 { self.rng.random_range(x0..x1) } else { x0.max(0.0) };
        let y = if y1 > y0 { self.rng.random_range(y0..y1) } else { y0.max(0.0) };
        Vec2::new(x, y)
    }

    /// Advance every particle and release due spawns
    pub fn update(&mut self, dt_ms: f32) {
        if !dt_ms.is_finite() || dt_ms <= 0.0 {
            return;
        }
        self.clock_ms += dt_ms;

        let clock = self.clock_ms;
        let (due, waiting): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.at_ms <= clock);
        self.pending = waiting;
        for p in due {
            match p.spawn {
                Spawn::Burst { pos, tint } => self.burst(pos, tint),
                Spawn::Confetti { pos, count } => self.confetti(pos, count),
            }
        }

        for effect in &mut self.effects {
            effect.step(dt_ms);
        }
        self.effects.retain(|e| !e.is_expired());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_spawns_pulse_and_sparks() {
        let mut fx = Effects::seeded(3);
        fx.burst(Vec2::new(100.0, 100.0), Tint::REVEAL);
        assert_eq!(fx.len(), 1 + SPARKS_PER_BURST);
        let pulses = fx
            .iter()
            .filter(|e| matches!(e.kind, EffectKind::Pulse { .. }))
            .count();
        assert_eq!(pulses, 1);
    }

    #[test]
    fn test_effects_expire() {
        let mut fx = Effects::seeded(3);
        fx.burst(Vec2::ZERO, Tint::CONFIRM);
        fx.confetti(Vec2::ZERO, 10);
        fx.update(500.0);
        assert!(!fx.is_empty());
        for _ in 0..100 {
            fx.update(16.0);
        }
        assert!(fx.is_empty());
    }

    #[test]
    fn test_confetti_falls_under_gravity() {
        let mut fx = Effects::seeded(9);
        fx.confetti(Vec2::ZERO, 50);
        for _ in 0..30 {
            fx.update(FRAME_MS);
        }
        let mean_vy: f32 = fx
            .iter()
            .filter_map(|e| match e.kind {
                EffectKind::Confetti { vel, .. } => Some(vel.y),
                _ => None,
            })
            .sum::<f32>()
            / fx.len() as f32;
        assert!(mean_vy > 0.0);
    }

    #[test]
    fn test_finale_releases_over_time() {
        let mut fx = Effects::seeded(1);
        fx.schedule_finale(&PlayField::new(1280.0, 720.0));
        assert!(fx.is_empty());
        let total = fx.pending_len();
        assert_eq!(total, 5 + 12 + 8 + 11);

        fx.update(1.0);
        // Spawns at t=0: one core burst and two scattered ones
        assert_eq!(fx.pending_len(), total - 3);
        assert_eq!(fx.len(), 3 * (1 + SPARKS_PER_BURST));

        fx.update(3000.0);
        assert_eq!(fx.pending_len(), 0);
    }

    #[test]
    fn test_finale_on_tiny_field() {
        let mut fx = Effects::seeded(1);
        fx.schedule_finale(&PlayField::new(10.0, 10.0));
        fx.update(3000.0);
        assert_eq!(fx.pending_len(), 0);
    }

    #[test]
    fn test_small_celebration_is_single_burst() {
        let mut fx = Effects::seeded(2);
        fx.celebrate(
            CelebrationKind::Small,
            Vec2::new(5.0, 5.0),
            &PlayField::default(),
        );
        assert_eq!(fx.len(), 1 + SPARKS_PER_BURST);
        assert_eq!(fx.pending_len(), 0);
    }

    #[test]
    fn test_bad_dt_ignored() {
        let mut fx = Effects::seeded(2);
        fx.burst(Vec2::ZERO, Tint::WIN);
        fx.update(f32::NAN);
        fx.update(-1.0);
        assert!(fx.iter().all(|e| e.age_ms == 0.0));
    }

    #[test]
    fn test_tint_css() {
        assert_eq!(Tint::MISS.css(0.5), "rgba(255,80,80,0.500)");
    }
}
