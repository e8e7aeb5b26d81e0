//! The game object: round state plus everything the round logic needs
//!
//! `Game` owns the state, the placement RNG, the timeline of pending
//! continuations and the persisted Endless best. The sequence state machine
//! (`machine.rs`) and the round flow controller (`flow.rs`) extend it with
//! their own `impl` blocks.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::difficulty::{Difficulty, HintStyle, ReplayPolicy, Timings};
use super::placement::{PlayField, place_target};
use super::rng::{RngSource, daily_seed};
use super::state::{CelebrationKind, GameEvent, GameState, HudFlags, Phase, Target};
use super::timeline::{Step, Timeline};
use crate::consts::*;
use crate::endless_best::EndlessBest;
use crate::platform;
use crate::settings::Settings;

/// A running game session
#[derive(Debug, Clone)]
pub struct Game {
    pub state: GameState,
    /// Placement stream (daily or entropy)
    pub(crate) rng: RngSource,
    /// Cosmetic randomness; never touches the placement stream
    pub(crate) fx_rng: Pcg32,
    pub(crate) timeline: Timeline,
    pub(crate) best: EndlessBest,
    pub(crate) field: PlayField,
    pub(crate) is_touch: bool,
    /// Fixed calendar date for the daily seed (otherwise today's UTC date)
    pub(crate) daily_date: Option<(i32, u32, u32)>,
}

impl Game {
    /// New idle game with an entropy placement stream
    pub fn new(difficulty: Difficulty, field: PlayField) -> Self {
        Self {
            state: GameState::new(difficulty),
            rng: RngSource::entropy(),
            fx_rng: Pcg32::from_rng(&mut rand::rng()),
            timeline: Timeline::new(),
            best: EndlessBest::new(),
            field,
            is_touch: false,
            daily_date: None,
        }
    }

    /// New idle game configured from startup settings
    pub fn from_settings(settings: &Settings, field: PlayField, best: EndlessBest) -> Self {
        let mut game = Self::new(settings.difficulty, field).with_best(best);
        game.is_touch = settings.touch.unwrap_or_else(platform::is_touch_device);
        if settings.endless {
            game.state.endless_on = true;
            game.state.endless_lock = true;
        }
        if settings.daily {
            game.state.daily_on = true;
            game.rng = RngSource::daily(game.daily_seed());
        }
        game
    }

    /// Replace the placement stream
    pub fn with_rng(mut self, rng: RngSource) -> Self {
        self.rng = rng;
        self
    }

    /// Seed cosmetic randomness (celebration origins, blink gating)
    pub fn with_fx_seed(mut self, seed: u64) -> Self {
        self.fx_rng = Pcg32::seed_from_u64(seed);
        self
    }

    pub fn with_best(mut self, best: EndlessBest) -> Self {
        self.best = best;
        self
    }

    pub fn with_touch(mut self, is_touch: bool) -> Self {
        self.is_touch = is_touch;
        self
    }

    /// Advance the clock by `dt_ms` and run every continuation that falls due
    pub fn advance(&mut self, dt_ms: f64) {
        self.timeline.advance_clock(dt_ms);
        while let Some((generation, step)) = self.timeline.pop_due() {
            if generation != self.state.generation {
                log::debug!(
                    "Dropping stale {:?} (generation {} != {})",
                    step,
                    generation,
                    self.state.generation
                );
                continue;
            }
            self.run_step(step);
        }
    }

    fn run_step(&mut self, step: Step) {
        match step {
            Step::Reveal { index, timings } => self.reveal_step(index, timings),
            Step::EnterInput => self.enter_input(),
            Step::SmallBurst => {
                let origin = self.small_burst_origin();
                self.celebrate(CelebrationKind::Small, origin);
            }
            Step::WinSettled => self.win_settled(),
            Step::MilestoneDone => self.milestone_done(),
            Step::PlayNextRound => self.play_sequence(),
            Step::LoseSettled => self.lose_settled(),
            Step::VictoryShown => self.victory_shown(),
        }
    }

    /// Take all pending notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.events)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn round(&self) -> u32 {
        self.state.round
    }

    pub fn sequence(&self) -> &[Target] {
        &self.state.sequence
    }

    pub fn input_index(&self) -> usize {
        self.state.input_index
    }

    pub fn field(&self) -> PlayField {
        self.field
    }

    pub fn endless_best(&self) -> u32 {
        self.best.get()
    }

    pub fn is_touch(&self) -> bool {
        self.is_touch
    }

    pub fn now_ms(&self) -> f64 {
        self.timeline.now_ms()
    }

    /// Number of continuations waiting on the clock (stale ones included)
    pub fn pending_steps(&self) -> usize {
        self.timeline.len()
    }

    /// Seed of the active daily stream
    pub fn daily_seed_in_use(&self) -> Option<u32> {
        self.rng.daily_seed()
    }

    /// Playback timing for the current round
    pub fn timings(&self) -> Timings {
        self.state
            .difficulty
            .timings(self.state.round, self.state.endless_on)
    }

    /// Current hit radius before grace and touch adjustments
    pub fn tolerance(&self) -> f32 {
        self.state.difficulty.tolerance(self.state.round)
    }

    pub fn hint_style(&self) -> HintStyle {
        self.state.difficulty.hint_style()
    }

    /// Targets still to tap, while input is open
    pub fn pending_targets(&self) -> &[Target] {
        if self.state.phase == Phase::Input {
            self.state.pending_targets()
        } else {
            &[]
        }
    }

    /// Whether a replay request would currently be honoured (ignoring phase)
    pub fn replay_available(&self) -> bool {
        match self.state.difficulty.replay_policy() {
            ReplayPolicy::Unlimited => true,
            ReplayPolicy::OncePerRound => !self.state.replay_used,
            ReplayPolicy::Disabled => false,
        }
    }

    pub fn hud_flags(&self) -> HudFlags {
        HudFlags {
            difficulty: self.state.difficulty,
            endless_on: self.state.endless_on,
            daily_on: self.state.daily_on,
            endless_best: self.best.get(),
            replay_available: self.replay_available(),
        }
    }

    /// Record player activity (pointer, key, replay) for idle detection
    pub fn note_activity(&mut self, timestamp_ms: f64) {
        self.state.last_action_ms = timestamp_ms;
    }

    /// Faint blink on the next target for a stuck Hard-mode player.
    ///
    /// Only after a stumble or a used replay, after a stretch of inactivity,
    /// inside a short window of a slow cycle, at most twice per round, and not
    /// every time the window comes around.
    pub fn hard_blink(&mut self, now_ms: f64) -> Option<Target> {
        let s = &self.state;
        if s.phase != Phase::Input || s.difficulty != Difficulty::Hard {
            return None;
        }
        let target = *s.expected_target()?;
        if s.hard_grace <= 0.0 && !s.replay_used {
            return None;
        }
        if now_ms - s.last_action_ms < HARD_BLINK_IDLE_MS {
            return None;
        }
        if s.hard_blink_count >= HARD_BLINK_MAX_PER_ROUND {
            return None;
        }
        if now_ms.rem_euclid(HARD_BLINK_CYCLE_MS) > HARD_BLINK_WINDOW_MS {
            return None;
        }
        if self.fx_rng.random::<f64>() > HARD_BLINK_CHANCE {
            return None;
        }
        self.state.hard_blink_count += 1;
        Some(target)
    }

    /// Canvas resized; affects targets placed from now on
    pub fn resize(&mut self, field: PlayField) {
        self.field = field;
    }

    /// Place one more target, spaced for the current round
    pub(crate) fn place_next_target(&mut self) -> Target {
        let min_dist = self.state.difficulty.min_target_distance(self.state.round);
        place_target(&self.state.sequence, min_dist, &self.field, &mut self.rng)
    }

    pub(crate) fn daily_seed(&self) -> u32 {
        let (y, m, d) = self.daily_date.unwrap_or_else(platform::utc_today);
        daily_seed(y, m, d)
    }

    pub(crate) fn emit_round_state(&mut self) {
        let flags = self.hud_flags();
        self.state.push_event(GameEvent::RoundStateChanged {
            phase: self.state.phase,
            round: self.state.round,
            flags,
        });
    }

    pub(crate) fn celebrate(&mut self, kind: CelebrationKind, origin: Vec2) {
        self.state
            .push_event(GameEvent::Celebration { kind, origin });
    }

    /// Random point in the middle band of the sky
    pub(crate) fn small_burst_origin(&mut self) -> Vec2 {
        let w = self.field.width;
        let h = self.field.height;
        Vec2::new(
            self.fx_rng.random_range(w * 0.3..=w * 0.7),
            self.fx_rng.random_range(h * 0.2..=h * 0.5),
        )
    }

    /// Anchor for finale and milestone choreography
    pub(crate) fn finale_origin(&self) -> Vec2 {
        Vec2::new(self.field.width * 0.5, self.field.height * 0.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game::new(Difficulty::Hard, PlayField::default())
            .with_rng(RngSource::seeded(1))
            .with_fx_seed(1)
    }

    #[test]
    fn test_new_game_is_idle_and_quiet() {
        let mut g = game();
        assert_eq!(g.phase(), Phase::Idle);
        g.advance(10_000.0);
        assert!(g.drain_events().is_empty());
        assert_eq!(g.pending_steps(), 0);
    }

    #[test]
    fn test_from_settings_applies_toggles() {
        let settings = Settings {
            endless: true,
            daily: true,
            touch: Some(true),
            ..Settings::default()
        };
        let mut g = Game::new(Difficulty::Assist, PlayField::default());
        g.daily_date = Some((2024, 3, 5));
        assert_eq!(g.daily_seed(), 20_240_305);

        let g = Game::from_settings(&settings, PlayField::default(), EndlessBest::with_value(4));
        assert!(g.state.endless_on && g.state.endless_lock);
        assert!(g.state.daily_on);
        assert!(g.daily_seed_in_use().is_some());
        assert!(g.is_touch());
        assert_eq!(g.endless_best(), 4);
    }

    #[test]
    fn test_replay_availability_by_difficulty() {
        let mut g = game();
        assert!(!g.replay_available());
        g.state.difficulty = Difficulty::Assist;
        g.state.replay_used = true;
        assert!(g.replay_available());
        g.state.difficulty = Difficulty::Normal;
        assert!(!g.replay_available());
        g.state.replay_used = false;
        assert!(g.replay_available());
    }

    #[test]
    fn test_hard_blink_rules() {
        let mut g = game();
        g.state.phase = Phase::Input;
        g.state.sequence = vec![Target::new(300.0, 300.0, 2)];
        g.state.last_action_ms = 0.0;

        // No stumble yet
        assert!(g.hard_blink(3200.0 * 2.0).is_none());

        g.state.hard_grace = 1.0;
        // Too soon after activity
        assert!(g.hard_blink(1000.0).is_none());
        // Outside the blink window
        assert!(g.hard_blink(3200.0 * 2.0 + 500.0).is_none());

        // Inside the window the roll passes often enough; cap at two per round
        let mut shown = 0;
        for cycle in 1..200 {
            if g.hard_blink(3200.0 * cycle as f64).is_some() {
                shown += 1;
            }
        }
        assert_eq!(shown, HARD_BLINK_MAX_PER_ROUND);
        assert_eq!(g.state.hard_blink_count, HARD_BLINK_MAX_PER_ROUND);
    }

    #[test]
    fn test_hard_blink_only_on_hard() {
        let mut g = game();
        g.state.difficulty = Difficulty::Normal;
        g.state.phase = Phase::Input;
        g.state.sequence = vec![Target::new(300.0, 300.0, 2)];
        g.state.hard_grace = 2.0;
        for cycle in 1..50 {
            assert!(g.hard_blink(3200.0 * cycle as f64).is_none());
        }
    }

    #[test]
    fn test_small_burst_origin_in_band() {
        let mut g = game();
        for _ in 0..100 {
            let o = g.small_burst_origin();
            assert!(o.x >= 1280.0 * 0.3 && o.x <= 1280.0 * 0.7);
            assert!(o.y >= 720.0 * 0.2 && o.y <= 720.0 * 0.5);
        }
    }
}
