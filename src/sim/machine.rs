//! Sequence state machine
//!
//! ```text
//! idle -> showing -> input -> win  -> showing (next round) | victory
//!                          -> lose -> showing (same sequence)
//! ```
//!
//! Playback is a chain of timed reveals; the last one opens input. Taps are
//! only looked at during `input`, so playback and input never interleave.

use glam::Vec2;

use super::difficulty::{Difficulty, Timings};
use super::game::Game;
use super::hit::{grace_after_hit, is_hit};
use super::state::{FeedbackKind, GameEvent, Notice, Phase};
use super::timeline::Step;
use crate::consts::LEAD_IN_MS;

/// What a pointer submission did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// Not accepting input right now
    Ignored,
    /// Correct tap on `sequence[index]`
    Hit { index: usize, round_complete: bool },
    /// Wrong tap; the round will be replayed
    Miss,
}

impl Game {
    /// Play the current sequence from the start, then open input.
    ///
    /// Starts a new generation, so any continuation still pending from an
    /// earlier playback or settle delay is dropped.
    pub(crate) fn play_sequence(&mut self) {
        let generation = self.state.bump_generation();
        self.state.phase = Phase::Showing;
        self.state.input_index = 0;

        let timings = self.timings();
        let round = self.state.round;
        let endless = self.state.endless_on;
        self.state.notice(Notice::RoundStarted { round, endless });
        self.emit_round_state();

        log::debug!(
            "Showing round {} ({} targets, {}ms + {}ms)",
            round,
            self.state.sequence.len(),
            timings.show_ms,
            timings.gap_ms
        );
        self.timeline
            .schedule(LEAD_IN_MS, generation, Step::Reveal { index: 0, timings });
    }

    pub(crate) fn reveal_step(&mut self, index: usize, timings: Timings) {
        let Some(&target) = self.state.sequence.get(index) else {
            self.enter_input();
            return;
        };
        self.state.push_event(GameEvent::TargetRevealed { target });

        let generation = self.state.generation;
        let next = if index + 1 < self.state.sequence.len() {
            Step::Reveal {
                index: index + 1,
                timings,
            }
        } else {
            Step::EnterInput
        };
        self.timeline.schedule(timings.step_ms(), generation, next);
    }

    pub(crate) fn enter_input(&mut self) {
        self.state.phase = Phase::Input;
        self.emit_round_state();
    }

    /// Pointer down at canvas coordinates `(x, y)`
    pub fn submit_pointer(&mut self, x: f32, y: f32, timestamp_ms: f64) -> PointerOutcome {
        self.note_activity(timestamp_ms);
        if self.state.phase != Phase::Input {
            return PointerOutcome::Ignored;
        }
        let Some(&expected) = self.state.expected_target() else {
            return PointerOutcome::Ignored;
        };

        let hit = is_hit(
            Vec2::new(x, y),
            &expected,
            self.state.difficulty,
            self.state.round,
            self.state.hard_grace,
            self.is_touch,
        );

        if !hit {
            self.state.push_event(GameEvent::Feedback {
                kind: FeedbackKind::Miss,
            });
            self.on_lose();
            return PointerOutcome::Miss;
        }

        let index = self.state.input_index;
        self.state
            .push_event(GameEvent::TargetConfirmed { target: expected });
        self.state.push_event(GameEvent::Feedback {
            kind: FeedbackKind::Hit,
        });
        if self.state.difficulty == Difficulty::Hard {
            self.state.hard_grace = grace_after_hit(self.state.hard_grace);
        }
        self.state.input_index += 1;

        let round_complete = self.state.input_index == self.state.sequence.len();
        if round_complete {
            self.on_win();
        }
        PointerOutcome::Hit {
            index,
            round_complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::placement::PlayField;
    use crate::sim::rng::RngSource;

    fn started(difficulty: Difficulty) -> Game {
        let mut g = Game::new(difficulty, PlayField::default())
            .with_rng(RngSource::seeded(11))
            .with_fx_seed(11);
        g.start_game();
        g
    }

    /// Run the clock until input opens
    fn finish_playback(g: &mut Game) {
        for _ in 0..1000 {
            if g.phase() == Phase::Input {
                return;
            }
            g.advance(50.0);
        }
        panic!("playback never finished");
    }

    #[test]
    fn test_playback_reveals_in_order_then_opens_input() {
        let mut g = started(Difficulty::Normal);
        assert_eq!(g.phase(), Phase::Showing);
        g.drain_events();

        // Lead-in
        g.advance(299.0);
        assert!(g.drain_events().is_empty());
        g.advance(1.0);
        let events = g.drain_events();
        assert_eq!(
            events,
            vec![GameEvent::TargetRevealed {
                target: g.sequence()[0]
            }]
        );
        assert_eq!(g.phase(), Phase::Showing);

        // One reveal occupies show + gap
        let t = g.timings();
        g.advance((t.step_ms() - 1) as f64);
        assert_eq!(g.phase(), Phase::Showing);
        g.advance(1.0);
        assert_eq!(g.phase(), Phase::Input);
    }

    #[test]
    fn test_input_ignored_while_showing() {
        let mut g = started(Difficulty::Assist);
        let t = g.sequence()[0];
        let now = g.now_ms();
        assert_eq!(g.submit_pointer(t.x(), t.y(), now), PointerOutcome::Ignored);
        assert_eq!(g.input_index(), 0);
        assert_eq!(g.phase(), Phase::Showing);
    }

    #[test]
    fn test_correct_tap_advances_cursor() {
        let mut g = started(Difficulty::Assist);
        finish_playback(&mut g);
        g.drain_events();
        let t = g.sequence()[0];
        let now = g.now_ms();
        let outcome = g.submit_pointer(t.x() + 10.0, t.y() - 10.0, now);
        assert_eq!(
            outcome,
            PointerOutcome::Hit {
                index: 0,
                round_complete: true
            }
        );
        assert_eq!(g.phase(), Phase::Win);
        let events = g.drain_events();
        assert!(events.contains(&GameEvent::TargetConfirmed { target: t }));
        assert!(events.contains(&GameEvent::Feedback {
            kind: FeedbackKind::Hit
        }));
    }

    #[test]
    fn test_wrong_tap_loses() {
        let mut g = started(Difficulty::Normal);
        finish_playback(&mut g);
        let t = g.sequence()[0];
        let now = g.now_ms();
        let outcome = g.submit_pointer(t.x() + 200.0, t.y(), now);
        assert_eq!(outcome, PointerOutcome::Miss);
        assert_eq!(g.phase(), Phase::Lose);
        assert_eq!(g.sequence().len(), 1);
    }

    #[test]
    fn test_hard_hit_shrinks_grace() {
        let mut g = started(Difficulty::Hard);
        finish_playback(&mut g);
        g.state.hard_grace = 2.0;
        let t = g.sequence()[0];
        let now = g.now_ms();
        g.submit_pointer(t.x(), t.y(), now);
        assert_eq!(g.state.hard_grace, 1.5);
    }

    #[test]
    fn test_touch_widens_hits() {
        let mut g = started(Difficulty::Hard).with_touch(true);
        finish_playback(&mut g);
        let t = g.sequence()[0];
        let now = g.now_ms();
        // 50px is outside 44 but inside 44 * 1.2
        let outcome = g.submit_pointer(t.x() + 50.0, t.y(), now);
        assert!(matches!(outcome, PointerOutcome::Hit { .. }));
    }

    #[test]
    fn test_activity_timestamp_recorded_even_when_ignored() {
        let mut g = started(Difficulty::Hard);
        g.submit_pointer(0.0, 0.0, 1234.0);
        assert_eq!(g.state.last_action_ms, 1234.0);
    }
}
