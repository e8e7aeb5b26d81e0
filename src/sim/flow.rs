//! Round flow controller
//!
//! Decides what happens after each round: next round, endless continuation
//! (with milestones every 10 rounds), the victory finale, or a retry of the
//! same sequence after a wrong tap. Also owns game start/reset, replay
//! requests and the mode toggles.

use thiserror::Error;

use super::difficulty::{Difficulty, ReplayPolicy};
use super::game::Game;
use super::hit::grace_after_miss;
use super::rng::RngSource;
use super::state::{CelebrationKind, FeedbackKind, GameEvent, Notice, Phase};
use super::timeline::Step;
use crate::consts::*;

/// Why a replay request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("Replay is only available while it's your turn")]
    NotAcceptingInput,
    #[error("Replay already used this round")]
    AlreadyUsed,
    #[error("Replay is disabled on Hard")]
    Disabled,
}

impl Game {
    /// Start round 1 with a single fresh target (intro path)
    pub fn start_game(&mut self) {
        self.start_round(1);
    }

    /// Start at `round` with that many fresh targets. Round 0 is treated as 1.
    pub fn start_round(&mut self, round: u32) {
        self.state.reset_progress();
        for r in 1..=round.max(1) {
            self.state.round = r;
            let target = self.place_next_target();
            self.state.sequence.push(target);
        }
        log::info!(
            "Game started at round {} ({}, daily seed {:?})",
            self.state.round,
            self.state.difficulty.as_str(),
            self.rng.daily_seed()
        );
        self.play_sequence();
    }

    /// Immediate restart from any phase (play-again path)
    pub fn start_new_game(&mut self) {
        self.state.bump_generation();
        self.state.phase = Phase::Idle;
        self.state.reset_progress();
        self.emit_round_state();
        self.start_game();
    }

    /// Back to idle; pending continuations are cancelled
    pub fn reset_game(&mut self) {
        self.state.bump_generation();
        self.state.reset_progress();
        self.state.phase = Phase::Idle;
        log::info!("Game reset");
        self.emit_round_state();
    }

    /// The player reproduced the whole sequence
    pub(crate) fn on_win(&mut self) {
        let generation = self.state.generation;
        self.state.phase = Phase::Win;
        self.state.notice(Notice::RoundComplete {
            round: self.state.round,
        });
        self.state.push_event(GameEvent::Feedback {
            kind: FeedbackKind::Win,
        });
        self.emit_round_state();

        let origin = self.small_burst_origin();
        self.celebrate(CelebrationKind::Small, origin);
        self.timeline.schedule(SMALL_BURST_STAGGER_MS, generation, Step::SmallBurst);
        self.timeline.schedule(SMALL_BURST_STAGGER_MS * 2, generation, Step::SmallBurst);
        self.timeline.schedule(WIN_SETTLE_MS, generation, Step::WinSettled);
    }

    pub(crate) fn win_settled(&mut self) {
        let round = self.state.round;
        if round < STANDARD_ROUNDS {
            self.next_round(false);
            return;
        }

        if !self.state.endless_active() {
            self.victory();
            return;
        }

        if round % MILESTONE_EVERY == 0 {
            log::info!("Endless milestone at round {}", round);
            let origin = self.finale_origin();
            self.celebrate(CelebrationKind::Milestone, origin);
            let generation = self.state.generation;
            self.timeline.schedule(FINALE_MS, generation, Step::MilestoneDone);
        } else {
            self.next_round(true);
        }
    }

    pub(crate) fn milestone_done(&mut self) {
        self.state.notice(Notice::EndlessMilestone {
            round: self.state.round,
        });
        self.next_round(true);
    }

    /// Append one target and replay after a short pause
    fn next_round(&mut self, endless: bool) {
        self.state.round += 1;
        let round = self.state.round;

        if endless && self.best.record(round) {
            self.best.save();
            log::info!("New endless best: {}", round);
            self.state.notice(Notice::NewEndlessBest { best: round });
        }

        self.state.replay_used = false;
        self.state.hard_blink_count = 0;
        let target = self.place_next_target();
        self.state.sequence.push(target);
        log::info!("Advancing to round {}", round);
        self.emit_round_state();

        let generation = self.state.generation;
        self.timeline.schedule(NEXT_ROUND_PAUSE_MS, generation, Step::PlayNextRound);
    }

    fn victory(&mut self) {
        log::info!("Victory after {} rounds", self.state.round);
        self.state.phase = Phase::Victory;
        let origin = self.finale_origin();
        self.celebrate(CelebrationKind::Finale, origin);
        self.emit_round_state();
        let generation = self.state.generation;
        self.timeline.schedule(FINALE_MS, generation, Step::VictoryShown);
    }

    pub(crate) fn victory_shown(&mut self) {
        self.state.notice(Notice::VictoryShown);
    }

    /// A wrong tap: settle, then replay the same sequence
    pub(crate) fn on_lose(&mut self) {
        let generation = self.state.generation;
        self.state.phase = Phase::Lose;
        self.state.push_event(GameEvent::Feedback {
            kind: FeedbackKind::Lose,
        });
        self.state.notice(Notice::WrongTryAgain);
        if self.state.difficulty == Difficulty::Hard {
            self.state.hard_grace = grace_after_miss(self.state.hard_grace);
        }
        log::info!(
            "Missed at step {} of round {}",
            self.state.input_index + 1,
            self.state.round
        );
        self.emit_round_state();
        self.timeline.schedule(LOSE_SETTLE_MS, generation, Step::LoseSettled);
    }

    pub(crate) fn lose_settled(&mut self) {
        self.state.input_index = 0;
        self.state.replay_used = false;
        self.state.hard_blink_count = 0;
        self.play_sequence();
    }

    /// Replay the current sequence (Assist: unlimited, Normal: once per round,
    /// Hard: never). A refusal leaves the round untouched.
    ///
    /// Activity is not recorded here; callers stamp it with their own clock
    /// through `note_activity`.
    pub fn request_replay(&mut self) -> Result<(), ReplayError> {
        let policy = self.state.difficulty.replay_policy();
        if policy == ReplayPolicy::Disabled {
            return Err(ReplayError::Disabled);
        }
        if self.state.phase != Phase::Input {
            return Err(self.refuse_replay(ReplayError::NotAcceptingInput));
        }
        if policy == ReplayPolicy::OncePerRound {
            if self.state.replay_used {
                return Err(self.refuse_replay(ReplayError::AlreadyUsed));
            }
            self.state.replay_used = true;
        }

        self.state.notice(Notice::Replaying);
        self.play_sequence();
        Ok(())
    }

    fn refuse_replay(&mut self, err: ReplayError) -> ReplayError {
        log::debug!("Replay refused: {}", err);
        self.state.notice(Notice::ReplayRefused(err));
        err
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.state.difficulty = difficulty;
        self.state.notice(Notice::DifficultyChanged(difficulty));
        self.emit_round_state();
    }

    /// Assist -> Normal -> Hard -> Assist
    pub fn cycle_difficulty(&mut self) -> Difficulty {
        let next = self.state.difficulty.next();
        self.set_difficulty(next);
        next
    }

    /// Flip the visible Endless toggle. Turning it on also sets the sticky
    /// lock, which keeps rounds past 10 in endless accounting for the rest of
    /// the session even if the toggle is later turned off.
    pub fn toggle_endless(&mut self) -> bool {
        let on = !self.state.endless_on;
        self.state.endless_on = on;
        if on {
            self.state.endless_lock = true;
        }
        self.state.notice(Notice::EndlessToggled { on });
        self.emit_round_state();
        on
    }

    /// Flip Daily mode. Targets already placed stay; the next placement draws
    /// from the day's stream (restarted) or from a fresh entropy stream.
    pub fn toggle_daily(&mut self) -> bool {
        let on = !self.state.daily_on;
        self.state.daily_on = on;
        self.reseed();
        self.state.notice(Notice::DailyToggled { on });
        self.emit_round_state();
        on
    }

    /// Pin the calendar date used for the daily seed
    pub fn set_daily_date(&mut self, year: i32, month: u32, day: u32) {
        self.daily_date = Some((year, month, day));
        if self.state.daily_on {
            self.reseed();
        }
    }

    fn reseed(&mut self) {
        self.rng = if self.state.daily_on {
            let seed = self.daily_seed();
            log::info!("Daily challenge seed {}", seed);
            RngSource::daily(seed)
        } else {
            RngSource::entropy()
        };
    }
}
