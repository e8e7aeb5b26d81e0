//! Game state and core round types
//!
//! Everything the round logic mutates lives in `GameState`. Presentation only
//! reads it and drains the `GameEvent` queue.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::flow::ReplayError;

/// Current phase of the round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Phase {
    /// No active round (boot, after a reset)
    #[default]
    Idle,
    /// Sequence playback; input is ignored
    Showing,
    /// Waiting for the player to tap the sequence back
    Input,
    /// Round completed, settling before the next one
    Win,
    /// Wrong tap, settling before the retry
    Lose,
    /// Standard 10-round game cleared
    Victory,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Showing => "showing",
            Phase::Input => "input",
            Phase::Win => "win",
            Phase::Lose => "lose",
            Phase::Victory => "victory",
        }
    }
}

/// A point on the sky with the tone it plays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub pos: Vec2,
    /// Index into the four-note scale, in [0, 4)
    pub tone: u8,
}

impl Target {
    pub fn new(x: f32, y: f32, tone: u8) -> Self {
        Self {
            pos: Vec2::new(x, y),
            tone,
        }
    }

    pub fn x(&self) -> f32 {
        self.pos.x
    }

    pub fn y(&self) -> f32 {
        self.pos.y
    }
}

/// Celebration sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CelebrationKind {
    /// A few bursts after each cleared round
    Small,
    /// Endless round 10, 20, 30, ...
    Milestone,
    /// Standard game cleared
    Finale,
}

impl CelebrationKind {
    /// Vibration pattern in milliseconds (on, off, on, ...)
    pub fn vibration_pattern(&self) -> &'static [u32] {
        match self {
            CelebrationKind::Small => &[],
            CelebrationKind::Milestone | CelebrationKind::Finale => &[120, 60, 120],
        }
    }
}

/// Haptic / audio cue kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Hit,
    Miss,
    Win,
    Lose,
}

impl FeedbackKind {
    /// Vibration pattern in milliseconds (on, off, on, ...)
    pub fn vibration_pattern(&self) -> &'static [u32] {
        match self {
            FeedbackKind::Hit => &[15],
            FeedbackKind::Miss => &[],
            FeedbackKind::Win => &[90],
            FeedbackKind::Lose => &[60],
        }
    }
}

/// Toast-worthy messages
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    RoundStarted { round: u32, endless: bool },
    RoundComplete { round: u32 },
    WrongTryAgain,
    Replaying,
    ReplayRefused(ReplayError),
    EndlessMilestone { round: u32 },
    NewEndlessBest { best: u32 },
    DifficultyChanged(Difficulty),
    EndlessToggled { on: bool },
    DailyToggled { on: bool },
    VictoryShown,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::RoundStarted { round, endless: true } => write!(f, "Round {round} ∞"),
            Notice::RoundStarted { round, .. } => write!(f, "Round {round}"),
            Notice::RoundComplete { round } => write!(f, "Round {round} complete!"),
            Notice::WrongTryAgain => write!(f, "Wrong! Try again"),
            Notice::Replaying => write!(f, "Replaying sequence…"),
            Notice::ReplayRefused(err) => write!(f, "{err}"),
            Notice::EndlessMilestone { round } => write!(f, "🎉 Endless Milestone: {round}! 🎉"),
            Notice::NewEndlessBest { best } => write!(f, "New Endless Best: {best}"),
            Notice::DifficultyChanged(d) => write!(f, "{}", d.description()),
            Notice::EndlessToggled { on: true } => write!(f, "Endless Mode ON ∞"),
            Notice::EndlessToggled { on: false } => write!(f, "Endless Mode OFF"),
            Notice::DailyToggled { on: true } => write!(f, "Daily Challenge ON 📅"),
            Notice::DailyToggled { on: false } => write!(f, "Daily Challenge OFF"),
            Notice::VictoryShown => write!(f, "You cleared all 10 rounds!"),
        }
    }
}

/// HUD state that accompanies phase changes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudFlags {
    pub difficulty: Difficulty,
    pub endless_on: bool,
    pub daily_on: bool,
    pub endless_best: u32,
    pub replay_available: bool,
}

/// Fire-and-forget notifications for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Highlight a target and play its tone
    TargetRevealed { target: Target },
    /// The player tapped the expected target
    TargetConfirmed { target: Target },
    RoundStateChanged {
        phase: Phase,
        round: u32,
        flags: HudFlags,
    },
    Celebration {
        kind: CelebrationKind,
        origin: Vec2,
    },
    Feedback { kind: FeedbackKind },
    Notice(Notice),
}

/// Complete round state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: Phase,
    /// 1-based round number; equals `sequence.len()` once a game is running
    pub round: u32,
    /// Targets to reproduce, in order
    pub sequence: Vec<Target>,
    /// Next target the player must tap
    pub input_index: usize,
    pub difficulty: Difficulty,
    /// Visible Endless toggle
    pub endless_on: bool,
    /// Set the first time Endless is switched on; never cleared by toggling off
    pub endless_lock: bool,
    pub daily_on: bool,
    /// Normal-mode replay spent this round
    pub replay_used: bool,
    /// Hard-mode adaptive leniency in [0, 3]
    pub hard_grace: f32,
    /// Blink hints shown this round
    pub hard_blink_count: u32,
    /// Bumped whenever pending continuations must be invalidated
    pub generation: u64,
    /// Timestamp of the last pointer/key/replay activity (ms)
    #[serde(skip)]
    pub last_action_ms: f64,
    /// Pending notifications (drained by presentation)
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            phase: Phase::Idle,
            round: 1,
            sequence: Vec::new(),
            input_index: 0,
            difficulty,
            endless_on: false,
            endless_lock: false,
            daily_on: false,
            replay_used: false,
            hard_grace: 0.0,
            hard_blink_count: 0,
            generation: 0,
            last_action_ms: 0.0,
            events: Vec::new(),
        }
    }

    /// Endless accounting applies (toggle on, or locked on earlier)
    pub fn endless_active(&self) -> bool {
        self.endless_on || self.endless_lock
    }

    /// Target the next tap must hit
    pub fn expected_target(&self) -> Option<&Target> {
        self.sequence.get(self.input_index)
    }

    /// Targets not yet tapped this attempt
    pub fn pending_targets(&self) -> &[Target] {
        self.sequence.get(self.input_index..).unwrap_or(&[])
    }

    /// Invalidate every pending continuation
    pub fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Back to round 1 with an empty sequence (difficulty and toggles survive)
    pub fn reset_progress(&mut self) {
        self.round = 1;
        self.sequence.clear();
        self.input_index = 0;
        self.replay_used = false;
        self.hard_grace = 0.0;
        self.hard_blink_count = 0;
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn notice(&mut self, notice: Notice) {
        self.events.push(GameEvent::Notice(notice));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle() {
        let state = GameState::new(Difficulty::Normal);
        assert_eq!(state.phase, Phase::Idle);
        assert_eq!(state.round, 1);
        assert!(state.sequence.is_empty());
        assert!(state.expected_target().is_none());
        assert!(state.pending_targets().is_empty());
    }

    #[test]
    fn test_pending_targets_tail() {
        let mut state = GameState::new(Difficulty::Assist);
        state.sequence = vec![
            Target::new(1.0, 1.0, 0),
            Target::new(2.0, 2.0, 1),
            Target::new(3.0, 3.0, 2),
        ];
        state.input_index = 1;
        assert_eq!(state.pending_targets().len(), 2);
        assert_eq!(state.expected_target().map(|t| t.tone), Some(1));
        state.input_index = 3;
        assert!(state.pending_targets().is_empty());
    }

    #[test]
    fn test_endless_active_honours_lock() {
        let mut state = GameState::new(Difficulty::Assist);
        assert!(!state.endless_active());
        state.endless_lock = true;
        assert!(state.endless_active());
    }

    #[test]
    fn test_notice_text() {
        assert_eq!(
            Notice::RoundStarted { round: 3, endless: false }.to_string(),
            "Round 3"
        );
        assert_eq!(
            Notice::ReplayRefused(ReplayError::AlreadyUsed).to_string(),
            "Replay already used this round"
        );
    }
}
