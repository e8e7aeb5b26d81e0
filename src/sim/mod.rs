//! Deterministic round simulation
//!
//! All gameplay logic lives here. This module must stay free of rendering and
//! platform calls:
//! - Time only advances through `Game::advance`
//! - Target placement draws only from `RngSource`
//! - Presentation learns about changes through drained `GameEvent`s

pub mod difficulty;
pub mod flow;
pub mod game;
pub mod hit;
pub mod machine;
pub mod placement;
pub mod rng;
pub mod state;
pub mod timeline;

pub use difficulty::{Difficulty, HintStyle, ReplayPolicy, Timings};
pub use flow::ReplayError;
pub use game::Game;
pub use hit::{effective_tolerance, is_hit};
pub use machine::PointerOutcome;
pub use placement::{PlayField, place_target};
pub use rng::{Mulberry32, RngSource, daily_seed};
pub use state::{
    CelebrationKind, FeedbackKind, GameEvent, GameState, HudFlags, Notice, Phase, Target,
};
pub use timeline::{Step, Timeline};
