//! Fireworks Memory - a Simon-style sequence game on a night sky canvas
//!
//! Core modules:
//! - `sim`: Deterministic round logic (sequence, difficulty, hit testing, placement)
//! - `effects`: Firework and confetti particle simulation
//! - `platform`: Browser/native platform abstraction
//! - `endless_best`: Persisted best Endless round
//! - `settings`: Startup options from the page query string

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod effects;
pub mod endless_best;
pub mod platform;
pub mod settings;
pub mod sim;

pub use endless_best::EndlessBest;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Rounds in a standard (non-endless) game
    pub const STANDARD_ROUNDS: u32 = 10;
    /// Endless milestones land on multiples of this round
    pub const MILESTONE_EVERY: u32 = 10;

    /// Pause before the first reveal of a playback
    pub const LEAD_IN_MS: u32 = 300;
    /// Settle delay after a completed round
    pub const WIN_SETTLE_MS: u32 = 700;
    /// Settle delay after a wrong tap
    pub const LOSE_SETTLE_MS: u32 = 500;
    /// Pause between appending a target and replaying the sequence
    pub const NEXT_ROUND_PAUSE_MS: u32 = 300;
    /// Length of the finale / milestone choreography
    pub const FINALE_MS: u32 = 3500;
    /// Stagger between the three small win bursts
    pub const SMALL_BURST_STAGGER_MS: u32 = 160;

    /// Placement inset from the left, right and top edges
    pub const FIELD_MARGIN: f32 = 80.0;
    /// No-spawn strip along the bottom edge (HUD, buttons)
    pub const FIELD_BOTTOM_SAFE: f32 = 120.0;
    /// Rejection-sampling attempts per relaxation step
    pub const PLACEMENT_TRIES: u32 = 80;
    /// Minimum distance shrink factor per relaxation step
    pub const PLACEMENT_RELAX: f32 = 0.9;
    /// Below this minimum distance, placement stops checking separation
    pub const PLACEMENT_FLOOR: f32 = 30.0;

    /// Hard-mode adaptive grace
    pub const HARD_GRACE_MAX: f32 = 3.0;
    pub const HARD_GRACE_MISS_STEP: f32 = 1.0;
    pub const HARD_GRACE_HIT_STEP: f32 = 0.5;
    /// Fraction of tolerance added per grace point, and its cap
    pub const HARD_GRACE_WIDEN_PER_POINT: f32 = 0.04;
    pub const HARD_GRACE_WIDEN_MAX: f32 = 0.12;
    /// Touch screens get a fatter finger allowance
    pub const TOUCH_TOLERANCE_MULT: f32 = 1.2;

    /// Hard-mode blink hint
    pub const HARD_BLINK_IDLE_MS: f64 = 2400.0;
    pub const HARD_BLINK_CYCLE_MS: f64 = 3200.0;
    pub const HARD_BLINK_WINDOW_MS: f64 = 90.0;
    pub const HARD_BLINK_MAX_PER_ROUND: u32 = 2;
    pub const HARD_BLINK_CHANCE: f64 = 0.6;

    /// Number of distinct tones a target can carry
    pub const TONE_COUNT: u8 = 4;
}
