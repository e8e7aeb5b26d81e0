//! Pointer hit testing
//!
//! A tap hits when it lands within the effective tolerance of the expected
//! target. Hard mode widens the radius slightly after misses (adaptive grace),
//! and touch screens get a fatter finger allowance.

use glam::Vec2;

use super::difficulty::Difficulty;
use super::state::Target;
use crate::consts::{
    HARD_GRACE_HIT_STEP, HARD_GRACE_MAX, HARD_GRACE_MISS_STEP, HARD_GRACE_WIDEN_MAX,
    HARD_GRACE_WIDEN_PER_POINT, TOUCH_TOLERANCE_MULT,
};

/// Hit radius after grace and touch adjustments
pub fn effective_tolerance(
    difficulty: Difficulty,
    round: u32,
    hard_grace: f32,
    is_touch: bool,
) -> f32 {
    let mut tol = difficulty.tolerance(round);
    if difficulty == Difficulty::Hard {
        let widen = (hard_grace.max(0.0) * HARD_GRACE_WIDEN_PER_POINT).min(HARD_GRACE_WIDEN_MAX);
        tol *= 1.0 + widen;
    }
    if is_touch {
        tol *= TOUCH_TOLERANCE_MULT;
    }
    tol
}

/// Whether a pointer position counts as a tap on `expected`
pub fn is_hit(
    pointer: Vec2,
    expected: &Target,
    difficulty: Difficulty,
    round: u32,
    hard_grace: f32,
    is_touch: bool,
) -> bool {
    let tol = effective_tolerance(difficulty, round, hard_grace, is_touch);
    // Squared compare: no sqrt per tap
    pointer.distance_squared(expected.pos) <= tol * tol
}

/// Grace after a correct tap (leniency wears off with sustained success)
pub fn grace_after_hit(hard_grace: f32) -> f32 {
    (hard_grace - HARD_GRACE_HIT_STEP).max(0.0)
}

/// Grace after a failed attempt
pub fn grace_after_miss(hard_grace: f32) -> f32 {
    (hard_grace + HARD_GRACE_MISS_STEP).min(HARD_GRACE_MAX)
}
