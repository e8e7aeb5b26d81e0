//! Difficulty policy
//!
//! Pure functions of (difficulty, round) that set how forgiving taps are, how
//! fast the sequence plays back, and how far apart targets spawn.

use serde::{Deserialize, Serialize};

use crate::consts::STANDARD_ROUNDS;

/// Difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    /// Big targets, hint rings, unlimited replays
    #[default]
    Assist,
    /// Forgiving targets, faint hints, one replay per round
    Normal,
    /// Tight targets, no hints, no replays
    Hard,
}

/// Playback speed for one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    /// How long each target stays highlighted
    pub show_ms: u32,
    /// Silence after each highlight
    pub gap_ms: u32,
}

impl Timings {
    /// Time one reveal occupies
    pub fn step_ms(&self) -> u32 {
        self.show_ms + self.gap_ms
    }
}

/// How hint rings are drawn during input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintStyle {
    /// Wobbling double ring around every pending target
    Pulse,
    /// Small faint ring
    Faint,
    Hidden,
}

/// How many replays a round allows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayPolicy {
    Unlimited,
    OncePerRound,
    Disabled,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Assist, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Assist => "assist",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "assist" | "easy" => Some(Difficulty::Assist),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Short HUD label
    pub fn hud_label(&self) -> &'static str {
        match self {
            Difficulty::Assist => "Assist",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    /// Toast shown when switching to this level
    pub fn description(&self) -> &'static str {
        match self {
            Difficulty::Assist => "Assist Mode (hints + big target)",
            Difficulty::Normal => "Normal Mode (forgiving target)",
            Difficulty::Hard => "Hard Mode (tight target)",
        }
    }

    /// Cycle assist -> normal -> hard -> assist
    pub fn next(&self) -> Self {
        match self {
            Difficulty::Assist => Difficulty::Normal,
            Difficulty::Normal => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Assist,
        }
    }

    /// Hit radius in pixels for a round.
    ///
    /// Assist and Normal shrink linearly over rounds 1..=10 and hold the end
    /// value afterwards. Hard is constant.
    pub fn tolerance(&self, round: u32) -> f32 {
        let t = (round.saturating_sub(1) as f32 / (STANDARD_ROUNDS - 1) as f32).min(1.0);
        match self {
            Difficulty::Assist => lerp(64.0, 52.0, t),
            Difficulty::Normal => lerp(56.0, 50.0, t),
            Difficulty::Hard => 44.0,
        }
    }

    /// Reveal timing for a round. Speeds up each round, with a small cushion on
    /// Hard, and keeps ramping past round 10 while Endless is on.
    pub fn timings(&self, round: u32, endless_on: bool) -> Timings {
        let elapsed = round.saturating_sub(1) as i64;
        let mut show = (600 - elapsed * 34).max(280);
        let mut gap = (220 - elapsed * 12).max(120);

        if *self == Difficulty::Hard {
            show += 40;
            gap += 20;
        }

        if endless_on && round > STANDARD_ROUNDS {
            let over = (round - STANDARD_ROUNDS) as i64;
            show = (show - over * 10).max(220);
            gap = (gap - over * 5).max(100);
        }

        Timings {
            show_ms: show as u32,
            gap_ms: gap as u32,
        }
    }

    /// Spacing multiplier: wider spacing where targets are bigger
    pub fn spacing_factor(&self) -> f32 {
        match self {
            Difficulty::Assist => 1.4,
            Difficulty::Normal => 1.2,
            Difficulty::Hard => 1.0,
        }
    }

    /// Minimum centre distance between targets placed this round
    /// (~85% of two spaced radii: overlapping halos, never stacked centres)
    pub fn min_target_distance(&self, round: u32) -> f32 {
        self.tolerance(round) * self.spacing_factor() * 2.0 * 0.85
    }

    pub fn hint_style(&self) -> HintStyle {
        match self {
            Difficulty::Assist => HintStyle::Pulse,
            Difficulty::Normal => HintStyle::Faint,
            Difficulty::Hard => HintStyle::Hidden,
        }
    }

    pub fn replay_policy(&self) -> ReplayPolicy {
        match self {
            Difficulty::Assist => ReplayPolicy::Unlimited,
            Difficulty::Normal => ReplayPolicy::OncePerRound,
            Difficulty::Hard => ReplayPolicy::Disabled,
        }
    }
}

#[inline]
fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hard_tolerance_is_constant() {
        assert_eq!(Difficulty::Hard.tolerance(1), 44.0);
        assert_eq!(Difficulty::Hard.tolerance(7), 44.0);
        assert_eq!(Difficulty::Hard.tolerance(40), 44.0);
    }

    #[test]
    fn test_tolerance_endpoints() {
        assert_eq!(Difficulty::Assist.tolerance(1), 64.0);
        assert!((Difficulty::Assist.tolerance(10) - 52.0).abs() < 1e-4);
        assert!((Difficulty::Assist.tolerance(25) - 52.0).abs() < 1e-4);
        assert_eq!(Difficulty::Normal.tolerance(1), 56.0);
        assert!((Difficulty::Normal.tolerance(10) - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_base_timings() {
        let t = Difficulty::Assist.timings(1, false);
        assert_eq!((t.show_ms, t.gap_ms), (600, 220));

        let t = Difficulty::Normal.timings(5, false);
        assert_eq!((t.show_ms, t.gap_ms), (600 - 4 * 34, 220 - 4 * 12));

        // Floors reached by round 11 for show (600-340=260 -> 280)
        let t = Difficulty::Normal.timings(11, false);
        assert_eq!((t.show_ms, t.gap_ms), (280, 120));
    }

    #[test]
    fn test_hard_timing_cushion() {
        let t = Difficulty::Hard.timings(1, false);
        assert_eq!((t.show_ms, t.gap_ms), (640, 240));
        let t = Difficulty::Hard.timings(30, false);
        assert_eq!((t.show_ms, t.gap_ms), (320, 140));
    }

    #[test]
    fn test_endless_keeps_ramping() {
        // Round 10 is not past the standard game yet
        assert_eq!(
            Difficulty::Normal.timings(10, true),
            Difficulty::Normal.timings(10, false)
        );

        let t = Difficulty::Normal.timings(13, true);
        assert_eq!((t.show_ms, t.gap_ms), (280 - 30, 120 - 15));

        let t = Difficulty::Normal.timings(100, true);
        assert_eq!((t.show_ms, t.gap_ms), (220, 100));
    }

    #[test]
    fn test_min_target_distance_scales_with_forgiveness() {
        let assist = Difficulty::Assist.min_target_distance(1);
        let normal = Difficulty::Normal.min_target_distance(1);
        let hard = Difficulty::Hard.min_target_distance(1);
        assert!((assist - 64.0 * 1.4 * 2.0 * 0.85).abs() < 1e-3);
        assert!((hard - 44.0 * 2.0 * 0.85).abs() < 1e-3);
        assert!(assist > normal && normal > hard);
    }

    #[test]
    fn test_cycle_and_parse() {
        assert_eq!(Difficulty::Assist.next(), Difficulty::Normal);
        assert_eq!(Difficulty::Hard.next(), Difficulty::Assist);
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
        assert_eq!(Difficulty::from_str(" HARD "), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("nightmare"), None);
    }

    #[test]
    fn test_policies() {
        assert_eq!(Difficulty::Assist.replay_policy(), ReplayPolicy::Unlimited);
        assert_eq!(Difficulty::Normal.replay_policy(), ReplayPolicy::OncePerRound);
        assert_eq!(Difficulty::Hard.replay_policy(), ReplayPolicy::Disabled);
        assert_eq!(Difficulty::Hard.hint_style(), HintStyle::Hidden);
    }

    proptest! {
        #[test]
        fn prop_tolerance_non_increasing(round in 1u32..10) {
            for d in Difficulty::ALL {
                prop_assert!(d.tolerance(round + 1) <= d.tolerance(round));
            }
        }

        #[test]
        fn prop_timings_respect_floors(round in 1u32..500, endless in any::<bool>()) {
            for d in Difficulty::ALL {
                let t = d.timings(round, endless);
                prop_assert!(t.show_ms >= 220);
                prop_assert!(t.gap_ms >= 100);
                prop_assert!(t.show_ms <= 640);
            }
        }
    }
}
