//! Startup options
//!
//! Read once from the page query string (`?daily=1&difficulty=hard`) or, for
//! the native binary, from its first argument. Not persisted.

use serde::{Deserialize, Serialize};

use crate::sim::Difficulty;

/// Game settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Start with Endless mode on
    pub endless: bool,
    /// Start with the Daily Challenge on
    pub daily: bool,
    /// Tones on
    pub audio: bool,
    /// Force touch tolerance on or off (otherwise detected)
    pub touch: Option<bool>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Assist,
            endless: false,
            daily: false,
            audio: true,
            touch: None,
        }
    }
}

impl Settings {
    /// Parse a URL query string. Unknown keys and unreadable values are
    /// ignored and leave the default in place.
    pub fn from_query(query: &str) -> Self {
        let mut settings = Self::default();
        let query = query.trim().trim_start_matches('?');

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key.to_ascii_lowercase().as_str() {
                "difficulty" | "mode" => match Difficulty::from_str(value) {
                    Some(d) => settings.difficulty = d,
                    None => log::warn!("Unknown difficulty {:?}", value),
                },
                "daily" => settings.daily = value == "1",
                "endless" => settings.endless = value == "1",
                "audio" | "sound" => {
                    if let Some(on) = parse_flag(value) {
                        settings.audio = on;
                    }
                }
                "touch" => settings.touch = parse_flag(value),
                _ => log::debug!("Ignoring query key {:?}", key),
            }
        }
        settings
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Some(true),
        "0" | "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_is_default() {
        assert_eq!(Settings::from_query(""), Settings::default());
        assert_eq!(Settings::from_query("?"), Settings::default());
    }

    #[test]
    fn test_query_flags() {
        let s = Settings::from_query("?daily=1&difficulty=hard&endless=1&audio=off");
        assert!(s.daily);
        assert!(s.endless);
        assert!(!s.audio);
        assert_eq!(s.difficulty, Difficulty::Hard);
        assert_eq!(s.touch, None);
    }

    #[test]
    fn test_daily_needs_exact_one() {
        assert!(!Settings::from_query("daily=true").daily);
        assert!(!Settings::from_query("daily").daily);
        assert!(Settings::from_query("daily=1").daily);
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let s = Settings::from_query("difficulty=impossible&audio=maybe&foo=bar");
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_touch_override() {
        assert_eq!(Settings::from_query("touch=1").touch, Some(true));
        assert_eq!(Settings::from_query("touch=0").touch, Some(false));
    }
}
