//! Best Endless round
//!
//! Persisted to LocalStorage as a bare JSON number. Reads and writes never
//! fail loudly: a missing or unreadable value means a best of 0.

use serde::{Deserialize, Serialize};

/// Highest round reached in Endless mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EndlessBest {
    best: u32,
}

impl EndlessBest {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fw_endless_best_v1";

    pub fn new() -> Self {
        Self { best: 0 }
    }

    pub fn with_value(best: u32) -> Self {
        Self { best }
    }

    pub fn get(&self) -> u32 {
        self.best
    }

    /// Record a reached round. Returns true if it is a new best.
    pub fn record(&mut self, round: u32) -> bool {
        if round > self.best {
            self.best = round;
            true
        } else {
            false
        }
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    fn parse(text: &str) -> Option<u32> {
        serde_json::from_str::<u32>(text.trim()).ok()
    }

    /// Load the best from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = match web_sys::window().map(|w| w.local_storage()) {
            Some(Ok(Some(storage))) => storage,
            _ => {
                log::warn!("LocalStorage unavailable, endless best starts at 0");
                return Self::new();
            }
        };

        match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(text)) => match Self::parse(&text) {
                Some(best) => {
                    log::info!("Loaded endless best: {}", best);
                    Self::with_value(best)
                }
                None => {
                    log::warn!("Ignoring unreadable endless best {:?}", text);
                    Self::new()
                }
            },
            Ok(None) => Self::new(),
            Err(_) => {
                log::warn!("Failed to read endless best");
                Self::new()
            }
        }
    }

    /// Save the best to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        let Some(storage) = storage else {
            log::warn!("LocalStorage unavailable, endless best not saved");
            return;
        };
        match serde_json::to_string(&self.best) {
            Ok(text) => {
                if storage.set_item(Self::STORAGE_KEY, &text).is_err() {
                    log::warn!("Failed to save endless best");
                }
            }
            Err(e) => log::warn!("Failed to encode endless best: {}", e),
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_only_improves() {
        let mut best = EndlessBest::new();
        assert!(best.record(11));
        assert!(!best.record(11));
        assert!(!best.record(4));
        assert!(best.record(12));
        assert_eq!(best.get(), 12);
    }

    #[test]
    fn test_parse_stored_text() {
        assert_eq!(EndlessBest::parse("27"), Some(27));
        assert_eq!(EndlessBest::parse(" 3\n"), Some(3));
        assert_eq!(EndlessBest::parse("abc"), None);
        assert_eq!(EndlessBest::parse("-1"), None);
        assert_eq!(EndlessBest::parse(""), None);
    }

    #[test]
    fn test_native_load_is_zero() {
        assert_eq!(EndlessBest::load().get(), 0);
    }
}
