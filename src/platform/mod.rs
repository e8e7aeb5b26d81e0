//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Calendar date (UTC, for the daily seed)
//! - Touch detection
//! - Monotonic time

/// Today's UTC date as (year, month 1-12, day 1-31)
#[cfg(target_arch = "wasm32")]
pub fn utc_today() -> (i32, u32, u32) {
    let d = js_sys::Date::new_0();
    (
        d.get_utc_full_year() as i32,
        d.get_utc_month() + 1,
        d.get_utc_date(),
    )
}

#[cfg(not(target_arch = "wasm32"))]
pub fn utc_today() -> (i32, u32, u32) {
    use std::time::{SystemTime, UNIX_EPOCH};

    let secs = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    };
    civil_from_days(secs.div_euclid(86_400))
}

/// Whether the device takes touch input
#[cfg(target_arch = "wasm32")]
pub fn is_touch_device() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    window.navigator().max_touch_points() > 0
        || js_sys::Reflect::has(&window, &wasm_bindgen::JsValue::from_str("ontouchstart"))
            .unwrap_or(false)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn is_touch_device() -> bool {
    false
}

/// Milliseconds on a monotonic clock (same base as DOM event timestamps)
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

/// Days since 1970-01-01 to a proleptic Gregorian (year, month, day)
#[cfg_attr(target_arch = "wasm32", allow(dead_code))]
fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year as i32, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_civil_from_days() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(-1), (1969, 12, 31));
        assert_eq!(civil_from_days(11_016), (2000, 2, 29));
        assert_eq!(civil_from_days(19_787), (2024, 3, 5));
        assert_eq!(civil_from_days(47_541), (2100, 3, 1));
    }

    #[test]
    fn test_today_is_plausible() {
        let (y, m, d) = utc_today();
        assert!(y >= 2024);
        assert!((1..=12).contains(&m));
        assert!((1..=31).contains(&d));
    }

    #[test]
    fn test_now_ms_is_monotonic() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
    }
}
