//! Wall-clock helper.

use chrono::Utc;

/// Current time as fractional seconds since the Unix epoch.
pub fn now_secs() -> f64 {
    let micros = Utc::now().timestamp_micros();
    micros as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_monotonic_enough() {
        let a = now_secs();
        let b = now_secs();
        assert!(a > 1_600_000_000.0);
        assert!(b >= a);
    }
}
