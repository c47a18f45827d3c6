//! Subtitle clock formatting.
//!
//! Both subtitle formats we emit use the same `HH:MM:SS?mmm` clock and only disagree on the
//! separator in front of the milliseconds: SRT uses a comma, WebVTT a period.

/// Separator used by SRT (`00:00:01,250`).
pub const INDEXED_SEPARATOR: char = ',';

/// Separator used by WebVTT (`00:00:01.250`).
pub const WEB_SEPARATOR: char = '.';

/// Format seconds as an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Negative and non-finite offsets are clamped to zero.
pub fn format_indexed(seconds: f64) -> String {
    format_clock(seconds, INDEXED_SEPARATOR)
}

/// Format seconds as a WebVTT timestamp (`HH:MM:SS.mmm`).
///
/// Negative and non-finite offsets are clamped to zero.
pub fn format_web(seconds: f64) -> String {
    format_clock(seconds, WEB_SEPARATOR)
}

/// Clock fields of an offset, after rounding to whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub millis: u64,
}

impl Clock {
    /// Decompose an offset in seconds.
    ///
    /// Rounding policy:
    /// - We round the whole offset to the nearest millisecond first and decompose afterwards,
    ///   so `1.9996` becomes `00:00:02.000` rather than `00:00:01.1000`.
    pub fn from_seconds(seconds: f64) -> Self {
        let seconds = normalize(seconds);
        let total_ms = (seconds * 1000.0).round() as u64;

        let millis = total_ms % 1000;
        let total_s = total_ms / 1000;

        let secs = total_s % 60;
        let total_m = total_s / 60;

        Self {
            hours: total_m / 60,
            minutes: total_m % 60,
            seconds: secs,
            millis,
        }
    }
}

fn normalize(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

fn format_clock(seconds: f64, separator: char) -> String {
    let Clock {
        hours: h,
        minutes: m,
        seconds: s,
        millis: ms,
    } = Clock::from_seconds(seconds);

    format!("{h:02}:{m:02}:{s:02}{separator}{ms:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_formats_as_midnight() {
        assert_eq!(format_indexed(0.0), "00:00:00,000");
        assert_eq!(format_web(0.0), "00:00:00.000");
    }

    #[test]
    fn negative_and_non_finite_clamp_to_zero() {
        assert_eq!(format_indexed(-3.5), "00:00:00,000");
        assert_eq!(format_web(f64::NAN), "00:00:00.000");
        assert_eq!(format_web(f64::INFINITY), "00:00:00.000");
    }

    #[test]
    fn decomposes_hours_minutes_seconds() {
        assert_eq!(format_indexed(3661.5), "01:01:01,500");
        assert_eq!(format_web(3661.5), "01:01:01.500");
        assert_eq!(format_web(1.25), "00:00:01.250");
    }

    #[test]
    fn hours_are_not_capped_at_two_digits() {
        assert_eq!(format_indexed(100.0 * 3600.0 + 0.001), "100:00:00,001");
    }

    #[test]
    fn millisecond_rounding_carries_into_the_next_second() {
        assert_eq!(format_indexed(1.9996), "00:00:02,000");
        assert_eq!(format_web(1.9996), "00:00:02.000");
        assert_eq!(format_indexed(59.9996), "00:01:00,000");
        assert_eq!(format_web(3599.9999), "01:00:00.000");
    }

    #[test]
    fn rounds_to_nearest_millisecond() {
        assert_eq!(format_web(0.0004), "00:00:00.000");
        assert_eq!(format_web(0.0006), "00:00:00.001");
    }

    #[test]
    fn formats_differ_only_in_separator() {
        for t in [0.0, 0.5, 1.25, 59.999, 61.2, 3661.5, 7322.042, 86_399.9994] {
            let indexed = format_indexed(t);
            let web = format_web(t);
            assert_eq!(indexed.replace(INDEXED_SEPARATOR, "."), web, "t = {t}");
        }
    }
}
