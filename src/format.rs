use std::sync::OnceLock;

use regex::Regex;

/// Placeholder shown when a duration code cannot be read
pub const UNKNOWN_DURATION: &str = "-";

fn duration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:[.,]\d+)?S)?)?$",
        )
        .unwrap()
    })
}

/// Parse an ISO-8601 duration (PT1H2M3S, P1DT2H, P0D) into whole seconds.
///
/// Calendar components (years, months) have no fixed length and are rejected.
pub fn parse_duration_seconds(code: &str) -> Option<u64> {
    let code = code.trim();
    let caps = duration_pattern().captures(code)?;

    // "P" and "PT" alone match the pattern but carry no components
    if (1..=5).all(|i| caps.get(i).is_none()) || code.ends_with('T') {
        return None;
    }

    let field = |i: usize| -> Option<u64> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let weeks = field(1)?;
    let days = field(2)?;
    let hours = field(3)?;
    let minutes = field(4)?;
    let seconds = field(5)?;

    let total_hours = weeks
        .checked_mul(7 * 24)?
        .checked_add(days.checked_mul(24)?)?
        .checked_add(hours)?;

    total_hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

/// Convert a duration code into "1시간 2분 3초" style text, or "-" when unreadable
pub fn normalize_duration(code: &str) -> String {
    let Some(total_seconds) = parse_duration_seconds(code) else {
        return UNKNOWN_DURATION.to_string();
    };

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}시간 {}분 {}초", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}분 {}초", minutes, seconds)
    } else {
        format!("{}초", seconds)
    }
}

/// Group digits with commas: 10500 -> "10,500"
pub fn format_grouped(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

/// Coarse Korean magnitude text: 12345 -> "1만 2천".
///
/// Only 만 and 천 units are used, so anything below a thousand is dropped
/// once a larger unit is present. Values under 1,000 are shown exactly.
pub fn format_magnitude(n: u64) -> String {
    let man = n / 10_000;
    let cheon = (n % 10_000) / 1_000;

    let mut parts = Vec::with_capacity(2);
    if man > 0 {
        parts.push(format!("{}만", man));
    }
    if cheon > 0 {
        parts.push(format!("{}천", cheon));
    }

    if parts.is_empty() {
        format_grouped(n)
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_with_all_components() {
        assert_eq!(normalize_duration("PT1H2M3S"), "1시간 2분 3초");
        assert_eq!(normalize_duration("PT2H"), "2시간 0분 0초");
    }

    #[test]
    fn duration_under_an_hour() {
        assert_eq!(normalize_duration("PT45S"), "45초");
        assert_eq!(normalize_duration("PT10M"), "10분 0초");
        assert_eq!(normalize_duration("PT3M7S"), "3분 7초");
        assert_eq!(normalize_duration("PT90S"), "1분 30초");
    }

    #[test]
    fn duration_days_and_weeks_fold_into_hours() {
        assert_eq!(normalize_duration("P1DT2H"), "26시간 0분 0초");
        assert_eq!(normalize_duration("P1W"), "168시간 0분 0초");
        assert_eq!(parse_duration_seconds("P1DT1S"), Some(86_401));
    }

    #[test]
    fn zero_length_live_stream_duration() {
        assert_eq!(normalize_duration("P0D"), "0초");
        assert_eq!(normalize_duration("PT0S"), "0초");
    }

    #[test]
    fn fractional_seconds_are_truncated() {
        assert_eq!(normalize_duration("PT1M1.9S"), "1분 1초");
    }

    #[test]
    fn malformed_duration_gives_placeholder() {
        for code in ["", "abc", "P", "PT", "1H2M", "PT1X", "P1Y", "P2M", "PT-5S", "P1DT"] {
            assert_eq!(normalize_duration(code), "-", "code {:?}", code);
        }
    }

    #[test]
    fn grouped_digits() {
        assert_eq!(format_grouped(0), "0");
        assert_eq!(format_grouped(999), "999");
        assert_eq!(format_grouped(1000), "1,000");
        assert_eq!(format_grouped(10500), "10,500");
        assert_eq!(format_grouped(1234567), "1,234,567");
    }

    #[test]
    fn magnitude_units() {
        assert_eq!(format_magnitude(12345), "1만 2천");
        assert_eq!(format_magnitude(10000), "1만");
        assert_eq!(format_magnitude(10500), "1만");
        assert_eq!(format_magnitude(3400), "3천");
        assert_eq!(format_magnitude(1_234_567), "123만 4천");
    }

    #[test]
    fn magnitude_small_values_are_exact() {
        assert_eq!(format_magnitude(0), "0");
        assert_eq!(format_magnitude(99), "99");
        assert_eq!(format_magnitude(999), "999");
    }

    fn reconstruct(text: &str) -> u64 {
        text.split(' ')
            .map(|part| {
                if let Some(v) = part.strip_suffix('만') {
                    v.parse::<u64>().unwrap() * 10_000
                } else if let Some(v) = part.strip_suffix('천') {
                    v.parse::<u64>().unwrap() * 1_000
                } else {
                    part.replace(',', "").parse::<u64>().unwrap()
                }
            })
            .sum()
    }

    #[test]
    fn magnitude_reconstructs_within_a_thousand() {
        let samples = (0..5_000u64)
            .map(|i| i * 7_919 % 3_000_000)
            .chain([0, 1, 999, 1_000, 9_999, 10_000, 99_999, u32::MAX as u64]);

        for n in samples {
            let back = reconstruct(&format_magnitude(n));
            assert!(back <= n, "{} -> {}", n, back);
            assert!(n - back < 1_000, "{} -> {}", n, back);
        }
    }
}
