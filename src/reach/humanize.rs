//! Compact metric-suffix formatting for reach numbers.

/// Suffix thresholds, largest first, with the number of decimals kept.
const METRIC_SUFFIXES: [(u64, &str, u32); 5] = [
    (1_000_000_000_000_000, "P", 2),
    (1_000_000_000_000, "T", 2),
    (1_000_000_000, "G", 2),
    (1_000_000, "M", 2),
    (1_000, "K", 1),
];

/// Format `value` with a metric suffix: `0`, `999`, `2.2K`, `1.3M`, `4.56G`.
///
/// Values are rounded half-up and trailing zeros are trimmed.
pub fn metric_suffix(value: u64) -> String {
    for (size, suffix, decimals) in METRIC_SUFFIXES {
        if value >= size {
            return format!("{}{}", scaled(value, size, decimals), suffix);
        }
    }

    value.to_string()
}

fn scaled(value: u64, size: u64, decimals: u32) -> String {
    let factor = 10u128.pow(decimals);
    let size = size as u128;
    let rounded = (value as u128 * factor + size / 2) / size;

    let whole = rounded / factor;
    let fraction = rounded % factor;
    if fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_are_plain() {
        assert_eq!(metric_suffix(0), "0");
        assert_eq!(metric_suffix(12), "12");
        assert_eq!(metric_suffix(999), "999");
    }

    #[test]
    fn thousands_keep_one_decimal() {
        assert_eq!(metric_suffix(1_000), "1K");
        assert_eq!(metric_suffix(2_153), "2.2K");
        assert_eq!(metric_suffix(2_049), "2K");
        assert_eq!(metric_suffix(15_950), "16K");
    }

    #[test]
    fn larger_magnitudes_keep_two_decimals() {
        assert_eq!(metric_suffix(1_300_000), "1.3M");
        assert_eq!(metric_suffix(4_561_000_000), "4.56G");
        assert_eq!(metric_suffix(7_000_000_000_000), "7T");
        assert_eq!(metric_suffix(u64::MAX), "18446.74P");
    }

    #[test]
    fn formatting_is_monotonic_within_a_magnitude() {
        let rendered: Vec<f64> = (1_000..20_000u64)
            .step_by(37)
            .map(|n| metric_suffix(n).trim_end_matches('K').parse().unwrap())
            .collect();

        assert!(rendered.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
