//! Compact duration strings for the rate-limit window ("10s", "5m", "1d").

use std::time::Duration;

pub fn parse(raw: &str) -> Option<Duration> {
    let raw = raw.trim();

    if let Some(value) = raw.strip_suffix("ms") {
        return value.parse().ok().map(Duration::from_millis);
    }

    for (suffix, secs) in [("s", 1), ("m", 60), ("h", 3_600), ("d", 86_400)] {
        if let Some(value) = raw.strip_suffix(suffix) {
            let value: u64 = value.parse().ok()?;
            return Some(Duration::from_secs(value * secs));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_unit() {
        assert_eq!(parse("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse("10s"), Some(Duration::from_secs(10)));
        assert_eq!(parse("90m"), Some(Duration::from_secs(5_400)));
        assert_eq!(parse("2h"), Some(Duration::from_secs(7_200)));
        assert_eq!(parse("1d"), Some(Duration::from_secs(86_400)));
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert_eq!(parse(" 1h "), Some(Duration::from_secs(3_600)));
    }

    #[test]
    fn rejects_unknown_units_and_garbage() {
        assert_eq!(parse("1w"), None);
        assert_eq!(parse("abc"), None);
        assert_eq!(parse("d"), None);
        assert_eq!(parse("ms"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("1.5h"), None);
    }
}
