//! Parsing of `--duration` values such as `12h`, `90m` or `1h30m`.

use std::time::Duration;

/// Parses a sequence of decimal numbers each followed by `h`, `m` or `s`.
///
/// A bare `0` is accepted. Fractions are allowed (`1.5h`).
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let text = input.trim();
    if text.is_empty() {
        return Err("duration must not be empty".to_owned());
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_seconds = 0_f64;
    let mut rest = text;
    while !rest.is_empty() {
        let number_len = rest
            .find(|character: char| !(character.is_ascii_digit() || character == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("invalid duration '{input}': expected a number"));
        }

        let (number, tail) = rest.split_at(number_len);
        let value = number
            .parse::<f64>()
            .map_err(|error| format!("invalid duration '{input}': {error}"))?;

        let unit_len = tail
            .find(|character: char| character.is_ascii_digit() || character == '.')
            .unwrap_or(tail.len());
        let (unit, remaining) = tail.split_at(unit_len);
        let unit_seconds = match unit {
            "h" => 3600.0,
            "m" => 60.0,
            "s" => 1.0,
            "" => return Err(format!("invalid duration '{input}': missing unit")),
            other => return Err(format!("invalid duration '{input}': unknown unit '{other}'")),
        };

        total_seconds += value * unit_seconds;
        rest = remaining;
    }

    Duration::try_from_secs_f64(total_seconds)
        .map_err(|error| format!("invalid duration '{input}': {error}"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::parse_duration;

    #[test]
    fn parses_single_units() {
        assert_eq!(parse_duration("12h"), Ok(Duration::from_secs(12 * 3600)));
        assert_eq!(parse_duration("30m"), Ok(Duration::from_secs(30 * 60)));
        assert_eq!(parse_duration("45s"), Ok(Duration::from_secs(45)));
    }

    #[test]
    fn parses_combined_and_fractional_values() {
        assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse_duration("1.5h"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse_duration("2m30s"), Ok(Duration::from_secs(150)));
    }

    #[test]
    fn bare_zero_is_zero() {
        assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
        assert_eq!(parse_duration("0m"), Ok(Duration::ZERO));
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("12").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("3d").is_err());
        assert!(parse_duration("-1h").is_err());
        assert!(parse_duration("1..5h").is_err());
    }
}
