//! Duration codecs bridging the provider's text formats and whole seconds.

/// Render non-negative whole seconds as `PT<H>H<M>M<S>S`, omitting zero
/// components; zero renders as `PT0S`. Fallback routes stand in for real
/// provider responses, so this rendering has to stay byte-stable.
pub fn to_iso_duration(total_seconds: i64) -> String {
    let seconds = total_seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let rest = seconds % 60;

    let mut iso = String::from("PT");
    if hours > 0 {
        iso.push_str(&format!("{hours}H"));
    }
    if minutes > 0 {
        iso.push_str(&format!("{minutes}M"));
    }
    if rest > 0 || (hours == 0 && minutes == 0) {
        iso.push_str(&format!("{rest}S"));
    }
    iso
}

/// Parse the provider's seconds-only duration text (`"1234s"`, possibly
/// signed or fractional). Malformed or absent input yields 0, never an error.
pub fn parse_provider_seconds(text: &str) -> i64 {
    let bytes = text.as_bytes();
    let mut end = 0;

    if end < bytes.len() && bytes[end] == b'-' {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return 0;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    if bytes.get(end) != Some(&b's') {
        return 0;
    }

    text[..end].parse::<f64>().map(|v| v.round() as i64).unwrap_or(0)
}

/// Parse `PT<H>H<M>M<S>S` text. Unknown designators are ignored; malformed
/// input yields 0.
pub fn parse_iso_duration(text: &str) -> i64 {
    let Some(rest) = text.strip_prefix("PT") else {
        return 0;
    };

    let mut total = 0i64;
    let mut num = String::new();
    for c in rest.chars() {
        if c.is_ascii_digit() {
            num.push(c);
            continue;
        }
        let value: i64 = num.parse().unwrap_or(0);
        num.clear();
        total += match c {
            'H' => value * 3600,
            'M' => value * 60,
            'S' => value,
            _ => 0,
        };
    }
    total
}

/// Duration text in either of the shapes this pipeline encounters: the
/// provider's `"1234s"` or the synthesizer's `"PT20M34S"`.
pub fn parse_duration_text(text: &str) -> i64 {
    if text.starts_with("PT") {
        parse_iso_duration(text)
    } else {
        parse_provider_seconds(text)
    }
}

/// Human-readable duration for itinerary text: "2 hr 5 min", "45 min", "30 sec".
pub fn format_duration(total_seconds: i64) -> String {
    let seconds = total_seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let rest = seconds % 60;

    match (hours, minutes) {
        (0, 0) => format!("{rest} sec"),
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} hr"),
        (h, m) => format!("{h} hr {m} min"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_zero() {
        assert_eq!(to_iso_duration(0), "PT0S");
        assert_eq!(to_iso_duration(-5), "PT0S");
    }

    #[test]
    fn test_iso_omits_zero_components() {
        assert_eq!(to_iso_duration(3600), "PT1H");
        assert_eq!(to_iso_duration(60), "PT1M");
        assert_eq!(to_iso_duration(59), "PT59S");
        assert_eq!(to_iso_duration(3661), "PT1H1M1S");
        assert_eq!(to_iso_duration(3660), "PT1H1M");
        assert_eq!(to_iso_duration(7205), "PT2H5S");
    }

    #[test]
    fn test_parse_plain_seconds() {
        assert_eq!(parse_provider_seconds("1234s"), 1234);
        assert_eq!(parse_provider_seconds("0s"), 0);
    }

    #[test]
    fn test_parse_signed_and_fractional() {
        assert_eq!(parse_provider_seconds("-30s"), -30);
        assert_eq!(parse_provider_seconds("12.6s"), 13);
        assert_eq!(parse_provider_seconds("12.s"), 12);
    }

    #[test]
    fn test_parse_malformed_is_zero() {
        assert_eq!(parse_provider_seconds(""), 0);
        assert_eq!(parse_provider_seconds("s"), 0);
        assert_eq!(parse_provider_seconds("12"), 0);
        assert_eq!(parse_provider_seconds("abcs"), 0);
        assert_eq!(parse_provider_seconds("PT1H"), 0);
        assert_eq!(parse_provider_seconds("-s"), 0);
    }

    #[test]
    fn test_parse_iso_duration() {
        assert_eq!(parse_iso_duration("PT0S"), 0);
        assert_eq!(parse_iso_duration("PT1H"), 3600);
        assert_eq!(parse_iso_duration("PT1H1M1S"), 3661);
        assert_eq!(parse_iso_duration("PT2H5S"), 7205);
        assert_eq!(parse_iso_duration("1234s"), 0);
    }

    #[test]
    fn test_parse_duration_text_accepts_both_shapes() {
        assert_eq!(parse_duration_text("1234s"), 1234);
        assert_eq!(parse_duration_text("PT20M34S"), 1234);
    }

    #[test]
    fn test_iso_roundtrips_through_parse() {
        for secs in [0, 59, 60, 3600, 3661, 86_399] {
            assert_eq!(parse_iso_duration(&to_iso_duration(secs)), secs);
        }
    }

    #[test]
    fn test_format_duration_buckets() {
        assert_eq!(format_duration(30), "30 sec");
        assert_eq!(format_duration(0), "0 sec");
        assert_eq!(format_duration(45 * 60), "45 min");
        assert_eq!(format_duration(2 * 3600), "2 hr");
        assert_eq!(format_duration(2 * 3600 + 5 * 60), "2 hr 5 min");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_iso_roundtrip_components(secs in 0i64..=1_000_000) {
                let iso = to_iso_duration(secs);
                prop_assert!(iso.starts_with("PT"));
                // Reassemble from the rendered components.
                let mut total = 0i64;
                let mut num = String::new();
                for c in iso[2..].chars() {
                    if c.is_ascii_digit() {
                        num.push(c);
                    } else {
                        let v: i64 = num.parse().unwrap();
                        num.clear();
                        total += match c {
                            'H' => v * 3600,
                            'M' => v * 60,
                            'S' => v,
                            _ => 0,
                        };
                    }
                }
                prop_assert_eq!(total, secs);
            }

            #[test]
            fn prop_parse_never_panics(text in "\\PC*") {
                let _ = parse_provider_seconds(&text);
            }
        }
    }
}
