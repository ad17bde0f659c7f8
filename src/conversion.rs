use crate::constants::{Degree, Hour};

/// Split a positive value into sexagesimal parts with a rounding carry.
///
/// Seconds are rounded to `sec_decimals` places; a carry at 60 propagates
/// into minutes and units so that `(12, 59, 60.0)` never appears.
fn to_sexagesimal(value: f64, sec_decimals: u32) -> (u64, u64, f64) {
    let scale = 10f64.powi(sec_decimals as i32);

    // Round at the seconds level first, then split.
    let total_scaled = (value * 3600.0 * scale).round();
    let total_sec = total_scaled / scale;

    let units = (total_sec / 3600.0).floor();
    let rem = total_sec - units * 3600.0;
    let minutes = (rem / 60.0).floor();
    let seconds = rem - minutes * 60.0;

    (units as u64, minutes as u64, seconds)
}

/// Format a right ascension in hours as `HHh MMm SS.SSs`.
pub fn hours_to_hms(hours: Hour) -> String {
    let wrapped = hours.rem_euclid(24.0);
    let (h, m, s) = to_sexagesimal(wrapped, 2);
    let (h, m) = if h == 24 { (0, m) } else { (h, m) };
    format!("{h:02}h {m:02}m {s:05.2}s")
}

/// Format a declination (or any signed angle) in degrees as `±DD° MM' SS.S"`.
pub fn degrees_to_dms(degrees: Degree) -> String {
    let sign = if degrees < 0.0 { '-' } else { '+' };
    let (d, m, s) = to_sexagesimal(degrees.abs(), 1);
    format!("{sign}{d:02}\u{00b0} {m:02}' {s:04.1}\"")
}

/// Format a decimal hour of day as `hh:mm:ss`, wrapping at 24h.
///
/// Used to render rise/set event times; rounding to whole seconds can carry
/// an event at `23:59:59.6` over the day boundary, which wraps to `00:00:00`.
pub fn hours_of_day_to_hhmmss(hours: Hour) -> String {
    let (h, m, s) = to_sexagesimal(hours.rem_euclid(24.0), 0);
    let h = h % 24;
    format!("{h:02}:{m:02}:{s:02.0}")
}

/// Parse a sexagesimal right ascension string (`HH MM SS.SS`, spaces or
/// colons) to decimal hours.
pub fn parse_hms_to_hours(ra: &str) -> Option<Hour> {
    let parts: Vec<&str> = ra
        .split(|c: char| c.is_whitespace() || c == ':')
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }

    let h: f64 = parts[0].parse().ok()?;
    let m: f64 = parts[1].parse().ok()?;
    let s: f64 = parts[2].parse().ok()?;
    if h < 0.0 || !(0.0..60.0).contains(&m) || !(0.0..60.0).contains(&s) {
        return None;
    }

    Some(h + m / 60.0 + s / 3600.0)
}

/// Parse a sexagesimal declination string (`±DD MM SS.S`, spaces or colons)
/// to decimal degrees.
pub fn parse_dms_to_degrees(dec: &str) -> Option<Degree> {
    let parts: Vec<&str> = dec
        .split(|c: char| c.is_whitespace() || c == ':')
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }

    let sign = if parts[0].starts_with('-') { -1.0 } else { 1.0 };
    let d: f64 = parts[0].trim_start_matches(['-', '+']).parse().ok()?;
    let m: f64 = parts[1].parse().ok()?;
    let s: f64 = parts[2].parse().ok()?;
    if !(0.0..60.0).contains(&m) || !(0.0..60.0).contains(&s) {
        return None;
    }

    Some(sign * (d + m / 60.0 + s / 3600.0))
}

#[cfg(test)]
mod conversion_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_hours_to_hms() {
        assert_eq!(hours_to_hms(5.242297), "05h 14m 32.27s");
        assert_eq!(hours_to_hms(0.0), "00h 00m 00.00s");
        // Wraps below zero and above 24.
        assert_eq!(hours_to_hms(25.5), "01h 30m 00.00s");
        assert_eq!(hours_to_hms(-0.5), "23h 30m 00.00s");
    }

    #[test]
    fn test_degrees_to_dms() {
        assert_eq!(degrees_to_dms(-8.20164), "-08\u{00b0} 12' 05.9\"");
        assert_eq!(degrees_to_dms(41.269444), "+41\u{00b0} 16' 10.0\"");
        assert_eq!(degrees_to_dms(0.0), "+00\u{00b0} 00' 00.0\"");
    }

    #[test]
    fn test_hours_of_day_carry() {
        assert_eq!(hours_of_day_to_hhmmss(6.5), "06:30:00");
        // 59.6 s rounds up and carries through minutes and hours.
        let almost_midnight = 23.0 + 59.0 / 60.0 + 59.6 / 3600.0;
        assert_eq!(hours_of_day_to_hhmmss(almost_midnight), "00:00:00");
        let almost_seven = 6.0 + 59.0 / 60.0 + 59.7 / 3600.0;
        assert_eq!(hours_of_day_to_hhmmss(almost_seven), "07:00:00");
    }

    #[test]
    fn test_parse_hms() {
        assert_abs_diff_eq!(
            parse_hms_to_hours("22 52 23.37").unwrap(),
            22.0 + 52.0 / 60.0 + 23.37 / 3600.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            parse_hms_to_hours("05:14:32.27").unwrap(),
            5.242297222222222,
            epsilon = 1e-12
        );
        assert_eq!(parse_hms_to_hours("1 2"), None);
        assert_eq!(parse_hms_to_hours("1 2 3.4.5"), None);
        assert_eq!(parse_hms_to_hours("1 61 3"), None);
    }

    #[test]
    fn test_parse_dms() {
        assert_abs_diff_eq!(
            parse_dms_to_degrees("-00 30 14.2").unwrap(),
            -0.5039444444444444,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            parse_dms_to_degrees("+13 55 42.7").unwrap(),
            13.928527777777777,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            parse_dms_to_degrees("89 15 50.2").unwrap(),
            89.26394444444445,
            epsilon = 1e-12
        );
        assert_eq!(parse_dms_to_degrees("89 15"), None);
    }

    #[test]
    fn test_format_parse_roundtrip() {
        for &h in &[0.0, 5.242297, 12.999999, 23.5] {
            let parsed = parse_hms_to_hours(&hours_to_hms(h).replace(['h', 'm', 's'], "")).unwrap();
            assert_abs_diff_eq!(parsed, h, epsilon = 0.01 / 3600.0);
        }
    }
}
