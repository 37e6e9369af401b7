use chrono::{DateTime, Local};
use std::time::Duration;

/// Two decimals with trailing zeros dropped: `12.50` becomes `12.5`, `100.00`
/// becomes `100`.
pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        s => s.to_string(),
    }
}

/// Whole seconds as `HH:MM:SS`; hours are not wrapped at 24.
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

pub fn format_datetime(at: &DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(12.5), "12.5");
        assert_eq!(format_percentage(100.0), "100");
        assert_eq!(format_percentage(33.333333), "33.33");
        assert_eq!(format_percentage(66.666666), "66.67");
        assert_eq!(format_percentage(0.0), "0");
    }

    #[test]
    fn test_format_percentage_non_finite() {
        assert_eq!(format_percentage(f64::NAN), "0");
        assert_eq!(format_percentage(f64::INFINITY), "0");
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(Duration::ZERO), "00:00:00");
        assert_eq!(format_hms(Duration::from_millis(59_999)), "00:00:59");
        assert_eq!(format_hms(Duration::from_secs(3_725)), "01:02:05");
        assert_eq!(format_hms(Duration::from_secs(100 * 3600)), "100:00:00");
    }

    #[test]
    fn test_format_datetime() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_datetime(&at), "2024-03-09 07:05:01");
    }
}
