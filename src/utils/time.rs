//! Clock time parsing helpers.

use regex::Regex;

/// A "(H:MM - H:MM)" clock range parsed from an event cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
}

/// Parse a time range like "(13:00 - 16:00)" out of free text.
///
/// Hours may be 1–2 digits, minutes are zero-padded. Returns `None` on any
/// non-matching input instead of failing; callers drop such rows silently.
pub fn parse_time_range(text: &str) -> Option<TimeRange> {
    let pattern = Regex::new(r"\((\d{1,2}):(\d{2})\s*-\s*(\d{1,2}):(\d{2})\)").ok()?;
    let caps = pattern.captures(text)?;

    let field = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
    let range = TimeRange {
        start_hour: field(1)?,
        start_minute: field(2)?,
        end_hour: field(3)?,
        end_minute: field(4)?,
    };

    if range.start_hour > 23 || range.end_hour > 23 || range.start_minute > 59 || range.end_minute > 59
    {
        return None;
    }
    Some(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_range() {
        let range = parse_time_range("Sala B04 (13:00 - 16:00)").unwrap();
        assert_eq!(range.start_hour, 13);
        assert_eq!(range.start_minute, 0);
        assert_eq!(range.end_hour, 16);
        assert_eq!(range.end_minute, 0);
    }

    #[test]
    fn test_parse_single_digit_hour() {
        let range = parse_time_range("(9:15 - 10:45)").unwrap();
        assert_eq!(range.start_hour, 9);
        assert_eq!(range.start_minute, 15);
        assert_eq!(range.end_hour, 10);
        assert_eq!(range.end_minute, 45);
    }

    #[test]
    fn test_parse_tolerates_missing_spaces() {
        assert!(parse_time_range("(13:00-16:00)").is_some());
    }

    #[test]
    fn test_non_matching_returns_none() {
        assert!(parse_time_range("").is_none());
        assert!(parse_time_range("13:00 - 16:00").is_none());
        assert!(parse_time_range("(13h00 - 16h00)").is_none());
        assert!(parse_time_range("(1300 - 1600)").is_none());
    }

    #[test]
    fn test_out_of_range_clock_values_rejected() {
        assert!(parse_time_range("(25:00 - 26:00)").is_none());
        assert!(parse_time_range("(13:75 - 16:00)").is_none());
    }
}
