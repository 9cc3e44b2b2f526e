//! 时间工具函数: 模拟日内的时刻计算

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::core::{SimError, SimResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> SimResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| SimError::Config(format!("Invalid date format: {}", date)))
}

/// 日期 + 时分 → NaiveDateTime
///
/// Out-of-range hour/minute clamps to midnight.
pub fn at(date: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date.and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN))
}

/// Shift a time by a signed number of minutes
pub fn offset_minutes(time: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    time + Duration::minutes(minutes)
}

/// `days` consecutive dates starting at `start`
pub fn date_range(start: NaiveDate, days: u32) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take(days as usize)
}

/// Last date of a `days`-long window starting at `start`
pub fn window_end(start: NaiveDate, days: u32) -> NaiveDate {
    start + Duration::days(i64::from(days.saturating_sub(1)))
}

/// Times on a fixed grid between two times of day (inclusive)
pub fn time_grid(date: NaiveDate, from: NaiveTime, to: NaiveTime, step_minutes: u32) -> Vec<NaiveDateTime> {
    let step = Duration::minutes(i64::from(step_minutes.max(1)));
    let end = date.and_time(to);
    let mut t = date.and_time(from);
    let mut out = Vec::new();
    while t <= end {
        out.push(t);
        t += step;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-02-29").unwrap(), d(2024, 2, 29));
        assert!(parse_date("2024-13-01").is_err());
    }

    #[test]
    fn test_date_range_crosses_month() {
        let days: Vec<_> = date_range(d(2024, 1, 30), 3).collect();
        assert_eq!(days, vec![d(2024, 1, 30), d(2024, 1, 31), d(2024, 2, 1)]);
        assert_eq!(window_end(d(2024, 1, 30), 3), d(2024, 2, 1));
        assert_eq!(window_end(d(2024, 1, 30), 1), d(2024, 1, 30));
    }

    #[test]
    fn test_time_grid_quarter_hours() {
        let from = NaiveTime::from_hms_opt(11, 0, 0).unwrap();
        let to = NaiveTime::from_hms_opt(21, 0, 0).unwrap();
        let grid = time_grid(d(2024, 3, 1), from, to, 15);
        assert_eq!(grid.len(), 41);
        assert_eq!(grid[0], at(d(2024, 3, 1), 11, 0));
        assert_eq!(grid[40], at(d(2024, 3, 1), 21, 0));
    }

    #[test]
    fn test_offset_minutes() {
        let t = at(d(2024, 3, 1), 16, 0);
        assert_eq!(offset_minutes(t, -60), at(d(2024, 3, 1), 15, 0));
        assert_eq!(offset_minutes(t, 15), at(d(2024, 3, 1), 16, 15));
    }
}
