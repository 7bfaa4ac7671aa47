use anyhow::Result;
use chrono::{
    DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, TimeZone,
    Timelike, Utc, Weekday,
};

/// Parse a user supplied schedule. Zoned strings keep their offset, naive ones
/// are read as local wall-clock time. Past values are accepted.
pub fn parse_schedule(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    // Try RFC3339 format (with timezone)
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return local_to_utc(naive);
        }
    }

    anyhow::bail!("Failed to parse date: {}", input)
}

fn local_to_utc(naive: NaiveDateTime) -> Result<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| anyhow::anyhow!("{} does not exist in the local timezone", naive))
}

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    let at = at.trunc_subsecs(0);
    at.with_second(0).unwrap_or(at)
}

pub fn same_minute(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    truncate_to_minute(a) == truncate_to_minute(b)
}

/// UTC ISO-8601 timestamp cut to the minute, e.g. `2025-10-15T18:00`.
pub fn iso_minute(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M").to_string()
}

/// `hour:minute` wall-clock time on `date` in `tz`. A time skipped by a DST
/// jump falls back to reading the same wall-clock value as UTC.
pub fn at_wall_clock<Tz: TimeZone>(date: NaiveDate, hour: u32, minute: u32, tz: &Tz) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
    let naive = date.and_time(time);

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// The next `weekday` strictly after `from`; the same weekday means a week later.
pub fn next_weekday(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let today = from.weekday().num_days_from_monday();
    let target = weekday.num_days_from_monday();
    let ahead = match (target + 7 - today) % 7 {
        0 => 7,
        n => n,
    };
    from.checked_add_days(Days::new(ahead.into())).unwrap_or(from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_parse_rfc3339_keeps_offset() {
        let parsed = parse_schedule("2025-10-15T19:30:00+01:00").unwrap();
        assert_eq!(parsed, utc("2025-10-15T18:30:00Z"));
    }

    #[test]
    fn test_parse_naive_formats() {
        let a = parse_schedule("2025-10-15 18:30").unwrap();
        let b = parse_schedule("2025-10-15T18:30:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_schedule("tomorrow evening").is_err());
    }

    #[test]
    fn test_truncate_to_minute() {
        let at = utc("2025-10-15T18:30:42.123Z");
        assert_eq!(truncate_to_minute(at), utc("2025-10-15T18:30:00Z"));
        assert!(same_minute(at, utc("2025-10-15T18:30:01Z")));
        assert!(!same_minute(at, utc("2025-10-15T18:31:00Z")));
    }

    #[test]
    fn test_iso_minute() {
        assert_eq!(iso_minute(utc("2025-10-15T18:30:42Z")), "2025-10-15T18:30");
    }

    #[test]
    fn test_at_wall_clock_uses_zone_offset() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 10, 16).unwrap();
        assert_eq!(at_wall_clock(date, 18, 0, &tz), utc("2025-10-16T17:00:00Z"));
    }

    #[test]
    fn test_next_weekday() {
        // 2025-10-15 is a Wednesday
        let wednesday = NaiveDate::from_ymd_opt(2025, 10, 15).unwrap();
        assert_eq!(next_weekday(wednesday, Weekday::Sat), NaiveDate::from_ymd_opt(2025, 10, 18).unwrap());
        assert_eq!(next_weekday(wednesday, Weekday::Wed), NaiveDate::from_ymd_opt(2025, 10, 22).unwrap());
        assert_eq!(next_weekday(wednesday, Weekday::Mon), NaiveDate::from_ymd_opt(2025, 10, 20).unwrap());
    }
}
