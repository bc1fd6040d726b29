//! 机构本地时间换算，偏移量来自 `center.utc_offset_minutes`

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// 机构本地某天某时刻对应的 UTC 时间
pub fn local_to_utc(offset: FixedOffset, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// 机构本地某天的 UTC 区间 `[00:00, 次日 00:00)`
pub fn local_day_bounds(
    offset: FixedOffset,
    date: NaiveDate,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = local_to_utc(offset, date, NaiveTime::MIN)?;
    Some((start, start + Duration::days(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_day_bounds() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let offset = FixedOffset::east_opt(-300 * 60).unwrap();
        let (start, end) = local_day_bounds(offset, date).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 10, 5, 0, 0).unwrap());
        assert_eq!(end - start, Duration::days(1));
    }
}
