//! 空闲时间推荐
//!
//! 在机构本地的工作时间内按固定步长枚举候选开始时间，跳过与忙碌区间相交的时段。

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};

use crate::models::lessons::TimeSlot;
use crate::utils::local_time::local_to_utc;

pub const DEFAULT_LIMIT: usize = 5;
pub const MAX_LIMIT: usize = 20;

#[derive(Debug, Clone)]
pub struct SlotRules {
    pub work_day_start: NaiveTime,
    pub work_day_end: NaiveTime,
    pub step: Duration,
    pub offset: FixedOffset,
}

pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// 推荐空闲时段
///
/// `not_before` 之前开始的时段会被跳过，用于排除已经过去的时间。
pub fn suggest_slots(
    date: NaiveDate,
    duration: Duration,
    rules: &SlotRules,
    busy: &[(DateTime<Utc>, DateTime<Utc>)],
    not_before: Option<DateTime<Utc>>,
    limit: usize,
) -> Vec<TimeSlot> {
    let mut slots = Vec::new();
    if duration <= Duration::zero() || rules.step <= Duration::zero() {
        return slots;
    }
    let (Some(day_start), Some(day_end)) = (
        local_to_utc(rules.offset, date, rules.work_day_start),
        local_to_utc(rules.offset, date, rules.work_day_end),
    ) else {
        return slots;
    };

    let mut cursor = day_start;
    while cursor + duration <= day_end && slots.len() < limit {
        let end = cursor + duration;
        let free = busy
            .iter()
            .all(|(busy_start, busy_end)| !(cursor < *busy_end && *busy_start < end));
        if free && not_before.is_none_or(|t| cursor >= t) {
            slots.push(TimeSlot {
                start_time: cursor,
                end_time: end,
            });
        }
        cursor += rules.step;
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rules(offset_minutes: i32) -> SlotRules {
        SlotRules {
            work_day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            work_day_end: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            step: Duration::minutes(30),
            offset: FixedOffset::east_opt(offset_minutes * 60).unwrap(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn utc(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_empty_day_fills_from_work_start() {
        let slots = suggest_slots(date(), Duration::minutes(60), &rules(0), &[], None, 20);
        // 9:00 到 11:00 开始，共 5 个
        assert_eq!(slots.len(), 5);
        assert_eq!(slots[0].start_time, utc(9, 0));
        assert_eq!(slots[4].start_time, utc(11, 0));
        assert_eq!(slots[4].end_time, utc(12, 0));
    }

    #[test]
    fn test_busy_interval_is_skipped() {
        let busy = [(utc(9, 30), utc(10, 30))];
        let starts: Vec<_> = suggest_slots(date(), Duration::minutes(60), &rules(0), &busy, None, 20)
            .into_iter()
            .map(|s| s.start_time)
            .collect();
        // 与忙碌区间首尾相接的 10:30 可用
        assert_eq!(starts, vec![utc(10, 30), utc(11, 0)]);
    }

    #[test]
    fn test_offset_and_limit() {
        // UTC+3 的 9:00 是 UTC 6:00
        let slots = suggest_slots(date(), Duration::minutes(30), &rules(180), &[], None, 2);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].start_time, utc(6, 0));
        assert_eq!(slots[1].start_time, utc(6, 30));
    }

    #[test]
    fn test_past_slots_and_long_lessons() {
        let slots = suggest_slots(
            date(),
            Duration::minutes(60),
            &rules(0),
            &[],
            Some(utc(10, 15)),
            20,
        );
        assert_eq!(slots[0].start_time, utc(10, 30));

        assert!(suggest_slots(date(), Duration::hours(4), &rules(0), &[], None, 20).is_empty());
    }

    #[test]
    fn test_limit_bounds() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(100)), MAX_LIMIT);
    }
}
