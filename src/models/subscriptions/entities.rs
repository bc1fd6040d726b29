use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    // 数据库中保存的状态
    #[ts(export, export_to = "../frontend/src/types/generated/subscription.ts")]
    pub enum SubscriptionStatus {
        Active => "active",
        Frozen => "frozen",
        Cancelled => "cancelled",
    }
}

crate::string_enum! {
    // 对外展示的有效状态
    #[ts(export, export_to = "../frontend/src/types/generated/subscription.ts")]
    pub enum EffectiveStatus {
        Active => "active",
        Frozen => "frozen",
        Cancelled => "cancelled",
        Exhausted => "exhausted",
        Expired => "expired",
    }
}

/// 计算有效状态：取消与冻结优先，其次课时用尽，再次过期
pub fn effective_status(
    stored: SubscriptionStatus,
    lessons_remaining: i32,
    end_date: Option<NaiveDate>,
    today: NaiveDate,
) -> EffectiveStatus {
    match stored {
        SubscriptionStatus::Cancelled => EffectiveStatus::Cancelled,
        SubscriptionStatus::Frozen => EffectiveStatus::Frozen,
        SubscriptionStatus::Active if lessons_remaining <= 0 => EffectiveStatus::Exhausted,
        SubscriptionStatus::Active if end_date.is_some_and(|end| end < today) => {
            EffectiveStatus::Expired
        }
        SubscriptionStatus::Active => EffectiveStatus::Active,
    }
}

// 套餐类型
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/subscription.ts")]
pub struct SubscriptionType {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub lessons_count: i32,
    pub price: f64,
    pub duration_days: i32,
    pub is_active: bool,
    pub description: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 学员套餐
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/subscription.ts")]
pub struct StudentSubscription {
    pub id: i64,
    pub company_id: i64,
    pub student_id: i64,
    pub subscription_type_id: i64,
    pub group_id: Option<i64>,
    pub lessons_total: i32,
    pub lessons_used: i32,
    pub lessons_remaining: i32,
    pub price_paid: f64,
    pub start_date: String,
    pub end_date: String,
    pub status: SubscriptionStatus,
    pub effective_status: EffectiveStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl StudentSubscription {
    /// 能否为 `group_id` 的课程扣课
    pub fn is_usable_for(&self, group_id: Option<i64>) -> bool {
        self.effective_status == EffectiveStatus::Active
            && (self.group_id.is_none() || self.group_id == group_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_stored_status_wins() {
        let today = date("2025-03-10");
        assert_eq!(
            effective_status(SubscriptionStatus::Cancelled, 5, Some(date("2025-04-01")), today),
            EffectiveStatus::Cancelled
        );
        assert_eq!(
            effective_status(SubscriptionStatus::Frozen, 0, Some(date("2025-01-01")), today),
            EffectiveStatus::Frozen
        );
    }

    #[test]
    fn test_exhausted_before_expired() {
        let today = date("2025-03-10");
        assert_eq!(
            effective_status(SubscriptionStatus::Active, 0, Some(date("2025-01-01")), today),
            EffectiveStatus::Exhausted
        );
        assert_eq!(
            effective_status(SubscriptionStatus::Active, 3, Some(date("2025-03-09")), today),
            EffectiveStatus::Expired
        );
    }

    #[test]
    fn test_last_day_is_still_active() {
        let today = date("2025-03-10");
        assert_eq!(
            effective_status(SubscriptionStatus::Active, 1, Some(today), today),
            EffectiveStatus::Active
        );
    }
}
