use crate::models::leads::LeadStatus;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct TodayLessons {
    pub scheduled: i64,
    pub completed: i64,
    pub cancelled: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct LeadStatusCount {
    pub status: LeadStatus,
    pub count: i64,
}

// 仪表盘统计
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/dashboard.ts")]
pub struct DashboardStats {
    pub active_students: i64,
    pub active_teachers: i64,
    pub active_groups: i64,
    pub today_lessons: TodayLessons,
    pub leads_by_status: Vec<LeadStatusCount>,
    pub month_income: f64,
    pub month_expense: f64,
    /// 7 天内到期的有效套餐
    pub expiring_subscriptions: i64,
    /// 剩余课时不超过 2 的有效套餐
    pub low_balance_subscriptions: i64,
    pub currency: String,
}

/// 仪表盘统计的时间窗口（unix 秒与机构本地日期）
#[derive(Debug, Clone)]
pub struct DashboardWindow {
    pub day_start: i64,
    pub day_end: i64,
    pub month_start: i64,
    pub month_end: i64,
    /// 今天，YYYY-MM-DD
    pub today: String,
    /// 到期提醒截止日，YYYY-MM-DD
    pub expiring_until: String,
    pub low_balance_threshold: i32,
}
