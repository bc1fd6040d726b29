use super::entities::{PaymentMethod, TransactionKind};
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 日期均为机构本地日期 YYYY-MM-DD，包含首尾两天
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct TransactionQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub from: Option<String>,
    pub to: Option<String>,
    pub kind: Option<TransactionKind>,
    pub method: Option<PaymentMethod>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub student_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct FinanceRangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct CreateTransactionRequest {
    pub amount: f64,
    pub kind: TransactionKind,
    pub method: PaymentMethod,
    pub category: Option<String>,
    pub description: Option<String>,
    /// 默认当前时间
    pub occurred_at: Option<chrono::DateTime<chrono::Utc>>,
    pub student_id: Option<i64>,
    pub subscription_id: Option<i64>,
    pub branch_id: Option<i64>,
}

// 以下为存储层查询条件，时间已换算为 unix 秒

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub from_ts: Option<i64>,
    pub to_ts: Option<i64>,
    pub kind: Option<TransactionKind>,
    pub method: Option<PaymentMethod>,
    pub student_id: Option<i64>,
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub branch_id: Option<i64>,
    pub student_id: Option<i64>,
    pub subscription_id: Option<i64>,
    pub amount: f64,
    pub kind: TransactionKind,
    pub method: PaymentMethod,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_at: i64,
    pub created_by: Option<i64>,
}
