use super::entities::PaymentMethod;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub income: f64,
    pub expense: f64,
    pub refund: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct DailyTotal {
    /// 机构本地日期
    pub date: String,
    pub income: f64,
    pub expense: f64,
    pub refund: f64,
    pub net: f64,
}

// 财务汇总：net = income - expense - refund
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct FinanceSummary {
    pub from: String,
    pub to: String,
    pub currency: String,
    pub total_income: f64,
    pub total_expense: f64,
    pub total_refund: f64,
    pub net: f64,
    pub transaction_count: i64,
    pub by_method: Vec<MethodTotal>,
    pub daily: Vec<DailyTotal>,
}
