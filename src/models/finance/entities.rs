use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
    pub enum TransactionKind {
        Income => "income",
        Expense => "expense",
        Refund => "refund",
    }
}

crate::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
    pub enum PaymentMethod {
        Cash => "cash",
        Card => "card",
        Transfer => "transfer",
        Online => "online",
    }
}

// 收支流水
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/finance.ts")]
pub struct PaymentTransaction {
    pub id: i64,
    pub company_id: i64,
    pub branch_id: Option<i64>,
    pub student_id: Option<i64>,
    pub subscription_id: Option<i64>,
    pub amount: f64,
    pub kind: TransactionKind,
    pub method: PaymentMethod,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_at: chrono::DateTime<chrono::Utc>,
    pub created_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
