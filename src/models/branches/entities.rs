use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 分校
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/branch.ts")]
pub struct Branch {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
