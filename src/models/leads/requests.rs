use super::entities::{ActivityKind, LeadStatus};
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lead.ts")]
pub struct LeadQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    /// 按姓名、电话、邮箱模糊搜索
    pub search: Option<String>,
    pub status: Option<LeadStatus>,
    pub source: Option<String>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub assigned_to: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lead.ts")]
pub struct CreateLeadRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub source: Option<String>,
    pub assigned_to: Option<i64>,
    pub notes: Option<String>,
    pub branch_id: Option<i64>,
}

// 状态只能通过 /status 修改
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lead.ts")]
pub struct UpdateLeadRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub source: Option<String>,
    pub assigned_to: Option<i64>,
    pub notes: Option<String>,
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lead.ts")]
pub struct ChangeLeadStatusRequest {
    pub status: LeadStatus,
    pub comment: Option<String>,
}

// 转化为学员；未提供姓名时由线索姓名拆分
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lead.ts")]
pub struct ConvertLeadRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lead.ts")]
pub struct CreateActivityRequest {
    pub kind: ActivityKind,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lead.ts")]
pub struct CreateTaskRequest {
    pub title: String,
    pub due_at: Option<chrono::DateTime<chrono::Utc>>,
    pub assigned_to: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lead.ts")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub due_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_done: Option<bool>,
    pub assigned_to: Option<i64>,
}
