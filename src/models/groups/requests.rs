use super::entities::GroupStatus;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub status: Option<GroupStatus>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub branch_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct CreateGroupRequest {
    pub name: String,
    pub subject: Option<String>,
    pub level: Option<String>,
    pub teacher_id: Option<i64>,
    pub room_id: Option<i64>,
    pub max_students: i32,
    pub status: Option<GroupStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub level: Option<String>,
    pub teacher_id: Option<i64>,
    pub room_id: Option<i64>,
    pub max_students: Option<i32>,
    pub status: Option<GroupStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct AddGroupStudentRequest {
    pub student_id: i64,
}
