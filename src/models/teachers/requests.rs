use super::entities::TeacherStatus;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/teacher.ts")]
pub struct TeacherQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    /// 按姓名、电话、邮箱模糊搜索
    pub search: Option<String>,
    pub status: Option<TeacherStatus>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub branch_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/teacher.ts")]
pub struct CreateTeacherRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
    pub hourly_rate: Option<f64>,
    pub status: Option<TeacherStatus>,
    pub hired_at: Option<String>,
    pub notes: Option<String>,
    pub branch_id: Option<i64>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/teacher.ts")]
pub struct UpdateTeacherRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub subjects: Option<Vec<String>>,
    pub hourly_rate: Option<f64>,
    pub status: Option<TeacherStatus>,
    pub hired_at: Option<String>,
    pub notes: Option<String>,
    pub branch_id: Option<i64>,
    pub user_id: Option<i64>,
}
