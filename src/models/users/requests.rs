use super::entities::UserStatus;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 员工列表查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<UserStatus>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub role_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub branch_id: Option<i64>,
    pub search: Option<String>,
}

// 员工创建请求
//
// 通过该接口创建的账号总是 staff，owner 只在注册机构时产生。
// `password` 在进入存储层之前会被替换为哈希值。
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    pub role_id: Option<i64>,
    pub branch_id: Option<i64>,
}

// 员工更新请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub role_id: Option<i64>,
    pub branch_id: Option<i64>,
    pub status: Option<UserStatus>,
}

// 写入存储层的新账号，密码已哈希
#[derive(Debug, Clone)]
pub struct NewUser {
    pub company_id: Option<i64>,
    pub branch_id: Option<i64>,
    pub role_id: Option<i64>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: super::entities::UserRole,
    pub display_name: Option<String>,
}
