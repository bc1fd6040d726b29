use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    // 账号级别：平台管理员、机构所有者、员工
    #[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
    pub enum UserRole {
        SuperAdmin => "super_admin",
        Owner => "owner",
        Staff => "staff",
    }
}

impl UserRole {
    pub fn platform_roles() -> &'static [&'static UserRole] {
        &[&Self::SuperAdmin]
    }
    pub fn tenant_roles() -> &'static [&'static UserRole] {
        &[&Self::Owner, &Self::Staff]
    }
    pub fn owner_roles() -> &'static [&'static UserRole] {
        &[&Self::Owner]
    }
}

crate::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
    pub enum UserStatus {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct User {
    pub id: i64,
    pub company_id: Option<i64>,
    pub branch_id: Option<i64>,
    pub role_id: Option<i64>,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    #[ts(skip)]
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub display_name: Option<String>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }

    pub fn is_owner(&self) -> bool {
        self.role == UserRole::Owner
    }

    // 生成 token 对（access + refresh）
    pub fn generate_token_pair(
        &self,
        refresh_token_expiry: Option<chrono::TimeDelta>,
    ) -> Result<crate::utils::jwt::TokenPair, String> {
        crate::utils::jwt::JwtUtils::generate_token_pair(
            self.id,
            self.role.as_str(),
            self.company_id,
            refresh_token_expiry,
        )
        .map_err(|e| format!("Failed to generate token pair: {e}"))
    }
}
