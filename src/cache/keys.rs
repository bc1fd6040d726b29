//! 缓存键

/// 按 access token 缓存的已认证用户
pub fn user_by_token(token: &str) -> String {
    format!("user:{token}")
}

/// 角色权限集合
pub fn role_permissions(role_id: i64) -> String {
    format!("role:{role_id}:permissions")
}

/// 机构设置
pub fn company_settings(company_id: i64) -> String {
    format!("company:{company_id}:settings")
}

/// 机构状态（是否停用）
pub fn company_status(company_id: i64) -> String {
    format!("company:{company_id}:status")
}
