use serde::Deserialize;
use ts_rs::TS;

// 登录请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginRequest {
    /// 用户名或邮箱
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

// 注册机构：同时创建默认分校、系统角色和所有者账号
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct RegisterCompanyRequest {
    pub company_name: String,
    /// 留空时由机构名称生成
    pub company_slug: Option<String>,
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}
