use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/teacher.ts")]
    pub enum TeacherStatus {
        Active => "active",
        Inactive => "inactive",
        OnLeave => "on_leave",
    }
}

// 教师
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/teacher.ts")]
pub struct Teacher {
    pub id: i64,
    pub company_id: i64,
    pub branch_id: Option<i64>,
    /// 关联的登录账号（可选）
    pub user_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub subjects: Vec<String>,
    pub hourly_rate: f64,
    pub status: TeacherStatus,
    /// YYYY-MM-DD
    pub hired_at: Option<String>,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Teacher {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
