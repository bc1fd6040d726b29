use crate::models::students::Student;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
    pub enum GroupStatus {
        Active => "active",
        Paused => "paused",
        Archived => "archived",
    }
}

// 班组
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct Group {
    pub id: i64,
    pub company_id: i64,
    pub branch_id: Option<i64>,
    pub name: String,
    pub subject: Option<String>,
    pub level: Option<String>,
    pub teacher_id: Option<i64>,
    pub room_id: Option<i64>,
    pub max_students: i32,
    /// 当前成员数
    pub student_count: i64,
    pub status: GroupStatus,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Group {
    pub fn is_full(&self) -> bool {
        self.student_count >= i64::from(self.max_students)
    }
}

// 班组成员
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupMember {
    pub group_id: i64,
    pub student: Student,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

/// 加入班组的结果
#[derive(Debug, Clone)]
pub enum GroupJoinOutcome {
    Added(GroupMember),
    AlreadyMember,
    Full,
}
