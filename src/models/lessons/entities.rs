use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
    pub enum LessonStatus {
        Scheduled => "scheduled",
        Completed => "completed",
        Cancelled => "cancelled",
        Missed => "missed",
    }
}

crate::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
    pub enum AttendanceStatus {
        Present => "present",
        Absent => "absent",
        Late => "late",
        Excused => "excused",
    }
}

impl AttendanceStatus {
    /// 是否需要扣课；缺勤是否扣课由机构设置决定
    pub fn is_charged(&self, charge_absent: bool) -> bool {
        match self {
            AttendanceStatus::Present | AttendanceStatus::Late => true,
            AttendanceStatus::Absent => charge_absent,
            AttendanceStatus::Excused => false,
        }
    }
}

crate::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
    pub enum ConflictKind {
        Teacher => "teacher",
        Room => "room",
        Group => "group",
        Student => "student",
        Capacity => "capacity",
    }
}

// 课程
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct Lesson {
    pub id: i64,
    pub company_id: i64,
    pub branch_id: Option<i64>,
    pub group_id: Option<i64>,
    pub student_id: Option<i64>,
    pub teacher_id: i64,
    pub room_id: Option<i64>,
    pub subject: Option<String>,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub status: LessonStatus,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 考勤记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct LessonAttendance {
    pub id: i64,
    pub lesson_id: i64,
    pub student_id: i64,
    pub status: AttendanceStatus,
    /// 被扣课的学员套餐
    pub subscription_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 排课冲突
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct LessonConflict {
    pub kind: ConflictKind,
    /// 容量冲突没有对应的课程
    pub lesson_id: Option<i64>,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub message: String,
}
