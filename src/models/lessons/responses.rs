use super::entities::{AttendanceStatus, Lesson};
use serde::Serialize;
use ts_rs::TS;

// 空闲时间段
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct TimeSlot {
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
}

// 单个学员的扣课结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct AttendanceCharge {
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub charged: bool,
    pub subscription_id: Option<i64>,
    pub lessons_remaining: Option<i32>,
    /// 需要扣课但没有可用套餐时给出提示
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct CompleteLessonResponse {
    pub lesson: Lesson,
    pub attendance: Vec<AttendanceCharge>,
}
