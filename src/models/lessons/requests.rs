use super::entities::{AttendanceStatus, LessonStatus};
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 课程列表查询，按开始时间升序
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct LessonQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    /// 课程结束时间晚于 from
    pub from: Option<chrono::DateTime<chrono::Utc>>,
    /// 课程开始时间早于 to
    pub to: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub teacher_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub room_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub group_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub student_id: Option<i64>,
    pub status: Option<LessonStatus>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub branch_id: Option<i64>,
}

// 创建课程；存在冲突时返回 409，force 为 true 时忽略冲突
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct CreateLessonRequest {
    pub teacher_id: i64,
    pub group_id: Option<i64>,
    pub student_id: Option<i64>,
    pub room_id: Option<i64>,
    pub branch_id: Option<i64>,
    pub subject: Option<String>,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub notes: Option<String>,
    #[serde(default)]
    pub force: bool,
}

// 更新课程
//
// 提供 group_id 时会清除 student_id，反之亦然。group_id、student_id、room_id
// 显式传 null 表示清空，两者都清空即为公开课。
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct UpdateLessonRequest {
    pub teacher_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::de::nullable")]
    pub group_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "crate::models::common::de::nullable")]
    pub student_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "crate::models::common::de::nullable")]
    pub room_id: Option<Option<i64>>,
    pub subject: Option<String>,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub notes: Option<String>,
    /// 只允许 scheduled 与 missed
    pub status: Option<LessonStatus>,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct CheckConflictsRequest {
    pub teacher_id: Option<i64>,
    pub room_id: Option<i64>,
    pub group_id: Option<i64>,
    pub student_id: Option<i64>,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    /// 编辑已有课程时排除其自身
    pub exclude_lesson_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct SuggestTimesRequest {
    /// 机构本地日期 YYYY-MM-DD
    pub date: String,
    /// 默认取 lessons.default_duration_minutes
    pub duration_minutes: Option<i64>,
    pub teacher_id: Option<i64>,
    pub room_id: Option<i64>,
    pub group_id: Option<i64>,
    pub student_id: Option<i64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct AttendanceInput {
    pub student_id: i64,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/lesson.ts")]
pub struct CompleteLessonRequest {
    #[serde(default)]
    pub attendance: Vec<AttendanceInput>,
    pub notes: Option<String>,
}
