//! 考勤实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lesson_attendance")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub lesson_id: i64,
    pub student_id: i64,
    pub status: String,
    pub subscription_id: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lessons::Entity",
        from = "Column::LessonId",
        to = "super::lessons::Column::Id"
    )]
    Lesson,
}

impl Related<super::lessons::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lesson.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_attendance(self) -> crate::models::lessons::LessonAttendance {
        use crate::models::common::from_timestamp;
        use crate::models::lessons::{AttendanceStatus, LessonAttendance};

        LessonAttendance {
            id: self.id,
            lesson_id: self.lesson_id,
            student_id: self.student_id,
            status: self.status.parse().unwrap_or(AttendanceStatus::Present),
            subscription_id: self.subscription_id,
            created_at: from_timestamp(self.created_at),
        }
    }
}
