//! 课程实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lessons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub branch_id: Option<i64>,
    pub group_id: Option<i64>,
    pub student_id: Option<i64>,
    pub teacher_id: i64,
    pub room_id: Option<i64>,
    pub subject: Option<String>,
    pub start_time: i64,
    pub end_time: i64,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::teachers::Entity",
        from = "Column::TeacherId",
        to = "super::teachers::Column::Id"
    )]
    Teacher,
    #[sea_orm(has_many = "super::lesson_attendance::Entity")]
    Attendance,
}

impl Related<super::teachers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::lesson_attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_lesson(self) -> crate::models::lessons::Lesson {
        use crate::models::common::from_timestamp;
        use crate::models::lessons::{Lesson, LessonStatus};

        Lesson {
            id: self.id,
            company_id: self.company_id,
            branch_id: self.branch_id,
            group_id: self.group_id,
            student_id: self.student_id,
            teacher_id: self.teacher_id,
            room_id: self.room_id,
            subject: self.subject,
            start_time: from_timestamp(self.start_time),
            end_time: from_timestamp(self.end_time),
            status: self.status.parse().unwrap_or(LessonStatus::Scheduled),
            notes: self.notes,
            created_at: from_timestamp(self.created_at),
            updated_at: from_timestamp(self.updated_at),
        }
    }
}
