//! 班组实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub branch_id: Option<i64>,
    pub name: String,
    pub subject: Option<String>,
    pub level: Option<String>,
    pub teacher_id: Option<i64>,
    pub room_id: Option<i64>,
    pub max_students: i32,
    pub status: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
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
    #[sea_orm(has_many = "super::group_students::Entity")]
    GroupStudents,
}

impl Related<super::teachers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::group_students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupStudents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_group(self, student_count: i64) -> crate::models::groups::Group {
        use crate::models::common::from_timestamp;
        use crate::models::groups::{Group, GroupStatus};

        Group {
            id: self.id,
            company_id: self.company_id,
            branch_id: self.branch_id,
            name: self.name,
            subject: self.subject,
            level: self.level,
            teacher_id: self.teacher_id,
            room_id: self.room_id,
            max_students: self.max_students,
            student_count,
            status: self.status.parse().unwrap_or(GroupStatus::Active),
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: from_timestamp(self.created_at),
            updated_at: from_timestamp(self.updated_at),
        }
    }
}
