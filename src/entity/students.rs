//! 学员实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub branch_id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birth_date: Option<String>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id"
    )]
    Company,
    #[sea_orm(has_many = "super::group_students::Entity")]
    GroupStudents,
    #[sea_orm(has_many = "super::student_subscriptions::Entity")]
    Subscriptions,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::group_students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupStudents.def()
    }
}

impl Related<super::student_subscriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_student(self) -> crate::models::students::Student {
        use crate::models::common::from_timestamp;
        use crate::models::students::{Student, StudentStatus};

        Student {
            id: self.id,
            company_id: self.company_id,
            branch_id: self.branch_id,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            email: self.email,
            birth_date: self.birth_date,
            parent_name: self.parent_name,
            parent_phone: self.parent_phone,
            status: self.status.parse().unwrap_or(StudentStatus::Active),
            notes: self.notes,
            created_at: from_timestamp(self.created_at),
            updated_at: from_timestamp(self.updated_at),
        }
    }
}
