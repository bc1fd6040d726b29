//! 线索实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "leads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub branch_id: Option<i64>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub source: Option<String>,
    pub status: String,
    pub assigned_to: Option<i64>,
    pub student_id: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::lead_activities::Entity")]
    Activities,
    #[sea_orm(has_many = "super::lead_tasks::Entity")]
    Tasks,
}

impl Related<super::lead_activities::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activities.def()
    }
}

impl Related<super::lead_tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_lead(self) -> crate::models::leads::Lead {
        use crate::models::common::from_timestamp;
        use crate::models::leads::{Lead, LeadStatus};

        Lead {
            id: self.id,
            company_id: self.company_id,
            branch_id: self.branch_id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            source: self.source,
            status: self.status.parse().unwrap_or(LeadStatus::New),
            assigned_to: self.assigned_to,
            student_id: self.student_id,
            notes: self.notes,
            created_at: from_timestamp(self.created_at),
            updated_at: from_timestamp(self.updated_at),
        }
    }
}
