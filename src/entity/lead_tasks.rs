//! 线索待办实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lead_tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub lead_id: i64,
    pub title: String,
    pub due_at: Option<i64>,
    pub is_done: bool,
    pub assigned_to: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::leads::Entity",
        from = "Column::LeadId",
        to = "super::leads::Column::Id"
    )]
    Lead,
}

impl Related<super::leads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lead.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_task(self) -> crate::models::leads::LeadTask {
        use crate::models::common::from_timestamp;

        crate::models::leads::LeadTask {
            id: self.id,
            lead_id: self.lead_id,
            title: self.title,
            due_at: self.due_at.map(from_timestamp),
            is_done: self.is_done,
            assigned_to: self.assigned_to,
            completed_at: self.completed_at.map(from_timestamp),
            created_at: from_timestamp(self.created_at),
        }
    }
}
