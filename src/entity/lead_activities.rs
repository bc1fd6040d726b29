//! 线索跟进记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lead_activities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub lead_id: i64,
    pub kind: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_by: Option<i64>,
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
    pub fn into_activity(self) -> crate::models::leads::LeadActivity {
        use crate::models::common::from_timestamp;
        use crate::models::leads::{ActivityKind, LeadActivity};

        LeadActivity {
            id: self.id,
            lead_id: self.lead_id,
            kind: self.kind.parse().unwrap_or(ActivityKind::Note),
            content: self.content,
            created_by: self.created_by,
            created_at: from_timestamp(self.created_at),
        }
    }
}
