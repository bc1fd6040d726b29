//! 角色实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub permissions: String,
    pub is_system: bool,
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
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_role(self) -> crate::models::roles::Role {
        use crate::models::common::from_timestamp;
        use crate::models::roles::{Permission, Role};

        // 权限以 JSON 数组保存，忽略已不存在的权限
        let permissions = serde_json::from_str::<Vec<String>>(&self.permissions)
            .unwrap_or_default()
            .iter()
            .filter_map(|p| p.parse::<Permission>().ok())
            .collect();

        Role {
            id: self.id,
            company_id: self.company_id,
            name: self.name,
            description: self.description,
            permissions,
            is_system: self.is_system,
            created_at: from_timestamp(self.created_at),
            updated_at: from_timestamp(self.updated_at),
        }
    }
}
