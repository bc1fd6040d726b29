//! 机构（租户）实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::branches::Entity")]
    Branches,
    #[sea_orm(has_many = "super::users::Entity")]
    Users,
}

impl Related<super::branches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Branches.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_company(self) -> crate::models::companies::Company {
        use crate::models::common::from_timestamp;
        use crate::models::companies::{Company, CompanyStatus};

        Company {
            id: self.id,
            name: self.name,
            slug: self.slug,
            status: self.status.parse().unwrap_or(CompanyStatus::Active),
            created_at: from_timestamp(self.created_at),
            updated_at: from_timestamp(self.updated_at),
        }
    }
}
