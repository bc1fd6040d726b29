//! 收支流水实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payment_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub branch_id: Option<i64>,
    pub student_id: Option<i64>,
    pub subscription_id: Option<i64>,
    pub amount: f64,
    pub kind: String,
    pub method: String,
    pub category: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub occurred_at: i64,
    pub created_by: Option<i64>,
    pub created_at: i64,
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
    pub fn into_transaction(self) -> crate::models::finance::PaymentTransaction {
        use crate::models::common::from_timestamp;
        use crate::models::finance::{PaymentMethod, PaymentTransaction, TransactionKind};

        PaymentTransaction {
            id: self.id,
            company_id: self.company_id,
            branch_id: self.branch_id,
            student_id: self.student_id,
            subscription_id: self.subscription_id,
            amount: self.amount,
            kind: self.kind.parse().unwrap_or(TransactionKind::Income),
            method: self.method.parse().unwrap_or(PaymentMethod::Cash),
            category: self.category,
            description: self.description,
            occurred_at: from_timestamp(self.occurred_at),
            created_by: self.created_by,
            created_at: from_timestamp(self.created_at),
        }
    }
}
