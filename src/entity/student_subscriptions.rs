//! 学员套餐实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub student_id: i64,
    pub subscription_type_id: i64,
    pub group_id: Option<i64>,
    pub lessons_total: i32,
    pub lessons_used: i32,
    pub price_paid: f64,
    pub start_date: String,
    pub end_date: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::subscription_types::Entity",
        from = "Column::SubscriptionTypeId",
        to = "super::subscription_types::Column::Id"
    )]
    SubscriptionType,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::subscription_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubscriptionType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    /// `today` 为机构本地日期，用于判断是否过期
    pub fn into_subscription(self, today: chrono::NaiveDate) -> crate::models::subscriptions::StudentSubscription {
        use crate::models::common::from_timestamp;
        use crate::models::subscriptions::{
            StudentSubscription, SubscriptionStatus, effective_status,
        };

        let status = self.status.parse().unwrap_or(SubscriptionStatus::Active);
        let lessons_remaining = (self.lessons_total - self.lessons_used).max(0);
        let end_date = chrono::NaiveDate::parse_from_str(&self.end_date, "%Y-%m-%d").ok();

        StudentSubscription {
            id: self.id,
            company_id: self.company_id,
            student_id: self.student_id,
            subscription_type_id: self.subscription_type_id,
            group_id: self.group_id,
            lessons_total: self.lessons_total,
            lessons_used: self.lessons_used,
            lessons_remaining,
            price_paid: self.price_paid,
            start_date: self.start_date,
            end_date: self.end_date,
            status,
            effective_status: effective_status(status, lessons_remaining, end_date, today),
            created_at: from_timestamp(self.created_at),
            updated_at: from_timestamp(self.updated_at),
        }
    }
}
