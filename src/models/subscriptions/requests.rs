use super::entities::EffectiveStatus;
use crate::models::common::PaginationQuery;
use crate::models::finance::PaymentMethod;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/subscription.ts")]
pub struct SubscriptionTypeQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_bool")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/subscription.ts")]
pub struct CreateSubscriptionTypeRequest {
    pub name: String,
    pub lessons_count: i32,
    pub price: f64,
    pub duration_days: i32,
    pub is_active: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/subscription.ts")]
pub struct UpdateSubscriptionTypeRequest {
    pub name: Option<String>,
    pub lessons_count: Option<i32>,
    pub price: Option<f64>,
    pub duration_days: Option<i32>,
    pub is_active: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/subscription.ts")]
pub struct SubscriptionQueryParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub student_id: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::common::de::optional_i64")]
    pub group_id: Option<i64>,
    /// 按有效状态过滤
    pub status: Option<EffectiveStatus>,
}

// 购买套餐：同时写入一笔收入流水
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/subscription.ts")]
pub struct PurchaseSubscriptionRequest {
    pub student_id: i64,
    pub subscription_type_id: i64,
    pub group_id: Option<i64>,
    /// 默认今天（机构本地日期）
    pub start_date: Option<String>,
    /// 默认套餐价格
    pub price_paid: Option<f64>,
    pub method: Option<PaymentMethod>,
    pub branch_id: Option<i64>,
}

crate::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/subscription.ts")]
    pub enum SubscriptionAction {
        Freeze => "freeze",
        Unfreeze => "unfreeze",
        Cancel => "cancel",
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/subscription.ts")]
pub struct UpdateSubscriptionRequest {
    pub action: Option<SubscriptionAction>,
    /// 延长或调整到期日
    pub end_date: Option<String>,
    /// 不能小于已用课时
    pub lessons_total: Option<i32>,
    pub group_id: Option<i64>,
}

// 购买套餐时写入的数据，日期已校验
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub student_id: i64,
    pub subscription_type_id: i64,
    pub group_id: Option<i64>,
    pub lessons_total: i32,
    pub price_paid: f64,
    pub start_date: String,
    pub end_date: String,
    /// 免费套餐不产生收入流水
    pub payment: Option<crate::models::finance::NewTransaction>,
}

// 套餐修改，None 表示不变；group_id 为 Some(None) 时解除班组绑定
#[derive(Debug, Clone, Default)]
pub struct SubscriptionPatch {
    pub status: Option<super::entities::SubscriptionStatus>,
    pub end_date: Option<String>,
    pub lessons_total: Option<i32>,
    pub group_id: Option<Option<i64>>,
}
