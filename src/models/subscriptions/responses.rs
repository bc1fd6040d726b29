use super::entities::StudentSubscription;
use crate::models::finance::PaymentTransaction;
use serde::Serialize;
use ts_rs::TS;

// 购买结果：套餐与对应的收入流水，免费套餐没有流水
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/subscription.ts")]
pub struct PurchaseSubscriptionResponse {
    pub subscription: StudentSubscription,
    pub transaction: Option<PaymentTransaction>,
}
