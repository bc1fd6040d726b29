pub mod manage;
pub mod purchase;
pub mod types;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::subscriptions::{
    CreateSubscriptionTypeRequest, PurchaseSubscriptionRequest, SubscriptionQueryParams,
    SubscriptionTypeQueryParams, UpdateSubscriptionRequest, UpdateSubscriptionTypeRequest,
};
use crate::services::common::lazy_service;

lazy_service!(SubscriptionService);

impl SubscriptionService {
    // 套餐类型
    pub async fn list_types(
        &self,
        query: SubscriptionTypeQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        types::list_types(self, query, request).await
    }

    pub async fn get_type(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        types::get_type(self, id, request).await
    }

    pub async fn create_type(
        &self,
        req: CreateSubscriptionTypeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        types::create_type(self, req, request).await
    }

    pub async fn update_type(
        &self,
        id: i64,
        update: UpdateSubscriptionTypeRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        types::update_type(self, id, update, request).await
    }

    pub async fn delete_type(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        types::delete_type(self, id, request).await
    }

    // 学员套餐
    pub async fn list_subscriptions(
        &self,
        query: SubscriptionQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::list_subscriptions(self, query, request).await
    }

    pub async fn get_subscription(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::get_subscription(self, id, request).await
    }

    // 购买套餐并记一笔收入
    pub async fn purchase(
        &self,
        req: PurchaseSubscriptionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        purchase::purchase_subscription(self, req, request).await
    }

    pub async fn update_subscription(
        &self,
        id: i64,
        update: UpdateSubscriptionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_subscription(self, id, update, request).await
    }

    pub async fn delete_subscription(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::delete_subscription(self, id, request).await
    }
}
