pub mod export;
pub mod summary;
pub mod transactions;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::finance::{
    CreateTransactionRequest, FinanceRangeQuery, TransactionQueryParams,
};
use crate::services::common::lazy_service;

lazy_service!(FinanceService);

impl FinanceService {
    pub async fn list_transactions(
        &self,
        query: TransactionQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        transactions::list_transactions(self, query, request).await
    }

    // 手工记账
    pub async fn create_transaction(
        &self,
        req: CreateTransactionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        transactions::create_transaction(self, req, request).await
    }

    pub async fn delete_transaction(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        transactions::delete_transaction(self, id, request).await
    }

    pub async fn summary(
        &self,
        query: FinanceRangeQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        summary::get_summary(self, query, request).await
    }

    // 导出 xlsx
    pub async fn export(
        &self,
        query: FinanceRangeQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        export::export_transactions(self, query, request).await
    }
}
