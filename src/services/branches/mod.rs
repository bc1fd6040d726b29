pub mod manage;
pub mod query;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::branches::{BranchQueryParams, CreateBranchRequest, UpdateBranchRequest};
use crate::services::common::lazy_service;

lazy_service!(BranchService);

impl BranchService {
    pub async fn list_branches(
        &self,
        query: BranchQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        query::list_branches(self, query, request).await
    }

    pub async fn get_branch(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        query::get_branch(self, id, request).await
    }

    pub async fn create_branch(
        &self,
        req: CreateBranchRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_branch(self, req, request).await
    }

    pub async fn update_branch(
        &self,
        id: i64,
        update: UpdateBranchRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_branch(self, id, update, request).await
    }

    // 仍有员工的分校不能删除
    pub async fn delete_branch(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::delete_branch(self, id, request).await
    }
}
