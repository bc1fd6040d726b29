pub mod catalog;
pub mod manage;
pub mod query;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::roles::{CreateRoleRequest, RoleQueryParams, UpdateRoleRequest};
use crate::services::common::lazy_service;

lazy_service!(RoleService);

impl RoleService {
    // 权限目录
    pub async fn list_permissions(&self) -> ActixResult<HttpResponse> {
        catalog::list_permissions().await
    }

    pub async fn list_roles(
        &self,
        query: RoleQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        query::list_roles(self, query, request).await
    }

    pub async fn get_role(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        query::get_role(self, id, request).await
    }

    pub async fn create_role(
        &self,
        req: CreateRoleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_role(self, req, request).await
    }

    // 修改后清除该角色的权限缓存
    pub async fn update_role(
        &self,
        id: i64,
        update: UpdateRoleRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_role(self, id, update, request).await
    }

    pub async fn delete_role(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::delete_role(self, id, request).await
    }
}
