pub mod manage;
pub mod members;
pub mod query;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::groups::{
    AddGroupStudentRequest, CreateGroupRequest, Group, GroupQueryParams, UpdateGroupRequest,
};
use crate::models::{ErrorCode, TenantScope};
use crate::services::common::{lazy_service, not_found, storage_error};
use crate::storage::Storage;

lazy_service!(GroupService);

impl GroupService {
    pub async fn list_groups(
        &self,
        query: GroupQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        query::list_groups(self, query, request).await
    }

    pub async fn get_group(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        query::get_group(self, id, request).await
    }

    pub async fn create_group(
        &self,
        req: CreateGroupRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_group(self, req, request).await
    }

    pub async fn update_group(
        &self,
        id: i64,
        update: UpdateGroupRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_group(self, id, update, request).await
    }

    pub async fn delete_group(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::delete_group(self, id, request).await
    }

    // 班组成员
    pub async fn list_members(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        members::list_members(self, id, request).await
    }

    // 加入班组，检查重复与人数上限
    pub async fn add_member(
        &self,
        id: i64,
        req: AddGroupStudentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        members::add_member(self, id, req, request).await
    }

    pub async fn remove_member(
        &self,
        id: i64,
        student_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        members::remove_member(self, id, student_id, request).await
    }
}

/// 当前用户可见的班组，不可见时返回 404 响应
async fn visible_group(
    storage: &dyn Storage,
    scope: &TenantScope,
    id: i64,
) -> Result<Group, HttpResponse> {
    match storage.get_group(scope.company_id, id).await {
        Ok(Some(group)) if scope.can_access_branch(group.branch_id) => Ok(group),
        Ok(_) => Err(not_found(ErrorCode::GroupNotFound, "Group not found")),
        Err(e) => Err(storage_error("Failed to get group", e)),
    }
}
