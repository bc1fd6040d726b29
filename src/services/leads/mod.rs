pub mod activities;
pub mod funnel;
pub mod manage;
pub mod tasks;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::leads::{
    ChangeLeadStatusRequest, ConvertLeadRequest, CreateActivityRequest, CreateLeadRequest,
    CreateTaskRequest, Lead, LeadQueryParams, UpdateLeadRequest, UpdateTaskRequest,
};
use crate::models::{ErrorCode, TenantScope};
use crate::services::common::{bad_request, lazy_service, not_found, storage_error};
use crate::storage::Storage;

lazy_service!(LeadService);

impl LeadService {
    pub async fn list_leads(
        &self,
        query: LeadQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::list_leads(self, query, request).await
    }

    pub async fn get_lead(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::get_lead(self, id, request).await
    }

    pub async fn create_lead(
        &self,
        req: CreateLeadRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_lead(self, req, request).await
    }

    pub async fn update_lead(
        &self,
        id: i64,
        update: UpdateLeadRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_lead(self, id, update, request).await
    }

    pub async fn delete_lead(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::delete_lead(self, id, request).await
    }

    // 按漏斗规则修改状态
    pub async fn change_status(
        &self,
        id: i64,
        req: ChangeLeadStatusRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        funnel::change_status(self, id, req, request).await
    }

    // 转化为学员
    pub async fn convert(
        &self,
        id: i64,
        req: ConvertLeadRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        funnel::convert_lead(self, id, req, request).await
    }

    pub async fn list_activities(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        activities::list_activities(self, id, request).await
    }

    pub async fn create_activity(
        &self,
        id: i64,
        req: CreateActivityRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        activities::create_activity(self, id, req, request).await
    }

    pub async fn list_tasks(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        tasks::list_tasks(self, id, request).await
    }

    pub async fn create_task(
        &self,
        id: i64,
        req: CreateTaskRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        tasks::create_task(self, id, req, request).await
    }

    pub async fn update_task(
        &self,
        id: i64,
        task_id: i64,
        update: UpdateTaskRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        tasks::update_task(self, id, task_id, update, request).await
    }

    pub async fn delete_task(
        &self,
        id: i64,
        task_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        tasks::delete_task(self, id, task_id, request).await
    }
}

async fn visible_lead(
    storage: &dyn Storage,
    scope: &TenantScope,
    id: i64,
) -> Result<Lead, HttpResponse> {
    match storage.get_lead(scope.company_id, id).await {
        Ok(Some(lead)) if scope.can_access_branch(lead.branch_id) => Ok(lead),
        Ok(_) => Err(not_found(ErrorCode::LeadNotFound, "Lead not found")),
        Err(e) => Err(storage_error("Failed to get lead", e)),
    }
}

/// 负责人必须是本机构的账号
async fn check_assignee(
    storage: &dyn Storage,
    scope: &TenantScope,
    user_id: Option<i64>,
) -> Result<(), HttpResponse> {
    let Some(user_id) = user_id else {
        return Ok(());
    };
    match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) if user.company_id == Some(scope.company_id) => Ok(()),
        Ok(_) => Err(bad_request(
            ErrorCode::UserNotFound,
            format!("User {user_id} not found"),
        )),
        Err(e) => Err(storage_error("Failed to load user", e)),
    }
}
