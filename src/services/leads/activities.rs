use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{LeadService, visible_lead};
use crate::middlewares::RequireJWT;
use crate::models::leads::{ActivityKind, CreateActivityRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{bad_request, storage_error, tenant_scope};
use crate::utils::validate::required_text;
use crate::{try_respond, try_validate};

pub async fn list_activities(
    service: &LeadService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    try_respond!(visible_lead(storage.as_ref(), &scope, id).await);

    match storage.list_lead_activities(id).await {
        Ok(activities) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            activities,
            "Activities retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list activities", e)),
    }
}

pub async fn create_activity(
    service: &LeadService,
    id: i64,
    req: CreateActivityRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    try_respond!(visible_lead(storage.as_ref(), &scope, id).await);

    // status_change 只由状态流转写入
    if req.kind == ActivityKind::StatusChange {
        return Ok(bad_request(
            ErrorCode::ValidationFailed,
            "status_change activities are recorded automatically",
        ));
    }
    let content = try_validate!(
        required_text("content", &req.content, 4000),
        ErrorCode::ValidationFailed
    );

    match storage
        .create_lead_activity(id, req.kind, content, RequireJWT::extract_user_id(request))
        .await
    {
        Ok(activity) => Ok(HttpResponse::Created().json(ApiResponse::success(
            activity,
            "Activity created successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to create activity", e)),
    }
}
