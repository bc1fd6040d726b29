use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::TeacherService;
use crate::models::teachers::TeacherQueryParams;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{not_found, storage_error, tenant_scope};
use crate::try_respond;

pub async fn list_teachers(
    service: &TeacherService,
    query: TeacherQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.list_teachers(&scope, query).await {
        Ok(teachers) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            teachers,
            "Teachers retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list teachers", e)),
    }
}

pub async fn get_teacher(
    service: &TeacherService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_teacher(scope.company_id, id).await {
        Ok(Some(teacher)) if scope.can_access_branch(teacher.branch_id) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(teacher, "Teacher retrieved successfully"))),
        Ok(_) => Ok(not_found(ErrorCode::TeacherNotFound, "Teacher not found")),
        Err(e) => Ok(storage_error("Failed to get teacher", e)),
    }
}
