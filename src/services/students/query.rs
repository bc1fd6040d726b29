use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::StudentService;
use crate::models::students::StudentQueryParams;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{not_found, storage_error, tenant_scope};
use crate::try_respond;

pub async fn list_students(
    service: &StudentService,
    query: StudentQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.list_students(&scope, query).await {
        Ok(students) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            students,
            "Students retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list students", e)),
    }
}

pub async fn get_student(
    service: &StudentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_student(scope.company_id, id).await {
        Ok(Some(student)) if scope.can_access_branch(student.branch_id) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(student, "Student retrieved successfully"))),
        Ok(_) => Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => Ok(storage_error("Failed to get student", e)),
    }
}
