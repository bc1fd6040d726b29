use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RoleService;
use crate::models::roles::RoleQueryParams;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{not_found, storage_error, tenant_scope};
use crate::try_respond;

pub async fn list_roles(
    service: &RoleService,
    query: RoleQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.list_roles(scope.company_id, query).await {
        Ok(roles) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            roles,
            "Roles retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list roles", e)),
    }
}

pub async fn get_role(
    service: &RoleService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_role(scope.company_id, id).await {
        Ok(Some(role)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            role,
            "Role retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::RoleNotFound, "Role not found")),
        Err(e) => Ok(storage_error("Failed to get role", e)),
    }
}
