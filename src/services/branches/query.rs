use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::BranchService;
use crate::models::branches::BranchQueryParams;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{not_found, storage_error, tenant_scope};
use crate::try_respond;

pub async fn list_branches(
    service: &BranchService,
    query: BranchQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.list_branches(&scope, query).await {
        Ok(branches) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            branches,
            "Branches retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list branches", e)),
    }
}

pub async fn get_branch(
    service: &BranchService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_branch(scope.company_id, id).await {
        Ok(Some(branch)) if scope.can_access_branch(Some(branch.id)) => Ok(HttpResponse::Ok()
            .json(ApiResponse::success(branch, "Branch retrieved successfully"))),
        Ok(_) => Ok(not_found(ErrorCode::BranchNotFound, "Branch not found")),
        Err(e) => Ok(storage_error("Failed to get branch", e)),
    }
}
