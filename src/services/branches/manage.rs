use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::BranchService;
use crate::models::branches::{CreateBranchRequest, UpdateBranchRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{conflict, not_found, storage_error, tenant_scope};
use crate::utils::validate::{optional_phone, optional_text, required_text, validate_phone};
use crate::{try_respond, try_validate};

pub async fn create_branch(
    service: &BranchService,
    mut req: CreateBranchRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    req.name = try_validate!(
        required_text("name", &req.name, 128),
        ErrorCode::ValidationFailed
    );
    req.address = optional_text(req.address);
    req.phone = try_validate!(optional_phone(req.phone), ErrorCode::ValidationFailed);

    match storage.create_branch(scope.company_id, req).await {
        Ok(branch) => {
            info!("Branch {} created in company {}", branch.id, scope.company_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                branch,
                "Branch created successfully",
            )))
        }
        Err(e) => Ok(storage_error("Failed to create branch", e)),
    }
}

pub async fn update_branch(
    service: &BranchService,
    id: i64,
    mut update: UpdateBranchRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    if !scope.can_access_branch(Some(id)) {
        return Ok(not_found(ErrorCode::BranchNotFound, "Branch not found"));
    }

    if let Some(name) = update.name.take() {
        update.name = Some(try_validate!(
            required_text("name", &name, 128),
            ErrorCode::ValidationFailed
        ));
    }
    // 空串表示清除
    if let Some(phone) = update.phone.as_deref().map(str::trim)
        && !phone.is_empty()
    {
        try_validate!(validate_phone(phone), ErrorCode::ValidationFailed);
    }

    match storage.update_branch(scope.company_id, id, update).await {
        Ok(Some(branch)) => {
            info!("Branch {} updated", branch.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                branch,
                "Branch updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::BranchNotFound, "Branch not found")),
        Err(e) => Ok(storage_error("Failed to update branch", e)),
    }
}

pub async fn delete_branch(
    service: &BranchService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    if !scope.can_access_branch(Some(id)) {
        return Ok(not_found(ErrorCode::BranchNotFound, "Branch not found"));
    }

    match storage.count_branch_users(scope.company_id, id).await {
        Ok(0) => {}
        Ok(count) => {
            return Ok(conflict(
                ErrorCode::BranchInUse,
                format!("Branch still has {count} user(s)"),
            ));
        }
        Err(e) => return Ok(storage_error("Failed to count branch users", e)),
    }

    match storage.delete_branch(scope.company_id, id).await {
        Ok(true) => {
            info!("Branch {} deleted from company {}", id, scope.company_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Branch deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::BranchNotFound, "Branch not found")),
        Err(e) => Ok(storage_error("Failed to delete branch", e)),
    }
}
