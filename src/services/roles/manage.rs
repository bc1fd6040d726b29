use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{debug, info};

use super::RoleService;
use crate::cache::keys;
use crate::errors::CrmError;
use crate::models::roles::entities::parse_permissions;
use crate::models::roles::{CreateRoleRequest, UpdateRoleRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{
    cache_from, conflict, forbidden, not_found, storage_error, tenant_scope,
};
use crate::utils::validate::{optional_text, required_text};
use crate::{try_respond, try_validate};

fn role_error(context: &str, err: CrmError) -> HttpResponse {
    match err {
        CrmError::UniqueViolation(_) => conflict(
            ErrorCode::RoleAlreadyExists,
            "A role with this name already exists",
        ),
        other => storage_error(context, other),
    }
}

fn invalid_permission(raw: String) -> String {
    format!("Unknown permission: {raw}")
}

pub async fn create_role(
    service: &RoleService,
    req: CreateRoleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    let name = try_validate!(
        required_text("name", &req.name, 64),
        ErrorCode::ValidationFailed
    );
    let permissions = try_validate!(
        parse_permissions(&req.permissions).map_err(invalid_permission),
        ErrorCode::PermissionInvalid
    );

    match storage
        .create_role(
            scope.company_id,
            name,
            optional_text(req.description),
            permissions,
        )
        .await
    {
        Ok(role) => {
            info!("Role {} created in company {}", role.id, scope.company_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(role, "Role created successfully")))
        }
        Err(e) => Ok(role_error("Failed to create role", e)),
    }
}

pub async fn update_role(
    service: &RoleService,
    id: i64,
    update: UpdateRoleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    let existing = match storage.get_role(scope.company_id, id).await {
        Ok(Some(role)) => role,
        Ok(None) => return Ok(not_found(ErrorCode::RoleNotFound, "Role not found")),
        Err(e) => return Ok(storage_error("Failed to get role", e)),
    };

    // 系统角色可以调整权限，但不能改名
    let name = match update.name {
        Some(name) => {
            let name = try_validate!(
                required_text("name", &name, 64),
                ErrorCode::ValidationFailed
            );
            if existing.is_system && name != existing.name {
                return Ok(forbidden(
                    ErrorCode::SystemRoleProtected,
                    "System roles cannot be renamed",
                ));
            }
            Some(name)
        }
        None => None,
    };
    let permissions = match update.permissions {
        Some(raw) => Some(try_validate!(
            parse_permissions(&raw).map_err(invalid_permission),
            ErrorCode::PermissionInvalid
        )),
        None => None,
    };

    match storage
        .update_role(scope.company_id, id, name, update.description, permissions)
        .await
    {
        Ok(Some(role)) => {
            let cache = cache_from(request)?;
            cache.remove(&keys::role_permissions(id)).await;
            debug!("Permission cache of role {} invalidated", id);
            info!("Role {} updated", id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(role, "Role updated successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::RoleNotFound, "Role not found")),
        Err(e) => Ok(role_error("Failed to update role", e)),
    }
}

pub async fn delete_role(
    service: &RoleService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_role(scope.company_id, id).await {
        Ok(Some(role)) if role.is_system => {
            return Ok(forbidden(
                ErrorCode::SystemRoleProtected,
                "System roles cannot be deleted",
            ));
        }
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::RoleNotFound, "Role not found")),
        Err(e) => return Ok(storage_error("Failed to get role", e)),
    }

    match storage.count_role_users(scope.company_id, id).await {
        Ok(0) => {}
        Ok(count) => {
            return Ok(conflict(
                ErrorCode::RoleInUse,
                format!("Role is assigned to {count} user(s)"),
            ));
        }
        Err(e) => return Ok(storage_error("Failed to count role users", e)),
    }

    match storage.delete_role(scope.company_id, id).await {
        Ok(true) => {
            cache_from(request)?
                .remove(&keys::role_permissions(id))
                .await;
            info!("Role {} deleted from company {}", id, scope.company_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Role deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::RoleNotFound, "Role not found")),
        Err(e) => Ok(storage_error("Failed to delete role", e)),
    }
}
