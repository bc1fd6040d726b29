use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{debug, info};

use super::{UserService, find_tenant_user};
use crate::models::users::{UpdateUserRequest, UserStatus};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{
    cache_from, conflict, ensure_exists, forbidden, not_found, resolve_branch, storage_error,
    tenant_scope,
};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password};
use crate::{try_respond, try_validate};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    let target = match find_tenant_user(storage.as_ref(), &scope, user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => return Ok(storage_error("Failed to get user", e)),
    };

    // 所有者账号只能修改资料，不能停用或分配角色
    if target.is_owner()
        && (update_data.role_id.is_some()
            || update_data.branch_id.is_some()
            || update_data
                .status
                .is_some_and(|status| status != UserStatus::Active))
    {
        return Ok(forbidden(
            ErrorCode::OwnerProtected,
            "The owner account cannot be deactivated or assigned a role",
        ));
    }

    if let Some(email) = update_data.email.take() {
        let email = email.trim().to_lowercase();
        try_validate!(validate_email(&email), ErrorCode::UserEmailInvalid);
        match storage.get_user_by_email(&email).await {
            Ok(Some(other)) if other.id != target.id => {
                return Ok(conflict(ErrorCode::UserAlreadyExists, "Email already exists"));
            }
            Ok(_) => {}
            Err(e) => return Ok(storage_error("Failed to check email", e)),
        }
        update_data.email = Some(email);
    }

    if let Some(password) = update_data.password.take() {
        try_validate!(validate_password(&password), ErrorCode::UserPasswordInvalid);
        match hash_password(&password) {
            Ok(hash) => update_data.password = Some(hash),
            Err(e) => return Ok(storage_error("Failed to hash password", e)),
        }
    }

    if let Some(role_id) = update_data.role_id {
        try_respond!(
            ensure_exists(
                storage.get_role(scope.company_id, role_id),
                ErrorCode::RoleNotFound,
                "Role",
                role_id
            )
            .await
        );
    }
    if update_data.branch_id.is_some() {
        update_data.branch_id = try_respond!(resolve_branch(&scope, update_data.branch_id));
    }
    if let Some(branch_id) = update_data.branch_id {
        try_respond!(
            ensure_exists(
                storage.get_branch(scope.company_id, branch_id),
                ErrorCode::BranchNotFound,
                "Branch",
                branch_id
            )
            .await
        );
    }

    let access_changed = update_data.status.is_some()
        || update_data.role_id.is_some()
        || update_data.branch_id.is_some()
        || update_data.password.is_some();

    match storage
        .update_user(scope.company_id, user_id, update_data)
        .await
    {
        Ok(Some(user)) => {
            if access_changed {
                // 已认证用户按 token 缓存，无法逐个定位
                let cache = cache_from(request)?;
                cache.invalidate_all().await;
                debug!("Cache cleared after access change of user {}", user.id);
            }
            info!("User {} updated", user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(user, "User updated successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(storage_error("Failed to update user", e)),
    }
}
