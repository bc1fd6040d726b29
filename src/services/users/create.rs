use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{UserService, ensure_account_available};
use crate::models::users::{CreateUserRequest, NewUser, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{ensure_exists, resolve_branch, storage_error, tenant_scope};
use crate::utils::password::hash_password;
use crate::utils::validate::{
    optional_text, validate_email, validate_password, validate_username,
};
use crate::{try_respond, try_validate};

pub async fn create_user(
    service: &UserService,
    user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    let username = user_data.username.trim().to_string();
    try_validate!(validate_username(&username), ErrorCode::UserNameInvalid);
    let email = user_data.email.trim().to_lowercase();
    try_validate!(validate_email(&email), ErrorCode::UserEmailInvalid);
    try_validate!(
        validate_password(&user_data.password),
        ErrorCode::UserPasswordInvalid
    );

    // 角色与分校必须属于本机构
    if let Some(role_id) = user_data.role_id {
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
    let branch_id = try_respond!(resolve_branch(&scope, user_data.branch_id));
    if let Some(branch_id) = branch_id {
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

    try_respond!(ensure_account_available(storage.as_ref(), &username, &email).await);

    let password_hash = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(storage_error("Failed to hash password", e)),
    };

    // 通过该接口创建的账号总是员工
    let new_user = NewUser {
        company_id: Some(scope.company_id),
        branch_id,
        role_id: user_data.role_id,
        username,
        email,
        password_hash,
        role: UserRole::Staff,
        display_name: optional_text(user_data.display_name),
    };

    match storage.create_user(new_user).await {
        Ok(user) => {
            info!(
                "User {} created in company {}",
                user.username, scope.company_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(user, "User created successfully")))
        }
        Err(e) => Ok(storage_error("Failed to create user", e)),
    }
}
