use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info, warn};

use crate::middlewares::require_permission::resolve_permissions;
use crate::models::companies::CompanyStatus;
use crate::models::users::UserStatus;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{LoginRequest, LoginResponse},
};
use crate::services::common::{cache_from, forbidden, storage_error};
use crate::utils::jwt;
use crate::utils::password::verify_password;

use super::{AuthService, company_of};

fn invalid_credentials() -> HttpResponse {
    HttpResponse::Unauthorized().json(ApiResponse::error_empty(
        ErrorCode::AuthFailed,
        "Username or password is incorrect",
    ))
}

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let cache = cache_from(request)?;
    let config = service.get_config();

    // 1. 根据用户名或邮箱获取用户
    let user = match storage
        .get_user_by_username_or_email(login_request.username.trim())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => return Ok(invalid_credentials()),
        Err(e) => return Ok(storage_error("Login failed", e)),
    };

    // 2. 验证密码
    if !verify_password(&login_request.password, &user.password_hash) {
        info!("Failed login attempt for {}", user.username);
        return Ok(invalid_credentials());
    }

    // 3. 账号与机构状态
    if user.status != UserStatus::Active {
        return Ok(forbidden(
            ErrorCode::UserInactive,
            "User account is not active",
        ));
    }
    let company = match company_of(storage.as_ref(), &user).await {
        Ok(company) => company,
        Err(e) => return Ok(storage_error("Login failed", e)),
    };
    if company
        .as_ref()
        .is_some_and(|c| c.status == CompanyStatus::Suspended)
    {
        return Ok(forbidden(
            ErrorCode::CompanySuspended,
            "Company is suspended",
        ));
    }

    if let Err(e) = storage.update_last_login(user.id).await {
        warn!("Failed to update last login of user {}: {}", user.id, e);
    }

    let permissions = match resolve_permissions(storage.as_ref(), cache.as_ref(), &user).await {
        Ok(permissions) => permissions,
        Err(e) => return Ok(storage_error("Login failed", e)),
    };

    // 4. 生成令牌对，记住我时延长 refresh token
    let refresh_days = if login_request.remember_me {
        config.jwt.refresh_token_remember_me_expiry
    } else {
        config.jwt.refresh_token_expiry
    };
    let token_pair = match user.generate_token_pair(
        login_request
            .remember_me
            .then(|| chrono::Duration::days(refresh_days)),
    ) {
        Ok(pair) => pair,
        Err(e) => {
            error!("Failed to generate JWT token: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Login failed, unable to generate token",
                )),
            );
        }
    };

    info!("User {} logged in successfully", user.username);

    let refresh_cookie =
        jwt::JwtUtils::create_refresh_token_cookie(&token_pair.refresh_token, refresh_days);
    let response = LoginResponse {
        access_token: token_pair.access_token,
        expires_in: config.jwt.access_token_expiry * 60,
        user,
        company,
        permissions,
        created_at: chrono::Utc::now(),
    };

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie)
        .json(ApiResponse::success(response, "Login successful")))
}
