use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, info};

use crate::middlewares::require_jwt::RequireJWT;
use crate::middlewares::require_permission::resolve_permissions;
use crate::models::auth::responses::{
    RefreshTokenResponse, TokenVerificationResponse, UserInfoResponse,
};
use crate::models::companies::CompanyStatus;
use crate::models::users::UserStatus;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{cache_from, storage_error};
use crate::utils::jwt::JwtUtils;

use super::{AuthService, company_of};

fn session_expired() -> HttpResponse {
    // 同时清除无效的 refresh token cookie
    HttpResponse::Unauthorized()
        .cookie(JwtUtils::create_empty_refresh_token_cookie())
        .json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Login expired or invalid, please login again",
        ))
}

pub async fn handle_refresh_token(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();
    let Some(refresh_token) = JwtUtils::extract_refresh_token_from_cookie(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };

    let claims = match JwtUtils::verify_refresh_token(&refresh_token) {
        Ok(claims) => claims,
        Err(e) => {
            info!("Refresh token rejected: {}", e);
            return Ok(session_expired());
        }
    };
    let Some(user_id) = claims.user_id() else {
        return Ok(session_expired());
    };

    // 账号被停用或机构被暂停后不再续期
    let storage = service.get_storage(request)?;
    let user = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) if user.status == UserStatus::Active => user,
        Ok(_) => return Ok(session_expired()),
        Err(e) => return Ok(storage_error("Failed to refresh token", e)),
    };
    match company_of(storage.as_ref(), &user).await {
        Ok(Some(company)) if company.status == CompanyStatus::Suspended => {
            return Ok(session_expired());
        }
        Ok(_) => {}
        Err(e) => return Ok(storage_error("Failed to refresh token", e)),
    }

    match JwtUtils::generate_access_token(user.id, user.role.as_str(), user.company_id) {
        Ok(access_token) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            RefreshTokenResponse {
                access_token,
                expires_in: config.jwt.access_token_expiry * 60,
            },
            "Token refreshed successfully",
        ))),
        Err(e) => {
            error!("Failed to generate access token: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "Unable to generate token",
                )),
            )
        }
    }
}

pub async fn handle_verify_token(
    _service: &AuthService,
    _request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        TokenVerificationResponse { is_valid: true },
        "Token is valid",
    )))
}

pub async fn handle_get_user(
    service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let Some(user) = RequireJWT::extract_user(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized access, please login",
        )));
    };
    let storage = service.get_storage(request)?;
    let cache = cache_from(request)?;

    let company = match company_of(storage.as_ref(), &user).await {
        Ok(company) => company,
        Err(e) => return Ok(storage_error("Failed to load company", e)),
    };
    let permissions = match resolve_permissions(storage.as_ref(), cache.as_ref(), &user).await {
        Ok(permissions) => permissions,
        Err(e) => return Ok(storage_error("Failed to resolve permissions", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        UserInfoResponse {
            user,
            company,
            permissions,
        },
        "User information retrieved successfully",
    )))
}
