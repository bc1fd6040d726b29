use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::cache::keys;
use crate::models::ApiResponse;
use crate::services::common::cache_from;
use crate::utils::jwt::JwtUtils;

/// 清除 refresh token cookie，并丢弃按 access token 缓存的用户
pub async fn handle_logout(request: &HttpRequest) -> ActixResult<HttpResponse> {
    if let Some(token) = JwtUtils::extract_bearer_token(request) {
        let cache = cache_from(request)?;
        cache.remove(&keys::user_by_token(&token)).await;
    }

    Ok(HttpResponse::Ok()
        .cookie(JwtUtils::create_empty_refresh_token_cookie())
        .json(ApiResponse::success_empty("Logged out successfully")))
}
