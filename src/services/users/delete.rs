use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{UserService, find_tenant_user};
use crate::middlewares::RequireJWT;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{cache_from, forbidden, not_found, storage_error, tenant_scope};
use crate::try_respond;

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    if RequireJWT::extract_user_id(request) == Some(user_id) {
        return Ok(forbidden(
            ErrorCode::CanNotDeleteCurrentUser,
            "You cannot delete your own account",
        ));
    }

    match find_tenant_user(storage.as_ref(), &scope, user_id).await {
        Ok(Some(user)) if user.is_owner() => {
            return Ok(forbidden(
                ErrorCode::OwnerProtected,
                "The owner account cannot be deleted",
            ));
        }
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => return Ok(storage_error("Failed to get user", e)),
    }

    match storage.delete_user(scope.company_id, user_id).await {
        Ok(true) => {
            cache_from(request)?.invalidate_all().await;
            info!("User {} deleted from company {}", user_id, scope.company_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("User deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::UserNotFound, "User not found")),
        Err(e) => Ok(storage_error("Failed to delete user", e)),
    }
}
