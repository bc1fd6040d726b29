use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::ApiResponse;
use crate::models::users::UserQueryParams;
use crate::services::common::{storage_error, tenant_scope};
use crate::try_respond;

pub async fn list_users(
    service: &UserService,
    query: UserQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.list_users(&scope, query).await {
        Ok(users) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            users,
            "Users retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list users", e)),
    }
}
