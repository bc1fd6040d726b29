use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{GroupService, visible_group};
use crate::models::ApiResponse;
use crate::models::groups::GroupQueryParams;
use crate::services::common::{storage_error, tenant_scope};
use crate::try_respond;

pub async fn list_groups(
    service: &GroupService,
    query: GroupQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.list_groups(&scope, query).await {
        Ok(groups) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            groups,
            "Groups retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list groups", e)),
    }
}

pub async fn get_group(
    service: &GroupService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    let group = try_respond!(visible_group(storage.as_ref(), &scope, id).await);
    Ok(HttpResponse::Ok().json(ApiResponse::success(group, "Group retrieved successfully")))
}
