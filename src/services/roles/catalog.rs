use actix_web::{HttpResponse, Result as ActixResult};

use crate::models::ApiResponse;
use crate::models::roles::{Permission, PermissionInfo};

pub async fn list_permissions() -> ActixResult<HttpResponse> {
    let catalog: Vec<PermissionInfo> = Permission::ALL.iter().copied().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        catalog,
        "Permissions retrieved successfully",
    )))
}
