use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequirePermission};
use crate::models::roles::{CreateRoleRequest, Permission, RoleQueryParams, UpdateRoleRequest};
use crate::services::RoleService;
use crate::utils::SafeIDI64;

static ROLE_SERVICE: Lazy<RoleService> = Lazy::new(RoleService::new_lazy);

pub async fn list_permissions() -> ActixResult<HttpResponse> {
    ROLE_SERVICE.list_permissions().await
}

pub async fn list_roles(
    req: HttpRequest,
    query: web::Query<RoleQueryParams>,
) -> ActixResult<HttpResponse> {
    ROLE_SERVICE.list_roles(query.into_inner(), &req).await
}

pub async fn get_role(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ROLE_SERVICE.get_role(id.0, &req).await
}

pub async fn create_role(
    req: HttpRequest,
    body: web::Json<CreateRoleRequest>,
) -> ActixResult<HttpResponse> {
    ROLE_SERVICE.create_role(body.into_inner(), &req).await
}

pub async fn update_role(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateRoleRequest>,
) -> ActixResult<HttpResponse> {
    ROLE_SERVICE.update_role(id.0, body.into_inner(), &req).await
}

pub async fn delete_role(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ROLE_SERVICE.delete_role(id.0, &req).await
}

pub fn configure_role_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/roles")
            .wrap(RequirePermission::new(Permission::RolesManage))
            .wrap(RequireJWT)
            // 需在 /{id} 之前注册
            .route("/permissions", web::get().to(list_permissions))
            .route("", web::get().to(list_roles))
            .route("", web::post().to(create_role))
            .route("/{id}", web::get().to(get_role))
            .route("/{id}", web::put().to(update_role))
            .route("/{id}", web::delete().to(delete_role)),
    );
}
