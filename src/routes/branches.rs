use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequirePermission, RequireRole};
use crate::models::branches::{BranchQueryParams, CreateBranchRequest, UpdateBranchRequest};
use crate::models::roles::Permission;
use crate::models::users::UserRole;
use crate::services::BranchService;
use crate::utils::SafeIDI64;

static BRANCH_SERVICE: Lazy<BranchService> = Lazy::new(BranchService::new_lazy);

pub async fn list_branches(
    req: HttpRequest,
    query: web::Query<BranchQueryParams>,
) -> ActixResult<HttpResponse> {
    BRANCH_SERVICE.list_branches(query.into_inner(), &req).await
}

pub async fn get_branch(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    BRANCH_SERVICE.get_branch(id.0, &req).await
}

pub async fn create_branch(
    req: HttpRequest,
    body: web::Json<CreateBranchRequest>,
) -> ActixResult<HttpResponse> {
    BRANCH_SERVICE.create_branch(body.into_inner(), &req).await
}

pub async fn update_branch(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateBranchRequest>,
) -> ActixResult<HttpResponse> {
    BRANCH_SERVICE
        .update_branch(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_branch(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    BRANCH_SERVICE.delete_branch(id.0, &req).await
}

pub fn configure_branch_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/branches")
            .wrap(RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_branches)
                            .wrap(RequireRole::new_any(UserRole::tenant_roles())),
                    )
                    .route(
                        web::post()
                            .to(create_branch)
                            .wrap(RequirePermission::new(Permission::BranchesManage)),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_branch)
                            .wrap(RequireRole::new_any(UserRole::tenant_roles())),
                    )
                    .route(
                        web::put()
                            .to(update_branch)
                            .wrap(RequirePermission::new(Permission::BranchesManage)),
                    )
                    .route(
                        web::delete()
                            .to(delete_branch)
                            .wrap(RequirePermission::new(Permission::BranchesManage)),
                    ),
            ),
    );
}
