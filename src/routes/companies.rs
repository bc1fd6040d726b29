use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequirePermission, RequireRole};
use crate::models::companies::{CompanyQueryParams, UpdateCompanyRequest};
use crate::models::roles::Permission;
use crate::models::users::UserRole;
use crate::services::CompanyService;
use crate::utils::SafeIDI64;

static COMPANY_SERVICE: Lazy<CompanyService> = Lazy::new(CompanyService::new_lazy);

pub async fn list_companies(
    req: HttpRequest,
    query: web::Query<CompanyQueryParams>,
) -> ActixResult<HttpResponse> {
    COMPANY_SERVICE.list_companies(query.into_inner(), &req).await
}

pub async fn get_company(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    COMPANY_SERVICE.get_company(id.0, &req).await
}

pub async fn update_company(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateCompanyRequest>,
) -> ActixResult<HttpResponse> {
    COMPANY_SERVICE
        .update_company(id.0, body.into_inner(), &req)
        .await
}

pub async fn get_current(req: HttpRequest) -> ActixResult<HttpResponse> {
    COMPANY_SERVICE.get_current(&req).await
}

pub async fn update_current(
    req: HttpRequest,
    body: web::Json<UpdateCompanyRequest>,
) -> ActixResult<HttpResponse> {
    COMPANY_SERVICE.update_current(body.into_inner(), &req).await
}

pub fn configure_company_routes(cfg: &mut web::ServiceConfig) {
    // 平台管理
    cfg.service(
        web::scope("/api/v1/companies")
            .wrap(RequireRole::new_any(UserRole::platform_roles()))
            .wrap(RequireJWT)
            .route("", web::get().to(list_companies))
            .route("/{id}", web::get().to(get_company))
            .route("/{id}", web::put().to(update_company)),
    );
    // 当前机构
    cfg.service(
        web::resource("/api/v1/company")
            .wrap(RequirePermission::new(Permission::SettingsManage))
            .wrap(RequireJWT)
            .route(web::get().to(get_current))
            .route(web::put().to(update_current)),
    );
}
