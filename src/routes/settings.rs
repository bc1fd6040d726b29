use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequirePermission, RequireRole};
use crate::models::roles::Permission;
use crate::models::settings::UpdateSettingRequest;
use crate::models::users::UserRole;
use crate::services::{DashboardService, SettingsService};
use crate::utils::SafeSettingKey;

static SETTINGS_SERVICE: Lazy<SettingsService> = Lazy::new(SettingsService::new_lazy);
static DASHBOARD_SERVICE: Lazy<DashboardService> = Lazy::new(DashboardService::new_lazy);

pub async fn list_settings(req: HttpRequest) -> ActixResult<HttpResponse> {
    SETTINGS_SERVICE.list_settings(&req).await
}

pub async fn update_setting(
    req: HttpRequest,
    key: SafeSettingKey,
    body: web::Json<UpdateSettingRequest>,
) -> ActixResult<HttpResponse> {
    SETTINGS_SERVICE
        .update_setting(key, body.into_inner(), &req)
        .await
}

pub async fn dashboard_stats(req: HttpRequest) -> ActixResult<HttpResponse> {
    DASHBOARD_SERVICE.get_stats(&req).await
}

pub fn configure_settings_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/settings")
            .wrap(RequireJWT)
            .service(
                web::resource("").route(
                    web::get()
                        .to(list_settings)
                        .wrap(RequireRole::new_any(UserRole::tenant_roles())),
                ),
            )
            .service(
                web::resource("/{key}").route(
                    web::put()
                        .to(update_setting)
                        .wrap(RequirePermission::new(Permission::SettingsManage)),
                ),
            ),
    );
    cfg.service(
        web::resource("/api/v1/dashboard/stats")
            .wrap(RequirePermission::new(Permission::DashboardView))
            .wrap(RequireJWT)
            .route(web::get().to(dashboard_stats)),
    );
}
