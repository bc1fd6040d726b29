use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::services::SystemService;

static SYSTEM_SERVICE: Lazy<SystemService> = Lazy::new(SystemService::new_lazy);

pub async fn get_info(request: HttpRequest) -> ActixResult<HttpResponse> {
    SYSTEM_SERVICE.get_info(&request).await
}

// 公开接口，无需登录
pub fn configure_system_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1/system").route("/info", web::get().to(get_info)));
}
