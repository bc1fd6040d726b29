use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::SystemService;
use crate::models::system::SystemInfoResponse;
use crate::models::{ApiResponse, AppStartTime};

pub async fn get_info(service: &SystemService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let config = service.get_config();
    let started_at = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|data| data.start_datetime)
        .unwrap_or_else(chrono::Utc::now);

    let response = SystemInfoResponse {
        system_name: config.app.system_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: config.app.environment.clone(),
        started_at,
        uptime_seconds: (chrono::Utc::now() - started_at).num_seconds().max(0),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "System information retrieved successfully",
    )))
}
