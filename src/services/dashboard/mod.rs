pub mod stats;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::services::common::lazy_service;

lazy_service!(DashboardService);

impl DashboardService {
    pub async fn get_stats(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        stats::get_stats(self, request).await
    }
}
