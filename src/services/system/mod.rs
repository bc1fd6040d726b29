pub mod info;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::config::AppConfig;

pub struct SystemService;

impl SystemService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    // 公开的系统信息
    pub async fn get_info(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        info::get_info(self, request).await
    }
}
