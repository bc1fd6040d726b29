pub mod manage;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::settings::UpdateSettingRequest;
use crate::services::common::lazy_service;
use crate::utils::SafeSettingKey;

lazy_service!(
    /// 机构设置
    SettingsService
);

impl SettingsService {
    pub async fn list_settings(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::list_settings(self, request).await
    }

    pub async fn update_setting(
        &self,
        key: SafeSettingKey,
        req: UpdateSettingRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_setting(self, key, req, request).await
    }
}
