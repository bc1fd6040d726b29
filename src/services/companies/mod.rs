pub mod current;
pub mod platform;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::companies::{CompanyQueryParams, UpdateCompanyRequest};
use crate::services::common::lazy_service;

lazy_service!(CompanyService);

impl CompanyService {
    // 平台管理员：机构列表
    pub async fn list_companies(
        &self,
        query: CompanyQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        platform::list_companies(self, query, request).await
    }

    pub async fn get_company(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        platform::get_company(self, id, request).await
    }

    // 平台管理员：修改名称或暂停机构
    pub async fn update_company(
        &self,
        id: i64,
        update: UpdateCompanyRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        platform::update_company(self, id, update, request).await
    }

    // 当前机构
    pub async fn get_current(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        current::get_current_company(self, request).await
    }

    pub async fn update_current(
        &self,
        update: UpdateCompanyRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        current::update_current_company(self, update, request).await
    }
}
