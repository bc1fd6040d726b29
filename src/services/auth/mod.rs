pub mod login;
pub mod logout;
pub mod register;
pub mod token;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::auth::{LoginRequest, RegisterCompanyRequest};
use crate::models::companies::Company;
use crate::models::users::User;
use crate::services::common::lazy_service;
use crate::storage::Storage;

lazy_service!(AuthService);

impl AuthService {
    pub(crate) fn get_config(&self) -> &AppConfig {
        AppConfig::get()
    }

    // 注册机构
    pub async fn register(
        &self,
        register_request: RegisterCompanyRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        register::handle_register(self, register_request, request).await
    }

    // 登录验证
    pub async fn login(
        &self,
        login_request: LoginRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        login::handle_login(self, login_request, request).await
    }

    // 刷新令牌
    pub async fn refresh_token(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        token::handle_refresh_token(self, request).await
    }

    pub async fn logout(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        logout::handle_logout(request).await
    }

    // 验证令牌
    pub async fn verify_token(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        token::handle_verify_token(self, request).await
    }

    // 当前用户信息
    pub async fn get_user(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        token::handle_get_user(self, request).await
    }
}

/// 用户所属机构，平台管理员没有
async fn company_of(storage: &dyn Storage, user: &User) -> Result<Option<Company>> {
    match user.company_id {
        Some(company_id) => storage.get_company(company_id).await,
        None => Ok(None),
    }
}
