//! 服务层共用的辅助函数
//!
//! 存储错误到 HTTP 响应的映射、当前租户范围的提取、机构设置的缓存读取。

use actix_web::{HttpRequest, HttpResponse, web};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

use crate::cache::{self, ObjectCache, keys};
use crate::errors::{CrmError, Result};
use crate::middlewares::RequireJWT;
use crate::models::settings::CenterSettings;
use crate::models::{ApiResponse, ErrorCode, TenantScope};
use crate::storage::Storage;

/// 生成惰性获取存储的服务结构体
macro_rules! lazy_service {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name {
            storage: Option<std::sync::Arc<dyn $crate::storage::Storage>>,
        }

        impl $name {
            pub fn new_lazy() -> Self {
                Self { storage: None }
            }

            pub(crate) fn get_storage(
                &self,
                request: &actix_web::HttpRequest,
            ) -> actix_web::Result<std::sync::Arc<dyn $crate::storage::Storage>> {
                match &self.storage {
                    Some(storage) => Ok(storage.clone()),
                    None => $crate::services::common::storage_from(request),
                }
            }
        }
    };
}

pub(crate) use lazy_service;

pub(crate) fn storage_from(request: &HttpRequest) -> actix_web::Result<Arc<dyn Storage>> {
    request
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Storage not configured"))
}

pub(crate) fn cache_from(request: &HttpRequest) -> actix_web::Result<Arc<dyn ObjectCache>> {
    request
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Cache not configured"))
}

/// 将存储层错误转换为响应
///
/// 唯一约束和业务冲突返回 409，外键约束也返回 409（记录仍被引用），
/// 其余错误记录日志后返回 500。
pub(crate) fn storage_error(context: &str, err: CrmError) -> HttpResponse {
    match &err {
        CrmError::UniqueViolation(_) => HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::Conflict,
            format!("{context}: record already exists"),
        )),
        CrmError::ForeignKeyViolation(_) => {
            HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::Conflict,
                format!("{context}: record is referenced by other data"),
            ))
        }
        CrmError::Conflict(msg) => HttpResponse::Conflict()
            .json(ApiResponse::error_empty(ErrorCode::Conflict, msg.clone())),
        CrmError::NotFound(msg) => HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::NotFound, format!("{msg} not found"))),
        CrmError::Validation(msg) => HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg.clone())),
        _ => {
            error!("{}: {}", context, err);
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                context.to_string(),
            ))
        }
    }
}

pub(crate) fn bad_request(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn not_found(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn conflict(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(code, message))
}

pub(crate) fn forbidden(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::Forbidden().json(ApiResponse::error_empty(code, message))
}

/// 当前请求的租户范围；平台管理员没有机构，返回 403
pub(crate) fn tenant_scope(request: &HttpRequest) -> std::result::Result<TenantScope, HttpResponse> {
    RequireJWT::extract_scope(request).ok_or_else(|| {
        forbidden(
            ErrorCode::Forbidden,
            "This operation requires a company account",
        )
    })
}

/// 绑定分校的用户只能把数据写入自己的分校
pub(crate) fn resolve_branch(
    scope: &TenantScope,
    requested: Option<i64>,
) -> std::result::Result<Option<i64>, HttpResponse> {
    match scope.branch_id {
        Some(own) if requested.is_some_and(|b| b != own) => Err(forbidden(
            ErrorCode::Forbidden,
            "Cannot write data of another branch",
        )),
        Some(own) => Ok(Some(own)),
        None => Ok(requested),
    }
}

/// 请求体中引用的记录必须属于当前机构，否则返回 400
pub(crate) async fn ensure_exists<T, F>(
    lookup: F,
    code: ErrorCode,
    label: &str,
    id: i64,
) -> std::result::Result<T, HttpResponse>
where
    F: Future<Output = Result<Option<T>>>,
{
    match lookup.await {
        Ok(Some(found)) => Ok(found),
        Ok(None) => Err(bad_request(code, format!("{label} {id} not found"))),
        Err(e) => Err(storage_error(&format!("Failed to load {label}"), e)),
    }
}

/// 写入数据时的分校：先按用户范围收敛，再确认分校属于本机构
pub(crate) async fn checked_branch(
    storage: &dyn Storage,
    scope: &TenantScope,
    requested: Option<i64>,
) -> std::result::Result<Option<i64>, HttpResponse> {
    let branch_id = resolve_branch(scope, requested)?;
    if let Some(id) = branch_id {
        ensure_exists(
            storage.get_branch(scope.company_id, id),
            ErrorCode::BranchNotFound,
            "Branch",
            id,
        )
        .await?;
    }
    Ok(branch_id)
}

/// 读取机构设置，按机构缓存
pub(crate) async fn load_center_settings(
    storage: &dyn Storage,
    cache: &dyn ObjectCache,
    company_id: i64,
) -> Result<CenterSettings> {
    let key = keys::company_settings(company_id);
    let raw = match cache::get_json::<HashMap<String, String>>(cache, &key).await {
        Some(raw) => raw,
        None => {
            let raw: HashMap<String, String> = storage
                .get_company_settings(company_id)
                .await?
                .into_iter()
                .map(|(key, stored)| (key, stored.value))
                .collect();
            cache::insert_json(cache, key, &raw, 0).await;
            raw
        }
    };
    Ok(CenterSettings::from_raw(&raw))
}

/// 请求上下文中的机构设置
pub(crate) async fn request_settings(
    storage: &dyn Storage,
    request: &HttpRequest,
    company_id: i64,
) -> std::result::Result<CenterSettings, HttpResponse> {
    let cache = cache_from(request).map_err(|e| {
        error!("{}", e);
        HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            "Cache not configured",
        ))
    })?;
    load_center_settings(storage, cache.as_ref(), company_id)
        .await
        .map_err(|e| storage_error("Failed to load settings", e))
}

/// 依次执行校验，返回第一个错误的 400 响应
#[macro_export]
macro_rules! try_validate {
    ($expr:expr, $code:expr) => {
        match $expr {
            Ok(value) => value,
            Err(message) => return Ok($crate::services::common::bad_request($code, message)),
        }
    };
}

/// 解包 `Result<T, HttpResponse>`，错误时直接返回该响应
#[macro_export]
macro_rules! try_respond {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(response) => return Ok(response),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_storage_error_status_codes() {
        let cases = [
            (CrmError::unique_violation("x"), StatusCode::CONFLICT),
            (CrmError::foreign_key_violation("x"), StatusCode::CONFLICT),
            (CrmError::conflict("x"), StatusCode::CONFLICT),
            (CrmError::not_found("Lesson 3"), StatusCode::NOT_FOUND),
            (CrmError::validation("x"), StatusCode::BAD_REQUEST),
            (CrmError::database_operation("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(storage_error("op", err).status(), status);
        }
    }

    #[test]
    fn test_bound_user_writes_own_branch() {
        let bound = TenantScope::new(1, Some(2));
        assert_eq!(resolve_branch(&bound, None).unwrap(), Some(2));
        assert_eq!(resolve_branch(&bound, Some(2)).unwrap(), Some(2));
        assert!(resolve_branch(&bound, Some(5)).is_err());

        let unbound = TenantScope::new(1, None);
        assert_eq!(resolve_branch(&unbound, Some(5)).unwrap(), Some(5));
        assert_eq!(resolve_branch(&unbound, None).unwrap(), None);
    }
}
