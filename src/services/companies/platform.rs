use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::CompanyService;
use crate::cache::keys;
use crate::models::companies::{CompanyQueryParams, CompanyStatus, UpdateCompanyRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{cache_from, not_found, storage_error};
use crate::try_validate;
use crate::utils::validate::required_text;

pub async fn list_companies(
    service: &CompanyService,
    query: CompanyQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    match storage.list_companies(query).await {
        Ok(companies) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            companies,
            "Companies retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list companies", e)),
    }
}

pub async fn get_company(
    service: &CompanyService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    match storage.get_company(id).await {
        Ok(Some(company)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            company,
            "Company retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::CompanyNotFound, "Company not found")),
        Err(e) => Ok(storage_error("Failed to get company", e)),
    }
}

pub async fn update_company(
    service: &CompanyService,
    id: i64,
    mut update: UpdateCompanyRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    if let Some(name) = update.name.take() {
        update.name = Some(try_validate!(
            required_text("name", &name, 128),
            ErrorCode::ValidationFailed
        ));
    }
    let status_changed = update.status;

    match storage.update_company(id, update).await {
        Ok(Some(company)) => {
            if status_changed.is_some() {
                // 认证中间件按机构缓存状态
                let cache = cache_from(request)?;
                cache.remove(&keys::company_status(id)).await;
            }
            if status_changed == Some(CompanyStatus::Suspended) {
                warn!("Company {} ({}) suspended", company.id, company.slug);
            } else {
                info!("Company {} updated", company.id);
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                company,
                "Company updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::CompanyNotFound, "Company not found")),
        Err(e) => Ok(storage_error("Failed to update company", e)),
    }
}
