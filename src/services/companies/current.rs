use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CompanyService;
use crate::models::companies::UpdateCompanyRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{forbidden, not_found, storage_error, tenant_scope};
use crate::utils::validate::required_text;
use crate::{try_respond, try_validate};

pub async fn get_current_company(
    service: &CompanyService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_company(scope.company_id).await {
        Ok(Some(company)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            company,
            "Company retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::CompanyNotFound, "Company not found")),
        Err(e) => Ok(storage_error("Failed to get company", e)),
    }
}

/// 机构只能修改自己的名称，状态由平台管理员控制
pub async fn update_current_company(
    service: &CompanyService,
    update: UpdateCompanyRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    if update.status.is_some() {
        return Ok(forbidden(
            ErrorCode::Forbidden,
            "Company status can only be changed by a platform administrator",
        ));
    }
    let name = match update.name {
        Some(name) => Some(try_validate!(
            required_text("name", &name, 128),
            ErrorCode::ValidationFailed
        )),
        None => None,
    };

    match storage
        .update_company(
            scope.company_id,
            UpdateCompanyRequest { name, status: None },
        )
        .await
    {
        Ok(Some(company)) => {
            info!("Company {} renamed to {}", company.id, company.name);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                company,
                "Company updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::CompanyNotFound, "Company not found")),
        Err(e) => Ok(storage_error("Failed to update company", e)),
    }
}
