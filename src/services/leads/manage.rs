use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{LeadService, check_assignee, visible_lead};
use crate::models::leads::{CreateLeadRequest, LeadQueryParams, UpdateLeadRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{
    checked_branch, not_found, request_settings, storage_error, tenant_scope,
};
use crate::utils::validate::{
    clearable, optional_email, optional_phone, optional_text, required_text,
};
use crate::{try_respond, try_validate};

/// 来源必须在机构配置的来源列表中
pub(crate) fn check_source(
    source: Option<String>,
    allowed: &[String],
) -> Result<Option<String>, String> {
    match optional_text(source) {
        Some(source) if allowed.iter().any(|s| *s == source) => Ok(Some(source)),
        Some(source) => Err(format!(
            "Unknown lead source '{source}'. Allowed: {}",
            allowed.join(", ")
        )),
        None => Ok(None),
    }
}

pub async fn list_leads(
    service: &LeadService,
    query: LeadQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.list_leads(&scope, query).await {
        Ok(leads) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            leads,
            "Leads retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list leads", e)),
    }
}

pub async fn get_lead(
    service: &LeadService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    let lead = try_respond!(visible_lead(storage.as_ref(), &scope, id).await);
    Ok(HttpResponse::Ok().json(ApiResponse::success(lead, "Lead retrieved successfully")))
}

pub async fn create_lead(
    service: &LeadService,
    mut req: CreateLeadRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let settings =
        try_respond!(request_settings(storage.as_ref(), request, scope.company_id).await);

    req.name = try_validate!(
        required_text("name", &req.name, 128),
        ErrorCode::ValidationFailed
    );
    req.phone = try_validate!(optional_phone(req.phone), ErrorCode::ValidationFailed);
    req.email = try_validate!(optional_email(req.email), ErrorCode::ValidationFailed);
    req.source = try_validate!(
        check_source(req.source, &settings.lead_sources),
        ErrorCode::ValidationFailed
    );
    req.notes = optional_text(req.notes);
    try_respond!(check_assignee(storage.as_ref(), &scope, req.assigned_to).await);
    req.branch_id = try_respond!(checked_branch(storage.as_ref(), &scope, req.branch_id).await);

    match storage.create_lead(scope.company_id, req).await {
        Ok(lead) => {
            info!("Lead {} created in company {}", lead.id, scope.company_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                lead,
                "Lead created successfully",
            )))
        }
        Err(e) => Ok(storage_error("Failed to create lead", e)),
    }
}

pub async fn update_lead(
    service: &LeadService,
    id: i64,
    mut update: UpdateLeadRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    try_respond!(visible_lead(storage.as_ref(), &scope, id).await);
    let settings =
        try_respond!(request_settings(storage.as_ref(), request, scope.company_id).await);

    if let Some(name) = update.name.take() {
        update.name = Some(try_validate!(
            required_text("name", &name, 128),
            ErrorCode::ValidationFailed
        ));
    }
    update.phone = try_validate!(
        clearable(update.phone, optional_phone),
        ErrorCode::ValidationFailed
    );
    update.email = try_validate!(
        clearable(update.email, optional_email),
        ErrorCode::ValidationFailed
    );
    update.source = try_validate!(
        clearable(update.source, |v| check_source(v, &settings.lead_sources)),
        ErrorCode::ValidationFailed
    );
    update.notes = try_validate!(
        clearable(update.notes, |v| Ok(optional_text(v))),
        ErrorCode::ValidationFailed
    );
    try_respond!(check_assignee(storage.as_ref(), &scope, update.assigned_to).await);
    if update.branch_id.is_some() {
        update.branch_id =
            try_respond!(checked_branch(storage.as_ref(), &scope, update.branch_id).await);
    }

    match storage.update_lead(scope.company_id, id, update).await {
        Ok(Some(lead)) => {
            info!("Lead {} updated", lead.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(lead, "Lead updated successfully")))
        }
        Ok(None) => Ok(not_found(ErrorCode::LeadNotFound, "Lead not found")),
        Err(e) => Ok(storage_error("Failed to update lead", e)),
    }
}

pub async fn delete_lead(
    service: &LeadService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    try_respond!(visible_lead(storage.as_ref(), &scope, id).await);

    match storage.delete_lead(scope.company_id, id).await {
        Ok(true) => {
            info!("Lead {} deleted from company {}", id, scope.company_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Lead deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::LeadNotFound, "Lead not found")),
        Err(e) => Ok(storage_error("Failed to delete lead", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_must_be_configured() {
        let allowed = vec!["website".to_string(), "referral".to_string()];
        assert_eq!(
            check_source(Some(" website ".into()), &allowed),
            Ok(Some("website".to_string()))
        );
        assert_eq!(check_source(None, &allowed), Ok(None));
        assert_eq!(check_source(Some("".into()), &allowed), Ok(None));
        assert!(check_source(Some("billboard".into()), &allowed).is_err());
    }
}
