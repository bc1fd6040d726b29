use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{LeadService, visible_lead};
use crate::errors::CrmError;
use crate::middlewares::RequireJWT;
use crate::models::leads::{
    ChangeLeadStatusRequest, ConvertLeadRequest, ConvertLeadResponse, LeadStatus,
};
use crate::models::students::CreateStudentRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{
    bad_request, checked_branch, conflict, not_found, storage_error, tenant_scope,
};
use crate::services::students::manage::normalize_new_student;
use crate::utils::validate::optional_text;
use crate::{try_respond, try_validate};

/// 状态变更记录的内容
fn status_note(from: LeadStatus, to: LeadStatus, comment: Option<String>) -> String {
    match optional_text(comment) {
        Some(comment) => format!("{from} -> {to}: {comment}"),
        None => format!("{from} -> {to}"),
    }
}

/// 按第一个空白拆分姓名，名在前、姓在后
pub(crate) fn split_name(name: &str) -> (String, String) {
    let name = name.trim();
    match name.split_once(char::is_whitespace) {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (name.to_string(), String::new()),
    }
}

pub async fn change_status(
    service: &LeadService,
    id: i64,
    req: ChangeLeadStatusRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let lead = try_respond!(visible_lead(storage.as_ref(), &scope, id).await);

    if !lead.status.can_transition_to(req.status) {
        return Ok(bad_request(
            ErrorCode::LeadStatusInvalid,
            format!("Cannot move a lead from {} to {}", lead.status, req.status),
        ));
    }

    let note = status_note(lead.status, req.status, req.comment);
    match storage
        .change_lead_status(
            scope.company_id,
            id,
            lead.status,
            req.status,
            note,
            RequireJWT::extract_user_id(request),
        )
        .await
    {
        Ok(Some(lead)) => {
            info!("Lead {} moved to {}", id, lead.status);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                lead,
                "Lead status updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::LeadNotFound, "Lead not found")),
        Err(CrmError::Conflict(msg)) => Ok(conflict(ErrorCode::LeadStatusInvalid, msg)),
        Err(e) => Ok(storage_error("Failed to change lead status", e)),
    }
}

pub async fn convert_lead(
    service: &LeadService,
    id: i64,
    req: ConvertLeadRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let lead = try_respond!(visible_lead(storage.as_ref(), &scope, id).await);

    match lead.status {
        LeadStatus::Enrolled => {
            return Ok(conflict(
                ErrorCode::LeadAlreadyConverted,
                "Lead is already converted",
            ));
        }
        LeadStatus::Rejected => {
            return Ok(bad_request(
                ErrorCode::LeadStatusInvalid,
                "A rejected lead must be reopened before conversion",
            ));
        }
        LeadStatus::New => {
            return Ok(bad_request(
                ErrorCode::LeadStatusInvalid,
                "Move the lead to in_progress before conversion",
            ));
        }
        LeadStatus::InProgress => {}
    }

    let (first_name, last_name) = split_name(&lead.name);
    let student = CreateStudentRequest {
        first_name: req.first_name.unwrap_or(first_name),
        last_name: req.last_name.unwrap_or(last_name),
        phone: lead.phone.clone(),
        email: lead.email.clone(),
        birth_date: req.birth_date,
        parent_name: req.parent_name,
        parent_phone: req.parent_phone,
        status: None,
        notes: lead.notes.clone(),
        branch_id: req.branch_id.or(lead.branch_id),
    };
    let mut student = try_validate!(normalize_new_student(student), ErrorCode::ValidationFailed);
    student.branch_id =
        try_respond!(checked_branch(storage.as_ref(), &scope, student.branch_id).await);

    match storage
        .convert_lead(
            scope.company_id,
            id,
            student,
            RequireJWT::extract_user_id(request),
        )
        .await
    {
        Ok(Some((lead, student))) => {
            info!("Lead {} converted to student {}", lead.id, student.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                ConvertLeadResponse { lead, student },
                "Lead converted successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::LeadNotFound, "Lead not found")),
        Err(CrmError::Conflict(msg)) => Ok(conflict(ErrorCode::LeadAlreadyConverted, msg)),
        Err(CrmError::Validation(msg)) => Ok(bad_request(ErrorCode::LeadStatusInvalid, msg)),
        Err(e) => Ok(storage_error("Failed to convert lead", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name() {
        assert_eq!(
            split_name("  Anna Maria Smith "),
            ("Anna".to_string(), "Maria Smith".to_string())
        );
        assert_eq!(split_name("Cher"), ("Cher".to_string(), String::new()));
    }

    #[test]
    fn test_status_note() {
        assert_eq!(
            status_note(LeadStatus::New, LeadStatus::InProgress, None),
            "new -> in_progress"
        );
        assert_eq!(
            status_note(LeadStatus::New, LeadStatus::Rejected, Some(" too far ".into())),
            "new -> rejected: too far"
        );
    }
}
