use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::TeacherService;
use crate::models::teachers::{CreateTeacherRequest, UpdateTeacherRequest};
use crate::models::{ApiResponse, ErrorCode, TenantScope};
use crate::services::common::{
    bad_request, checked_branch, not_found, storage_error, tenant_scope,
};
use crate::storage::Storage;
use crate::utils::validate::{
    clearable, optional_date, optional_email, optional_phone, optional_text, required_text,
    validate_money,
};
use crate::{try_respond, try_validate};

fn clean_subjects(subjects: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let subject = subject.trim();
        if !subject.is_empty() && !cleaned.iter().any(|s| s == subject) {
            cleaned.push(subject.to_string());
        }
    }
    cleaned
}

/// 关联的登录账号必须是本机构员工
async fn check_linked_user(
    storage: &dyn Storage,
    scope: &TenantScope,
    user_id: i64,
) -> Result<(), HttpResponse> {
    match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) if user.company_id == Some(scope.company_id) => Ok(()),
        Ok(_) => Err(bad_request(
            ErrorCode::UserNotFound,
            format!("User {user_id} not found"),
        )),
        Err(e) => Err(storage_error("Failed to load user", e)),
    }
}

pub async fn create_teacher(
    service: &TeacherService,
    mut req: CreateTeacherRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    req.first_name = try_validate!(
        required_text("first_name", &req.first_name, 64),
        ErrorCode::ValidationFailed
    );
    req.last_name = try_validate!(
        required_text("last_name", &req.last_name, 64),
        ErrorCode::ValidationFailed
    );
    req.phone = try_validate!(optional_phone(req.phone), ErrorCode::ValidationFailed);
    req.email = try_validate!(optional_email(req.email), ErrorCode::ValidationFailed);
    req.hired_at = try_validate!(
        optional_date("hired_at", req.hired_at),
        ErrorCode::ValidationFailed
    );
    if let Some(rate) = req.hourly_rate {
        try_validate!(validate_money("hourly_rate", rate), ErrorCode::ValidationFailed);
    }
    req.notes = optional_text(req.notes);
    req.subjects = clean_subjects(req.subjects);
    req.branch_id = try_respond!(checked_branch(storage.as_ref(), &scope, req.branch_id).await);
    if let Some(user_id) = req.user_id {
        try_respond!(check_linked_user(storage.as_ref(), &scope, user_id).await);
    }

    match storage.create_teacher(scope.company_id, req).await {
        Ok(teacher) => {
            info!("Teacher {} created in company {}", teacher.id, scope.company_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                teacher,
                "Teacher created successfully",
            )))
        }
        Err(e) => Ok(storage_error("Failed to create teacher", e)),
    }
}

pub async fn update_teacher(
    service: &TeacherService,
    id: i64,
    mut update: UpdateTeacherRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_teacher(scope.company_id, id).await {
        Ok(Some(teacher)) if scope.can_access_branch(teacher.branch_id) => {}
        Ok(_) => return Ok(not_found(ErrorCode::TeacherNotFound, "Teacher not found")),
        Err(e) => return Ok(storage_error("Failed to get teacher", e)),
    }

    if let Some(first_name) = update.first_name.take() {
        update.first_name = Some(try_validate!(
            required_text("first_name", &first_name, 64),
            ErrorCode::ValidationFailed
        ));
    }
    if let Some(last_name) = update.last_name.take() {
        update.last_name = Some(try_validate!(
            required_text("last_name", &last_name, 64),
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
    update.hired_at = try_validate!(
        clearable(update.hired_at, |v| optional_date("hired_at", v)),
        ErrorCode::ValidationFailed
    );
    if let Some(rate) = update.hourly_rate {
        try_validate!(validate_money("hourly_rate", rate), ErrorCode::ValidationFailed);
    }
    update.subjects = update.subjects.map(clean_subjects);
    if update.branch_id.is_some() {
        update.branch_id =
            try_respond!(checked_branch(storage.as_ref(), &scope, update.branch_id).await);
    }
    if let Some(user_id) = update.user_id {
        try_respond!(check_linked_user(storage.as_ref(), &scope, user_id).await);
    }

    match storage.update_teacher(scope.company_id, id, update).await {
        Ok(Some(teacher)) => {
            info!("Teacher {} updated", teacher.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                teacher,
                "Teacher updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::TeacherNotFound, "Teacher not found")),
        Err(e) => Ok(storage_error("Failed to update teacher", e)),
    }
}

pub async fn delete_teacher(
    service: &TeacherService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_teacher(scope.company_id, id).await {
        Ok(Some(teacher)) if scope.can_access_branch(teacher.branch_id) => {}
        Ok(_) => return Ok(not_found(ErrorCode::TeacherNotFound, "Teacher not found")),
        Err(e) => return Ok(storage_error("Failed to get teacher", e)),
    }

    match storage.delete_teacher(scope.company_id, id).await {
        Ok(true) => {
            info!("Teacher {} deleted from company {}", id, scope.company_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Teacher deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::TeacherNotFound, "Teacher not found")),
        Err(e) => Ok(storage_error("Failed to delete teacher", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_subjects() {
        let cleaned = clean_subjects(vec![
            " Math ".into(),
            "".into(),
            "Math".into(),
            "Physics".into(),
        ]);
        assert_eq!(cleaned, vec!["Math".to_string(), "Physics".to_string()]);
    }
}
