use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::StudentService;
use crate::models::students::{CreateStudentRequest, UpdateStudentRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{checked_branch, not_found, storage_error, tenant_scope};
use crate::utils::validate::{
    clearable, optional_date, optional_email, optional_phone, optional_text, required_text,
};
use crate::{try_respond, try_validate};

/// 校验并规范化新学员的字段，线索转化时也会用到
pub(crate) fn normalize_new_student(
    mut req: CreateStudentRequest,
) -> Result<CreateStudentRequest, String> {
    req.first_name = required_text("first_name", &req.first_name, 64)?;
    req.last_name = required_text("last_name", &req.last_name, 64)?;
    req.phone = optional_phone(req.phone)?;
    req.email = optional_email(req.email)?;
    req.birth_date = optional_date("birth_date", req.birth_date)?;
    req.parent_name = optional_text(req.parent_name);
    req.parent_phone = optional_phone(req.parent_phone)?;
    req.notes = optional_text(req.notes);
    Ok(req)
}

pub async fn create_student(
    service: &StudentService,
    req: CreateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    let mut req = try_validate!(normalize_new_student(req), ErrorCode::ValidationFailed);
    req.branch_id = try_respond!(checked_branch(storage.as_ref(), &scope, req.branch_id).await);

    match storage.create_student(scope.company_id, req).await {
        Ok(student) => {
            info!("Student {} created in company {}", student.id, scope.company_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                student,
                "Student created successfully",
            )))
        }
        Err(e) => Ok(storage_error("Failed to create student", e)),
    }
}

pub async fn update_student(
    service: &StudentService,
    id: i64,
    mut update: UpdateStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_student(scope.company_id, id).await {
        Ok(Some(student)) if scope.can_access_branch(student.branch_id) => {}
        Ok(_) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => return Ok(storage_error("Failed to get student", e)),
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
    update.parent_phone = try_validate!(
        clearable(update.parent_phone, optional_phone),
        ErrorCode::ValidationFailed
    );
    update.email = try_validate!(
        clearable(update.email, optional_email),
        ErrorCode::ValidationFailed
    );
    update.birth_date = try_validate!(
        clearable(update.birth_date, |v| optional_date("birth_date", v)),
        ErrorCode::ValidationFailed
    );
    if update.branch_id.is_some() {
        update.branch_id =
            try_respond!(checked_branch(storage.as_ref(), &scope, update.branch_id).await);
    }

    match storage.update_student(scope.company_id, id, update).await {
        Ok(Some(student)) => {
            info!("Student {} updated", student.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                student,
                "Student updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => Ok(storage_error("Failed to update student", e)),
    }
}

pub async fn delete_student(
    service: &StudentService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.get_student(scope.company_id, id).await {
        Ok(Some(student)) if scope.can_access_branch(student.branch_id) => {}
        Ok(_) => return Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => return Ok(storage_error("Failed to get student", e)),
    }

    match storage.delete_student(scope.company_id, id).await {
        Ok(true) => {
            info!("Student {} deleted from company {}", id, scope.company_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Student deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::StudentNotFound, "Student not found")),
        Err(e) => Ok(storage_error("Failed to delete student", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_new_student() {
        let req = CreateStudentRequest {
            first_name: " Ann ".into(),
            last_name: "Lee".into(),
            email: Some(" ANN@Mail.com".into()),
            parent_phone: Some("".into()),
            birth_date: Some("2014-9-1".into()),
            ..Default::default()
        };
        let normalized = normalize_new_student(req).unwrap();
        assert_eq!(normalized.first_name, "Ann");
        assert_eq!(normalized.email.as_deref(), Some("ann@mail.com"));
        assert_eq!(normalized.parent_phone, None);
        assert_eq!(normalized.birth_date.as_deref(), Some("2014-09-01"));
    }

    #[test]
    fn test_normalize_rejects_missing_name() {
        let req = CreateStudentRequest {
            first_name: "  ".into(),
            last_name: "Lee".into(),
            ..Default::default()
        };
        assert!(normalize_new_student(req).is_err());
    }
}
