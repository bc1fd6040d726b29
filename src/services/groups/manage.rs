use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GroupService, visible_group};
use crate::models::groups::{CreateGroupRequest, UpdateGroupRequest};
use crate::models::{ApiResponse, ErrorCode, TenantScope};
use crate::services::common::{
    bad_request, checked_branch, ensure_exists, not_found, storage_error, tenant_scope,
};
use crate::storage::Storage;
use crate::utils::validate::{
    clearable, optional_date, optional_text, required_text, validate_date_order,
};
use crate::{try_respond, try_validate};

const MAX_GROUP_SIZE: i32 = 500;

fn validate_max_students(max_students: i32) -> Result<i32, String> {
    if !(1..=MAX_GROUP_SIZE).contains(&max_students) {
        return Err(format!("max_students must be between 1 and {MAX_GROUP_SIZE}"));
    }
    Ok(max_students)
}

/// 教师与教室必须属于本机构
async fn check_references(
    storage: &dyn Storage,
    scope: &TenantScope,
    teacher_id: Option<i64>,
    room_id: Option<i64>,
) -> Result<(), HttpResponse> {
    if let Some(teacher_id) = teacher_id {
        ensure_exists(
            storage.get_teacher(scope.company_id, teacher_id),
            ErrorCode::TeacherNotFound,
            "Teacher",
            teacher_id,
        )
        .await?;
    }
    if let Some(room_id) = room_id {
        ensure_exists(
            storage.get_room(scope.company_id, room_id),
            ErrorCode::RoomNotFound,
            "Room",
            room_id,
        )
        .await?;
    }
    Ok(())
}

pub async fn create_group(
    service: &GroupService,
    mut req: CreateGroupRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    req.name = try_validate!(
        required_text("name", &req.name, 128),
        ErrorCode::ValidationFailed
    );
    req.subject = optional_text(req.subject);
    req.level = optional_text(req.level);
    req.max_students = try_validate!(
        validate_max_students(req.max_students),
        ErrorCode::ValidationFailed
    );
    req.start_date = try_validate!(
        optional_date("start_date", req.start_date),
        ErrorCode::ValidationFailed
    );
    req.end_date = try_validate!(
        optional_date("end_date", req.end_date),
        ErrorCode::ValidationFailed
    );
    try_validate!(
        validate_date_order(req.start_date.as_deref(), req.end_date.as_deref()),
        ErrorCode::ValidationFailed
    );
    try_respond!(check_references(storage.as_ref(), &scope, req.teacher_id, req.room_id).await);
    req.branch_id = try_respond!(checked_branch(storage.as_ref(), &scope, req.branch_id).await);

    match storage.create_group(scope.company_id, req).await {
        Ok(group) => {
            info!("Group {} created in company {}", group.id, scope.company_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                group,
                "Group created successfully",
            )))
        }
        Err(e) => Ok(storage_error("Failed to create group", e)),
    }
}

pub async fn update_group(
    service: &GroupService,
    id: i64,
    mut update: UpdateGroupRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let existing = try_respond!(visible_group(storage.as_ref(), &scope, id).await);

    if let Some(name) = update.name.take() {
        update.name = Some(try_validate!(
            required_text("name", &name, 128),
            ErrorCode::ValidationFailed
        ));
    }
    if let Some(max_students) = update.max_students {
        try_validate!(
            validate_max_students(max_students),
            ErrorCode::ValidationFailed
        );
        if i64::from(max_students) < existing.student_count {
            return Ok(bad_request(
                ErrorCode::ValidationFailed,
                format!(
                    "max_students cannot be lower than the current {} member(s)",
                    existing.student_count
                ),
            ));
        }
    }
    update.subject = try_validate!(
        clearable(update.subject, |v| Ok(optional_text(v))),
        ErrorCode::ValidationFailed
    );
    update.level = try_validate!(
        clearable(update.level, |v| Ok(optional_text(v))),
        ErrorCode::ValidationFailed
    );
    update.start_date = try_validate!(
        clearable(update.start_date, |v| optional_date("start_date", v)),
        ErrorCode::ValidationFailed
    );
    update.end_date = try_validate!(
        clearable(update.end_date, |v| optional_date("end_date", v)),
        ErrorCode::ValidationFailed
    );
    let start = match &update.start_date {
        Some(v) => Some(v.as_str()).filter(|v| !v.is_empty()),
        None => existing.start_date.as_deref(),
    };
    let end = match &update.end_date {
        Some(v) => Some(v.as_str()).filter(|v| !v.is_empty()),
        None => existing.end_date.as_deref(),
    };
    try_validate!(validate_date_order(start, end), ErrorCode::ValidationFailed);
    try_respond!(
        check_references(storage.as_ref(), &scope, update.teacher_id, update.room_id).await
    );
    if update.branch_id.is_some() {
        update.branch_id =
            try_respond!(checked_branch(storage.as_ref(), &scope, update.branch_id).await);
    }

    match storage.update_group(scope.company_id, id, update).await {
        Ok(Some(group)) => {
            info!("Group {} updated", group.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                group,
                "Group updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::GroupNotFound, "Group not found")),
        Err(e) => Ok(storage_error("Failed to update group", e)),
    }
}

pub async fn delete_group(
    service: &GroupService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    try_respond!(visible_group(storage.as_ref(), &scope, id).await);

    match storage.delete_group(scope.company_id, id).await {
        Ok(true) => {
            info!("Group {} deleted from company {}", id, scope.company_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Group deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::GroupNotFound, "Group not found")),
        Err(e) => Ok(storage_error("Failed to delete group", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_size_bounds() {
        assert!(validate_max_students(0).is_err());
        assert_eq!(validate_max_students(1), Ok(1));
        assert_eq!(validate_max_students(500), Ok(500));
        assert!(validate_max_students(501).is_err());
    }
}
