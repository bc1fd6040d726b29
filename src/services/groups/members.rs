use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GroupService, visible_group};
use crate::models::groups::{AddGroupStudentRequest, GroupJoinOutcome};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{conflict, ensure_exists, not_found, storage_error, tenant_scope};
use crate::try_respond;

pub async fn list_members(
    service: &GroupService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    try_respond!(visible_group(storage.as_ref(), &scope, id).await);

    match storage.list_group_members(id).await {
        Ok(members) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            members,
            "Group members retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list group members", e)),
    }
}

pub async fn add_member(
    service: &GroupService,
    id: i64,
    req: AddGroupStudentRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    try_respond!(visible_group(storage.as_ref(), &scope, id).await);
    try_respond!(
        ensure_exists(
            storage.get_student(scope.company_id, req.student_id),
            ErrorCode::StudentNotFound,
            "Student",
            req.student_id
        )
        .await
    );

    match storage.add_group_student(id, req.student_id).await {
        Ok(GroupJoinOutcome::Added(member)) => {
            info!("Student {} joined group {}", req.student_id, id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                member,
                "Student added to group",
            )))
        }
        Ok(GroupJoinOutcome::AlreadyMember) => Ok(conflict(
            ErrorCode::GroupMemberExists,
            "Student is already a member of this group",
        )),
        Ok(GroupJoinOutcome::Full) => Ok(conflict(ErrorCode::GroupFull, "Group is full")),
        Err(e) => Ok(storage_error("Failed to add group member", e)),
    }
}

pub async fn remove_member(
    service: &GroupService,
    id: i64,
    student_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    try_respond!(visible_group(storage.as_ref(), &scope, id).await);

    match storage.remove_group_student(id, student_id).await {
        Ok(true) => {
            info!("Student {} left group {}", student_id, id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Student removed from group")))
        }
        Ok(false) => Ok(not_found(
            ErrorCode::GroupMemberNotFound,
            "Student is not a member of this group",
        )),
        Err(e) => Ok(storage_error("Failed to remove group member", e)),
    }
}
