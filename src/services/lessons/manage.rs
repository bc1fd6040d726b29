use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use super::conflicts::{Participants, find_conflicts};
use super::{LessonService, visible_lesson};
use crate::models::lessons::{
    CreateLessonRequest, LessonConflict, LessonStatus, UpdateLessonRequest,
};
use crate::models::{ApiResponse, ErrorCode, TenantScope};
use crate::services::common::{
    bad_request, checked_branch, conflict, ensure_exists, not_found, storage_error, tenant_scope,
};
use crate::storage::{LessonRecord, Storage};
use crate::utils::validate::optional_text;
use crate::{try_respond, try_validate};

const MAX_LESSON_HOURS: i64 = 12;

/// 时间区间合法，且班组与个人学员不能同时指定
pub(crate) fn validate_lesson_shape(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    group_id: Option<i64>,
    student_id: Option<i64>,
) -> Result<(), String> {
    if end <= start {
        return Err("end_time must be after start_time".to_string());
    }
    if end - start > Duration::hours(MAX_LESSON_HOURS) {
        return Err(format!("A lesson cannot be longer than {MAX_LESSON_HOURS} hours"));
    }
    if group_id.is_some() && student_id.is_some() {
        return Err("A lesson belongs to a group or a student, not both".to_string());
    }
    Ok(())
}

/// 合并更新后的班组与个人学员
///
/// 指定班组时清除个人学员，反之亦然；显式 null 清空对应字段。
pub(crate) fn resolve_attendees(
    (group, student): (Option<Option<i64>>, Option<Option<i64>>),
    (existing_group, existing_student): (Option<i64>, Option<i64>),
) -> Result<(Option<i64>, Option<i64>), &'static str> {
    match (group, student) {
        (Some(Some(_)), Some(Some(_))) => {
            Err("A lesson belongs to a group or a student, not both")
        }
        (Some(Some(group_id)), _) => Ok((Some(group_id), None)),
        (_, Some(Some(student_id))) => Ok((None, Some(student_id))),
        (group, student) => Ok((
            group.map_or(existing_group, |_| None),
            student.map_or(existing_student, |_| None),
        )),
    }
}

/// 请求中引用的教师、班组、学员和教室必须属于本机构
pub(crate) async fn check_references(
    storage: &dyn Storage,
    scope: &TenantScope,
    who: &Participants,
) -> Result<(), HttpResponse> {
    if let Some(id) = who.teacher_id {
        ensure_exists(
            storage.get_teacher(scope.company_id, id),
            ErrorCode::TeacherNotFound,
            "Teacher",
            id,
        )
        .await?;
    }
    if let Some(id) = who.group_id {
        ensure_exists(
            storage.get_group(scope.company_id, id),
            ErrorCode::GroupNotFound,
            "Group",
            id,
        )
        .await?;
    }
    if let Some(id) = who.student_id {
        ensure_exists(
            storage.get_student(scope.company_id, id),
            ErrorCode::StudentNotFound,
            "Student",
            id,
        )
        .await?;
    }
    if let Some(id) = who.room_id {
        ensure_exists(
            storage.get_room(scope.company_id, id),
            ErrorCode::RoomNotFound,
            "Room",
            id,
        )
        .await?;
    }
    Ok(())
}

fn conflict_list(conflicts: Vec<LessonConflict>) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error(
        ErrorCode::LessonConflict,
        conflicts,
        "Lesson conflicts with the existing schedule",
    ))
}

/// 未 force 时检测冲突，有冲突返回 409 与冲突列表
async fn reject_conflicts(
    storage: &dyn Storage,
    scope: &TenantScope,
    who: &Participants,
    (start, end): (DateTime<Utc>, DateTime<Utc>),
    exclude_lesson_id: Option<i64>,
    force: bool,
) -> Result<(), HttpResponse> {
    let conflicts = find_conflicts(
        storage,
        scope.company_id,
        who.clone(),
        start,
        end,
        exclude_lesson_id,
    )
    .await
    .map_err(|e| storage_error("Failed to check lesson conflicts", e))?;

    if conflicts.is_empty() {
        return Ok(());
    }
    if force {
        warn!(
            "Lesson saved despite {} conflict(s) in company {}",
            conflicts.len(),
            scope.company_id
        );
        return Ok(());
    }
    Err(conflict_list(conflicts))
}

pub async fn create_lesson(
    service: &LessonService,
    req: CreateLessonRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    try_validate!(
        validate_lesson_shape(req.start_time, req.end_time, req.group_id, req.student_id),
        ErrorCode::LessonInvalid
    );
    let who = Participants {
        teacher_id: Some(req.teacher_id),
        room_id: req.room_id,
        group_id: req.group_id,
        student_id: req.student_id,
        ..Default::default()
    };
    try_respond!(check_references(storage.as_ref(), &scope, &who).await);
    let branch_id = try_respond!(checked_branch(storage.as_ref(), &scope, req.branch_id).await);

    let record = LessonRecord {
        branch_id,
        group_id: req.group_id,
        student_id: req.student_id,
        teacher_id: req.teacher_id,
        room_id: req.room_id,
        subject: optional_text(req.subject),
        start_time: req.start_time.timestamp(),
        end_time: req.end_time.timestamp(),
        status: LessonStatus::Scheduled,
        notes: optional_text(req.notes),
    };
    try_respond!(
        reject_conflicts(
            storage.as_ref(),
            &scope,
            &who,
            (req.start_time, req.end_time),
            None,
            req.force
        )
        .await
    );

    match storage.create_lesson(scope.company_id, record).await {
        Ok(lesson) => {
            info!("Lesson {} scheduled in company {}", lesson.id, scope.company_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                lesson,
                "Lesson created successfully",
            )))
        }
        Err(e) => Ok(storage_error("Failed to create lesson", e)),
    }
}

pub async fn update_lesson(
    service: &LessonService,
    id: i64,
    update: UpdateLessonRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let existing = try_respond!(visible_lesson(storage.as_ref(), &scope, id).await);

    if matches!(
        existing.status,
        LessonStatus::Completed | LessonStatus::Cancelled
    ) {
        return Ok(conflict(
            ErrorCode::LessonNotEditable,
            format!("A {} lesson cannot be edited", existing.status),
        ));
    }
    if let Some(status) = update.status
        && !matches!(status, LessonStatus::Scheduled | LessonStatus::Missed)
    {
        return Ok(bad_request(
            ErrorCode::LessonInvalid,
            "Use the complete or cancel actions to change this status",
        ));
    }

    let (group_id, student_id) = match resolve_attendees(
        (update.group_id, update.student_id),
        (existing.group_id, existing.student_id),
    ) {
        Ok(pair) => pair,
        Err(message) => return Ok(bad_request(ErrorCode::LessonInvalid, message)),
    };
    let start = update.start_time.unwrap_or(existing.start_time);
    let end = update.end_time.unwrap_or(existing.end_time);
    try_validate!(
        validate_lesson_shape(start, end, group_id, student_id),
        ErrorCode::LessonInvalid
    );

    let teacher_id = update.teacher_id.unwrap_or(existing.teacher_id);
    let room_id = update.room_id.unwrap_or(existing.room_id);
    let changed = Participants {
        teacher_id: update.teacher_id,
        room_id: update.room_id.flatten(),
        group_id: update.group_id.flatten(),
        student_id: update.student_id.flatten(),
        ..Default::default()
    };
    try_respond!(check_references(storage.as_ref(), &scope, &changed).await);

    let record = LessonRecord {
        branch_id: existing.branch_id,
        group_id,
        student_id,
        teacher_id,
        room_id,
        subject: match update.subject {
            Some(subject) => optional_text(Some(subject)),
            None => existing.subject,
        },
        start_time: start.timestamp(),
        end_time: end.timestamp(),
        status: update.status.unwrap_or(existing.status),
        notes: match update.notes {
            Some(notes) => optional_text(Some(notes)),
            None => existing.notes,
        },
    };
    let who = Participants {
        teacher_id: Some(teacher_id),
        room_id,
        group_id,
        student_id,
        ..Default::default()
    };
    try_respond!(
        reject_conflicts(storage.as_ref(), &scope, &who, (start, end), Some(id), update.force)
            .await
    );

    match storage.update_lesson(scope.company_id, id, record).await {
        Ok(Some(lesson)) => {
            info!("Lesson {} updated", lesson.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                lesson,
                "Lesson updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::LessonNotFound, "Lesson not found")),
        Err(e) => Ok(storage_error("Failed to update lesson", e)),
    }
}

pub async fn delete_lesson(
    service: &LessonService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let lesson = try_respond!(visible_lesson(storage.as_ref(), &scope, id).await);

    if lesson.status == LessonStatus::Completed {
        return Ok(conflict(
            ErrorCode::LessonNotEditable,
            "Completed lessons cannot be deleted",
        ));
    }

    match storage.delete_lesson(scope.company_id, id).await {
        Ok(true) => {
            info!("Lesson {} deleted from company {}", id, scope.company_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Lesson deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::LessonNotFound, "Lesson not found")),
        Err(e) => Ok(storage_error("Failed to delete lesson", e)),
    }
}

pub async fn cancel_lesson(
    service: &LessonService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let lesson = try_respond!(visible_lesson(storage.as_ref(), &scope, id).await);

    match lesson.status {
        LessonStatus::Completed => {
            return Ok(conflict(
                ErrorCode::LessonAlreadyCompleted,
                "Completed lessons cannot be cancelled",
            ));
        }
        LessonStatus::Cancelled => {
            return Ok(HttpResponse::Ok().json(ApiResponse::success(
                lesson,
                "Lesson is already cancelled",
            )));
        }
        _ => {}
    }

    match storage
        .set_lesson_status(scope.company_id, id, LessonStatus::Cancelled)
        .await
    {
        Ok(Some(lesson)) => {
            info!("Lesson {} cancelled", id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                lesson,
                "Lesson cancelled successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::LessonNotFound, "Lesson not found")),
        Err(e) => Ok(storage_error("Failed to cancel lesson", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_lesson_shape() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        let end = start + Duration::minutes(90);

        assert!(validate_lesson_shape(start, end, Some(1), None).is_ok());
        assert!(validate_lesson_shape(start, end, None, None).is_ok());
        assert!(validate_lesson_shape(start, start, None, None).is_err());
        assert!(validate_lesson_shape(end, start, None, None).is_err());
        assert!(validate_lesson_shape(start, end, Some(1), Some(2)).is_err());
        assert!(validate_lesson_shape(start, start + Duration::hours(13), None, None).is_err());
    }

    #[test]
    fn test_resolve_attendees() {
        let group_lesson = (Some(5), None);
        // 未提供则保持原值
        assert_eq!(resolve_attendees((None, None), group_lesson), Ok((Some(5), None)));
        // 改为个人课时清除班组
        assert_eq!(
            resolve_attendees((None, Some(Some(9))), group_lesson),
            Ok((None, Some(9)))
        );
        // 显式 null 清空，变为公开课
        assert_eq!(
            resolve_attendees((Some(None), Some(None)), group_lesson),
            Ok((None, None))
        );
        assert_eq!(
            resolve_attendees((Some(None), None), (None, Some(9))),
            Ok((None, Some(9)))
        );
        assert!(resolve_attendees((Some(Some(5)), Some(Some(9))), group_lesson).is_err());
    }
}
