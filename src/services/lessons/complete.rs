use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;
use tracing::info;

use super::{LessonService, visible_lesson};
use crate::errors::CrmError;
use crate::models::lessons::{AttendanceInput, CompleteLessonRequest, LessonStatus};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{
    conflict, ensure_exists, not_found, request_settings, storage_error, tenant_scope,
};
use crate::storage::CompletionRules;
use crate::utils::validate::optional_text;
use crate::{try_respond, try_validate};

fn check_unique_attendees(attendance: &[AttendanceInput]) -> Result<(), String> {
    let mut seen = HashSet::with_capacity(attendance.len());
    for entry in attendance {
        if !seen.insert(entry.student_id) {
            return Err(format!(
                "Student {} appears more than once in attendance",
                entry.student_id
            ));
        }
    }
    Ok(())
}

pub async fn complete_lesson(
    service: &LessonService,
    id: i64,
    req: CompleteLessonRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let lesson = try_respond!(visible_lesson(storage.as_ref(), &scope, id).await);

    match lesson.status {
        LessonStatus::Completed => {
            return Ok(conflict(
                ErrorCode::LessonAlreadyCompleted,
                "Lesson is already completed",
            ));
        }
        LessonStatus::Cancelled => {
            return Ok(conflict(
                ErrorCode::LessonNotEditable,
                "Cancelled lessons cannot be completed",
            ));
        }
        _ => {}
    }

    try_validate!(
        check_unique_attendees(&req.attendance),
        ErrorCode::ValidationFailed
    );
    for entry in &req.attendance {
        try_respond!(
            ensure_exists(
                storage.get_student(scope.company_id, entry.student_id),
                ErrorCode::StudentNotFound,
                "Student",
                entry.student_id
            )
            .await
        );
    }

    let settings =
        try_respond!(request_settings(storage.as_ref(), request, scope.company_id).await);
    let rules = CompletionRules {
        charge_absent: settings.charge_absent,
        today: settings.today(),
    };
    // 未提供 notes 时保留原有备注
    let notes = req.notes.map(|n| optional_text(Some(n)).unwrap_or_default());

    match storage
        .complete_lesson(scope.company_id, id, req.attendance, notes, rules)
        .await
    {
        Ok(Some(result)) => {
            let charged = result.attendance.iter().filter(|a| a.charged).count();
            info!(
                "Lesson {} completed, {} of {} attendee(s) charged",
                id,
                charged,
                result.attendance.len()
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                result,
                "Lesson completed successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::LessonNotFound, "Lesson not found")),
        Err(CrmError::Conflict(_)) => Ok(conflict(
            ErrorCode::LessonAlreadyCompleted,
            "Lesson is already completed",
        )),
        Err(e) => Ok(storage_error("Failed to complete lesson", e)),
    }
}

pub async fn list_attendance(
    service: &LessonService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    try_respond!(visible_lesson(storage.as_ref(), &scope, id).await);

    match storage.list_lesson_attendance(id).await {
        Ok(attendance) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            attendance,
            "Attendance retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list attendance", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lessons::AttendanceStatus;

    #[test]
    fn test_duplicate_attendees_rejected() {
        let entry = |student_id| AttendanceInput {
            student_id,
            status: AttendanceStatus::Present,
        };
        assert!(check_unique_attendees(&[entry(1), entry(2)]).is_ok());
        assert!(check_unique_attendees(&[entry(1), entry(2), entry(1)]).is_err());
        assert!(check_unique_attendees(&[]).is_ok());
    }
}
