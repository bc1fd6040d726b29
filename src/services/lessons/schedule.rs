use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{Duration, Utc};

use super::LessonService;
use super::conflicts::{Participants, find_conflicts, load_participants};
use super::suggest::{SlotRules, clamp_limit, suggest_slots};
use crate::models::lessons::{CheckConflictsRequest, SuggestTimesRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::common::{bad_request, request_settings, storage_error, tenant_scope};
use crate::utils::local_time::local_day_bounds;
use crate::utils::validate::parse_date;
use crate::{try_respond, try_validate};

const MIN_DURATION_MINUTES: i64 = 5;
const MAX_DURATION_MINUTES: i64 = 720;

pub async fn check_conflicts(
    service: &LessonService,
    req: CheckConflictsRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    if req.end_time <= req.start_time {
        return Ok(bad_request(
            ErrorCode::LessonInvalid,
            "end_time must be after start_time",
        ));
    }

    let who = Participants {
        teacher_id: req.teacher_id,
        room_id: req.room_id,
        group_id: req.group_id,
        student_id: req.student_id,
        ..Default::default()
    };
    match find_conflicts(
        storage.as_ref(),
        scope.company_id,
        who,
        req.start_time,
        req.end_time,
        req.exclude_lesson_id,
    )
    .await
    {
        Ok(conflicts) => {
            let message = if conflicts.is_empty() {
                "No conflicts found"
            } else {
                "Conflicts found"
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(conflicts, message)))
        }
        Err(e) => Ok(storage_error("Failed to check lesson conflicts", e)),
    }
}

pub async fn suggest_times(
    service: &LessonService,
    req: SuggestTimesRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));
    let settings =
        try_respond!(request_settings(storage.as_ref(), request, scope.company_id).await);

    let date = try_validate!(parse_date("date", &req.date), ErrorCode::ValidationFailed);
    let minutes = req
        .duration_minutes
        .unwrap_or(settings.default_lesson_minutes);
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&minutes) {
        return Ok(bad_request(
            ErrorCode::ValidationFailed,
            format!(
                "duration_minutes must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES}"
            ),
        ));
    }

    let offset = settings.offset();
    let Some((day_start, day_end)) = local_day_bounds(offset, date) else {
        return Ok(bad_request(ErrorCode::ValidationFailed, "Invalid date"));
    };

    let who = Participants {
        teacher_id: req.teacher_id,
        room_id: req.room_id,
        group_id: req.group_id,
        student_id: req.student_id,
        ..Default::default()
    };
    let who = match load_participants(storage.as_ref(), who).await {
        Ok(who) => who,
        Err(e) => return Ok(storage_error("Failed to suggest times", e)),
    };
    let lessons = match storage
        .list_active_lessons_between(scope.company_id, day_start.timestamp(), day_end.timestamp())
        .await
    {
        Ok(lessons) => lessons,
        Err(e) => return Ok(storage_error("Failed to suggest times", e)),
    };
    let busy: Vec<_> = lessons
        .iter()
        .filter(|lesson| who.involves(lesson))
        .map(|lesson| (lesson.start_time, lesson.end_time))
        .collect();

    let rules = SlotRules {
        work_day_start: settings.work_day_start,
        work_day_end: settings.work_day_end,
        step: Duration::minutes(settings.slot_step_minutes),
        offset,
    };
    let slots = suggest_slots(
        date,
        Duration::minutes(minutes),
        &rules,
        &busy,
        Some(Utc::now()),
        clamp_limit(req.limit),
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        slots,
        "Suggested times retrieved successfully",
    )))
}
