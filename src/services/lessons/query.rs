use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{LessonService, visible_lesson};
use crate::models::ApiResponse;
use crate::models::lessons::LessonQueryParams;
use crate::services::common::{storage_error, tenant_scope};
use crate::try_respond;

pub async fn list_lessons(
    service: &LessonService,
    query: LessonQueryParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    match storage.list_lessons(&scope, query).await {
        Ok(lessons) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            lessons,
            "Lessons retrieved successfully",
        ))),
        Err(e) => Ok(storage_error("Failed to list lessons", e)),
    }
}

pub async fn get_lesson(
    service: &LessonService,
    id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let scope = try_respond!(tenant_scope(request));

    let lesson = try_respond!(visible_lesson(storage.as_ref(), &scope, id).await);
    Ok(HttpResponse::Ok().json(ApiResponse::success(lesson, "Lesson retrieved successfully")))
}
