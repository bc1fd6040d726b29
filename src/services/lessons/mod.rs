pub mod complete;
pub mod conflicts;
pub mod manage;
pub mod query;
pub mod schedule;
pub mod suggest;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::lessons::{
    CheckConflictsRequest, CompleteLessonRequest, CreateLessonRequest, Lesson, LessonQueryParams,
    SuggestTimesRequest, UpdateLessonRequest,
};
use crate::models::{ErrorCode, TenantScope};
use crate::services::common::{lazy_service, not_found, storage_error};
use crate::storage::Storage;

lazy_service!(LessonService);

impl LessonService {
    pub async fn list_lessons(
        &self,
        query: LessonQueryParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        query::list_lessons(self, query, request).await
    }

    pub async fn get_lesson(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        query::get_lesson(self, id, request).await
    }

    // 存在冲突且未指定 force 时返回 409
    pub async fn create_lesson(
        &self,
        req: CreateLessonRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::create_lesson(self, req, request).await
    }

    pub async fn update_lesson(
        &self,
        id: i64,
        update: UpdateLessonRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        manage::update_lesson(self, id, update, request).await
    }

    pub async fn delete_lesson(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::delete_lesson(self, id, request).await
    }

    pub async fn cancel_lesson(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        manage::cancel_lesson(self, id, request).await
    }

    pub async fn check_conflicts(
        &self,
        req: CheckConflictsRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        schedule::check_conflicts(self, req, request).await
    }

    pub async fn suggest_times(
        &self,
        req: SuggestTimesRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        schedule::suggest_times(self, req, request).await
    }

    // 写入考勤并扣课
    pub async fn complete_lesson(
        &self,
        id: i64,
        req: CompleteLessonRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        complete::complete_lesson(self, id, req, request).await
    }

    pub async fn list_attendance(
        &self,
        id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        complete::list_attendance(self, id, request).await
    }
}

async fn visible_lesson(
    storage: &dyn Storage,
    scope: &TenantScope,
    id: i64,
) -> Result<Lesson, HttpResponse> {
    match storage.get_lesson(scope.company_id, id).await {
        Ok(Some(lesson)) if scope.can_access_branch(lesson.branch_id) => Ok(lesson),
        Ok(_) => Err(not_found(ErrorCode::LessonNotFound, "Lesson not found")),
        Err(e) => Err(storage_error("Failed to get lesson", e)),
    }
}
