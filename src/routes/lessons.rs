use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequirePermission};
use crate::models::lessons::{
    CheckConflictsRequest, CompleteLessonRequest, CreateLessonRequest, LessonQueryParams,
    SuggestTimesRequest, UpdateLessonRequest,
};
use crate::models::roles::Permission;
use crate::services::LessonService;
use crate::utils::SafeIDI64;

static LESSON_SERVICE: Lazy<LessonService> = Lazy::new(LessonService::new_lazy);

pub async fn list_lessons(
    req: HttpRequest,
    query: web::Query<LessonQueryParams>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.list_lessons(query.into_inner(), &req).await
}

pub async fn get_lesson(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.get_lesson(id.0, &req).await
}

pub async fn create_lesson(
    req: HttpRequest,
    body: web::Json<CreateLessonRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.create_lesson(body.into_inner(), &req).await
}

pub async fn update_lesson(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateLessonRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .update_lesson(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_lesson(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.delete_lesson(id.0, &req).await
}

pub async fn cancel_lesson(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.cancel_lesson(id.0, &req).await
}

pub async fn check_conflicts(
    req: HttpRequest,
    body: web::Json<CheckConflictsRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.check_conflicts(body.into_inner(), &req).await
}

pub async fn suggest_times(
    req: HttpRequest,
    body: web::Json<SuggestTimesRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.suggest_times(body.into_inner(), &req).await
}

pub async fn complete_lesson(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<CompleteLessonRequest>,
) -> ActixResult<HttpResponse> {
    LESSON_SERVICE
        .complete_lesson(id.0, body.into_inner(), &req)
        .await
}

pub async fn list_attendance(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    LESSON_SERVICE.list_attendance(id.0, &req).await
}

pub fn configure_lesson_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/lessons")
            .wrap(RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_lessons)
                            .wrap(RequirePermission::new(Permission::LessonsView)),
                    )
                    .route(
                        web::post()
                            .to(create_lesson)
                            .wrap(RequirePermission::new(Permission::LessonsManage)),
                    ),
            )
            // 固定路径需在 /{id} 之前注册
            .service(
                web::resource("/check-conflicts").route(
                    web::post()
                        .to(check_conflicts)
                        .wrap(RequirePermission::new(Permission::LessonsView)),
                ),
            )
            .service(
                web::resource("/suggest-times").route(
                    web::post()
                        .to(suggest_times)
                        .wrap(RequirePermission::new(Permission::LessonsView)),
                ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_lesson)
                            .wrap(RequirePermission::new(Permission::LessonsView)),
                    )
                    .route(
                        web::put()
                            .to(update_lesson)
                            .wrap(RequirePermission::new(Permission::LessonsManage)),
                    )
                    .route(
                        web::delete()
                            .to(delete_lesson)
                            .wrap(RequirePermission::new(Permission::LessonsManage)),
                    ),
            )
            .service(
                web::resource("/{id}/complete").route(
                    web::post()
                        .to(complete_lesson)
                        .wrap(RequirePermission::new(Permission::LessonsManage)),
                ),
            )
            .service(
                web::resource("/{id}/cancel").route(
                    web::post()
                        .to(cancel_lesson)
                        .wrap(RequirePermission::new(Permission::LessonsManage)),
                ),
            )
            .service(
                web::resource("/{id}/attendance").route(
                    web::get()
                        .to(list_attendance)
                        .wrap(RequirePermission::new(Permission::LessonsView)),
                ),
            ),
    );
}
