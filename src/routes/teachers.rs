use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequirePermission};
use crate::models::roles::Permission;
use crate::models::teachers::{CreateTeacherRequest, TeacherQueryParams, UpdateTeacherRequest};
use crate::services::TeacherService;
use crate::utils::SafeIDI64;

static TEACHER_SERVICE: Lazy<TeacherService> = Lazy::new(TeacherService::new_lazy);

pub async fn list_teachers(
    req: HttpRequest,
    query: web::Query<TeacherQueryParams>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.list_teachers(query.into_inner(), &req).await
}

pub async fn get_teacher(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.get_teacher(id.0, &req).await
}

pub async fn create_teacher(
    req: HttpRequest,
    body: web::Json<CreateTeacherRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.create_teacher(body.into_inner(), &req).await
}

pub async fn update_teacher(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateTeacherRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .update_teacher(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_teacher(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.delete_teacher(id.0, &req).await
}

pub fn configure_teacher_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/teachers")
            .wrap(RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_teachers)
                            .wrap(RequirePermission::new(Permission::TeachersView)),
                    )
                    .route(
                        web::post()
                            .to(create_teacher)
                            .wrap(RequirePermission::new(Permission::TeachersManage)),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_teacher)
                            .wrap(RequirePermission::new(Permission::TeachersView)),
                    )
                    .route(
                        web::put()
                            .to(update_teacher)
                            .wrap(RequirePermission::new(Permission::TeachersManage)),
                    )
                    .route(
                        web::delete()
                            .to(delete_teacher)
                            .wrap(RequirePermission::new(Permission::TeachersManage)),
                    ),
            ),
    );
}
