use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequirePermission};
use crate::models::roles::Permission;
use crate::models::students::{CreateStudentRequest, StudentQueryParams, UpdateStudentRequest};
use crate::services::StudentService;
use crate::utils::SafeIDI64;

static STUDENT_SERVICE: Lazy<StudentService> = Lazy::new(StudentService::new_lazy);

pub async fn list_students(
    req: HttpRequest,
    query: web::Query<StudentQueryParams>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.list_students(query.into_inner(), &req).await
}

pub async fn get_student(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.get_student(id.0, &req).await
}

pub async fn create_student(
    req: HttpRequest,
    body: web::Json<CreateStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.create_student(body.into_inner(), &req).await
}

pub async fn update_student(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateStudentRequest>,
) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE
        .update_student(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_student(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    STUDENT_SERVICE.delete_student(id.0, &req).await
}

pub fn configure_student_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/students")
            .wrap(RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_students)
                            .wrap(RequirePermission::new(Permission::StudentsView)),
                    )
                    .route(
                        web::post()
                            .to(create_student)
                            .wrap(RequirePermission::new(Permission::StudentsManage)),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_student)
                            .wrap(RequirePermission::new(Permission::StudentsView)),
                    )
                    .route(
                        web::put()
                            .to(update_student)
                            .wrap(RequirePermission::new(Permission::StudentsManage)),
                    )
                    .route(
                        web::delete()
                            .to(delete_student)
                            .wrap(RequirePermission::new(Permission::StudentsManage)),
                    ),
            ),
    );
}
