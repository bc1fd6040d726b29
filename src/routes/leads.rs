use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequirePermission};
use crate::models::leads::{
    ChangeLeadStatusRequest, ConvertLeadRequest, CreateActivityRequest, CreateLeadRequest,
    CreateTaskRequest, LeadQueryParams, UpdateLeadRequest, UpdateTaskRequest,
};
use crate::models::roles::Permission;
use crate::services::LeadService;
use crate::utils::{SafeIDI64, SafeTaskIdI64};

static LEAD_SERVICE: Lazy<LeadService> = Lazy::new(LeadService::new_lazy);

pub async fn list_leads(
    req: HttpRequest,
    query: web::Query<LeadQueryParams>,
) -> ActixResult<HttpResponse> {
    LEAD_SERVICE.list_leads(query.into_inner(), &req).await
}

pub async fn get_lead(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    LEAD_SERVICE.get_lead(id.0, &req).await
}

pub async fn create_lead(
    req: HttpRequest,
    body: web::Json<CreateLeadRequest>,
) -> ActixResult<HttpResponse> {
    LEAD_SERVICE.create_lead(body.into_inner(), &req).await
}

pub async fn update_lead(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateLeadRequest>,
) -> ActixResult<HttpResponse> {
    LEAD_SERVICE.update_lead(id.0, body.into_inner(), &req).await
}

pub async fn delete_lead(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    LEAD_SERVICE.delete_lead(id.0, &req).await
}

pub async fn change_status(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<ChangeLeadStatusRequest>,
) -> ActixResult<HttpResponse> {
    LEAD_SERVICE.change_status(id.0, body.into_inner(), &req).await
}

// 请求体可省略
pub async fn convert(
    req: HttpRequest,
    id: SafeIDI64,
    body: Option<web::Json<ConvertLeadRequest>>,
) -> ActixResult<HttpResponse> {
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    LEAD_SERVICE.convert(id.0, body, &req).await
}

pub async fn list_activities(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    LEAD_SERVICE.list_activities(id.0, &req).await
}

pub async fn create_activity(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<CreateActivityRequest>,
) -> ActixResult<HttpResponse> {
    LEAD_SERVICE
        .create_activity(id.0, body.into_inner(), &req)
        .await
}

pub async fn list_tasks(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    LEAD_SERVICE.list_tasks(id.0, &req).await
}

pub async fn create_task(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<CreateTaskRequest>,
) -> ActixResult<HttpResponse> {
    LEAD_SERVICE.create_task(id.0, body.into_inner(), &req).await
}

pub async fn update_task(
    req: HttpRequest,
    id: SafeIDI64,
    task_id: SafeTaskIdI64,
    body: web::Json<UpdateTaskRequest>,
) -> ActixResult<HttpResponse> {
    LEAD_SERVICE
        .update_task(id.0, task_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_task(
    req: HttpRequest,
    id: SafeIDI64,
    task_id: SafeTaskIdI64,
) -> ActixResult<HttpResponse> {
    LEAD_SERVICE.delete_task(id.0, task_id.0, &req).await
}

pub fn configure_lead_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/leads")
            .wrap(RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_leads)
                            .wrap(RequirePermission::new(Permission::LeadsView)),
                    )
                    .route(
                        web::post()
                            .to(create_lead)
                            .wrap(RequirePermission::new(Permission::LeadsManage)),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_lead)
                            .wrap(RequirePermission::new(Permission::LeadsView)),
                    )
                    .route(
                        web::put()
                            .to(update_lead)
                            .wrap(RequirePermission::new(Permission::LeadsManage)),
                    )
                    .route(
                        web::delete()
                            .to(delete_lead)
                            .wrap(RequirePermission::new(Permission::LeadsManage)),
                    ),
            )
            .service(
                web::resource("/{id}/status").route(
                    web::post()
                        .to(change_status)
                        .wrap(RequirePermission::new(Permission::LeadsManage)),
                ),
            )
            .service(
                web::resource("/{id}/convert").route(
                    web::post()
                        .to(convert)
                        .wrap(RequirePermission::new(Permission::LeadsManage)),
                ),
            )
            .service(
                web::resource("/{id}/activities")
                    .route(
                        web::get()
                            .to(list_activities)
                            .wrap(RequirePermission::new(Permission::LeadsView)),
                    )
                    .route(
                        web::post()
                            .to(create_activity)
                            .wrap(RequirePermission::new(Permission::LeadsManage)),
                    ),
            )
            .service(
                web::resource("/{id}/tasks")
                    .route(
                        web::get()
                            .to(list_tasks)
                            .wrap(RequirePermission::new(Permission::LeadsView)),
                    )
                    .route(
                        web::post()
                            .to(create_task)
                            .wrap(RequirePermission::new(Permission::LeadsManage)),
                    ),
            )
            .service(
                web::resource("/{id}/tasks/{task_id}")
                    .route(
                        web::put()
                            .to(update_task)
                            .wrap(RequirePermission::new(Permission::LeadsManage)),
                    )
                    .route(
                        web::delete()
                            .to(delete_task)
                            .wrap(RequirePermission::new(Permission::LeadsManage)),
                    ),
            ),
    );
}
