use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequirePermission};
use crate::models::groups::{
    AddGroupStudentRequest, CreateGroupRequest, GroupQueryParams, UpdateGroupRequest,
};
use crate::models::roles::Permission;
use crate::services::GroupService;
use crate::utils::{SafeIDI64, SafeStudentIdI64};

static GROUP_SERVICE: Lazy<GroupService> = Lazy::new(GroupService::new_lazy);

pub async fn list_groups(
    req: HttpRequest,
    query: web::Query<GroupQueryParams>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.list_groups(query.into_inner(), &req).await
}

pub async fn get_group(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.get_group(id.0, &req).await
}

pub async fn create_group(
    req: HttpRequest,
    body: web::Json<CreateGroupRequest>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.create_group(body.into_inner(), &req).await
}

pub async fn update_group(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateGroupRequest>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.update_group(id.0, body.into_inner(), &req).await
}

pub async fn delete_group(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.delete_group(id.0, &req).await
}

pub async fn list_members(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.list_members(id.0, &req).await
}

pub async fn add_member(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<AddGroupStudentRequest>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.add_member(id.0, body.into_inner(), &req).await
}

pub async fn remove_member(
    req: HttpRequest,
    id: SafeIDI64,
    student_id: SafeStudentIdI64,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.remove_member(id.0, student_id.0, &req).await
}

pub fn configure_group_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/groups")
            .wrap(RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_groups)
                            .wrap(RequirePermission::new(Permission::GroupsView)),
                    )
                    .route(
                        web::post()
                            .to(create_group)
                            .wrap(RequirePermission::new(Permission::GroupsManage)),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_group)
                            .wrap(RequirePermission::new(Permission::GroupsView)),
                    )
                    .route(
                        web::put()
                            .to(update_group)
                            .wrap(RequirePermission::new(Permission::GroupsManage)),
                    )
                    .route(
                        web::delete()
                            .to(delete_group)
                            .wrap(RequirePermission::new(Permission::GroupsManage)),
                    ),
            )
            .service(
                web::resource("/{id}/students")
                    .route(
                        web::get()
                            .to(list_members)
                            .wrap(RequirePermission::new(Permission::GroupsView)),
                    )
                    .route(
                        web::post()
                            .to(add_member)
                            .wrap(RequirePermission::new(Permission::GroupsManage)),
                    ),
            )
            .service(
                web::resource("/{id}/students/{student_id}").route(
                    web::delete()
                        .to(remove_member)
                        .wrap(RequirePermission::new(Permission::GroupsManage)),
                ),
            ),
    );
}
