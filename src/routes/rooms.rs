use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{RequireJWT, RequirePermission, RequireRole};
use crate::models::roles::Permission;
use crate::models::rooms::{CreateRoomRequest, RoomQueryParams, UpdateRoomRequest};
use crate::models::users::UserRole;
use crate::services::RoomService;
use crate::utils::SafeIDI64;

static ROOM_SERVICE: Lazy<RoomService> = Lazy::new(RoomService::new_lazy);

pub async fn list_rooms(
    req: HttpRequest,
    query: web::Query<RoomQueryParams>,
) -> ActixResult<HttpResponse> {
    ROOM_SERVICE.list_rooms(query.into_inner(), &req).await
}

pub async fn get_room(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ROOM_SERVICE.get_room(id.0, &req).await
}

pub async fn create_room(
    req: HttpRequest,
    body: web::Json<CreateRoomRequest>,
) -> ActixResult<HttpResponse> {
    ROOM_SERVICE.create_room(body.into_inner(), &req).await
}

pub async fn update_room(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateRoomRequest>,
) -> ActixResult<HttpResponse> {
    ROOM_SERVICE.update_room(id.0, body.into_inner(), &req).await
}

pub async fn delete_room(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ROOM_SERVICE.delete_room(id.0, &req).await
}

pub fn configure_room_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/rooms")
            .wrap(RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_rooms)
                            .wrap(RequireRole::new_any(UserRole::tenant_roles())),
                    )
                    .route(
                        web::post()
                            .to(create_room)
                            .wrap(RequirePermission::new(Permission::RoomsManage)),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(
                        web::get()
                            .to(get_room)
                            .wrap(RequireRole::new_any(UserRole::tenant_roles())),
                    )
                    .route(
                        web::put()
                            .to(update_room)
                            .wrap(RequirePermission::new(Permission::RoomsManage)),
                    )
                    .route(
                        web::delete()
                            .to(delete_room)
                            .wrap(RequirePermission::new(Permission::RoomsManage)),
                    ),
            ),
    );
}
